//! Schema nodes (templates) describing the wire shape of properties.
//!
//! A template is built once and shared by every value-tree instance of that
//! shape. Object templates keep their children in declaration order; only
//! children added with [`TObject::add_property`] are exposed to the wire
//! format, children added with [`TObject::add_internal`] are reachable
//! through the accessor API but invisible to the codec in both directions.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// The wire-shape tag of a template, used for dispatch and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Bool,
    Decimal,
    Double,
    Long,
    String,
    Object,
    Array,
    Trigger,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Bool => "Bool",
            TemplateKind::Decimal => "Decimal",
            TemplateKind::Double => "Double",
            TemplateKind::Long => "Long",
            TemplateKind::String => "String",
            TemplateKind::Object => "Object",
            TemplateKind::Array => "Array",
            TemplateKind::Trigger => "Trigger",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema node. The sum over every supported property shape.
#[derive(Debug)]
pub enum Template {
    Bool(TBool),
    Decimal(TDecimal),
    Double(TDouble),
    Long(TLong),
    String(TString),
    Object(TObject),
    Array(TArray),
    Trigger(TTrigger),
}

impl Template {
    pub fn name(&self) -> &str {
        match self {
            Template::Bool(t) => &t.name,
            Template::Decimal(t) => &t.name,
            Template::Double(t) => &t.name,
            Template::Long(t) => &t.name,
            Template::String(t) => &t.name,
            Template::Object(t) => &t.name,
            Template::Array(t) => &t.name,
            Template::Trigger(t) => &t.name,
        }
    }

    pub fn kind(&self) -> TemplateKind {
        match self {
            Template::Bool(_) => TemplateKind::Bool,
            Template::Decimal(_) => TemplateKind::Decimal,
            Template::Double(_) => TemplateKind::Double,
            Template::Long(_) => TemplateKind::Long,
            Template::String(_) => TemplateKind::String,
            Template::Object(_) => TemplateKind::Object,
            Template::Array(_) => TemplateKind::Array,
            Template::Trigger(_) => TemplateKind::Trigger,
        }
    }

    /// The object node, when this template is one.
    pub fn as_object(&self) -> Option<&TObject> {
        match self {
            Template::Object(t) => Some(t),
            _ => None,
        }
    }

    /// The array node, when this template is one.
    pub fn as_array(&self) -> Option<&TArray> {
        match self {
            Template::Array(t) => Some(t),
            _ => None,
        }
    }
}

macro_rules! scalar_template {
    ($(#[$doc:meta])* $ty:ident, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            pub name: String,
        }

        impl $ty {
            pub fn new(name: impl Into<String>) -> Self {
                Self { name: name.into() }
            }
        }

        impl From<$ty> for Template {
            fn from(t: $ty) -> Template {
                Template::$variant(t)
            }
        }
    };
}

scalar_template!(
    /// Boolean property.
    TBool, Bool
);
scalar_template!(
    /// Fixed-point decimal property (at most 28 fractional digits).
    TDecimal, Decimal
);
scalar_template!(
    /// Double-precision floating point property.
    TDouble, Double
);
scalar_template!(
    /// 64-bit integer property.
    TLong, Long
);
scalar_template!(
    /// String property. The value distinguishes absent from empty in
    /// memory; both serialize as `""`.
    TString, String
);
scalar_template!(
    /// Write-only action property, always serialized as the `null` literal.
    TTrigger, Trigger
);

/// One child slot of an object template.
#[derive(Debug)]
pub struct Property {
    pub template: Arc<Template>,
    pub exposed: bool,
}

/// Object template: ordered children plus a name lookup.
#[derive(Debug, Default)]
pub struct TObject {
    pub name: String,
    children: Vec<Property>,
    lookup: IndexMap<String, usize>,
}

impl TObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            lookup: IndexMap::new(),
        }
    }

    fn push(&mut self, template: Template, exposed: bool) {
        let template = Arc::new(template);
        self.lookup
            .insert(template.name().to_owned(), self.children.len());
        self.children.push(Property { template, exposed });
    }

    /// Adds an exposed child; it participates in serialization and populate.
    pub fn add_property(&mut self, template: impl Into<Template>) -> &mut Self {
        self.push(template.into(), true);
        self
    }

    /// Adds an internal child, reachable through accessors but invisible to
    /// the wire format.
    pub fn add_internal(&mut self, template: impl Into<Template>) -> &mut Self {
        self.push(template.into(), false);
        self
    }

    /// All children in declaration order.
    pub fn children(&self) -> &[Property] {
        &self.children
    }

    /// Exposed children with their slot indices, in declaration order.
    pub fn exposed_properties(&self) -> impl Iterator<Item = (usize, &Arc<Template>)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, p)| p.exposed)
            .map(|(i, p)| (i, &p.template))
    }

    /// Number of exposed children.
    pub fn exposed_count(&self) -> usize {
        self.children.iter().filter(|p| p.exposed).count()
    }

    /// Slot index for a property name, exposed or internal.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Slot index for a name that is exposed to the wire format.
    pub fn exposed_index(&self, name: &str) -> Option<usize> {
        self.property_index(name)
            .filter(|&i| self.children[i].exposed)
    }

    pub fn property(&self, index: usize) -> &Property {
        &self.children[index]
    }
}

impl From<TObject> for Template {
    fn from(t: TObject) -> Template {
        Template::Object(t)
    }
}

/// Array template: one object element shape, shared by every row.
#[derive(Debug)]
pub struct TArray {
    pub name: String,
    element: Arc<Template>,
}

impl TArray {
    pub fn new(name: impl Into<String>, element: TObject) -> Self {
        Self {
            name: name.into(),
            element: Arc::new(Template::Object(element)),
        }
    }

    pub fn element(&self) -> &Arc<Template> {
        &self.element
    }
}

impl From<TArray> for Template {
    fn from(t: TArray) -> Template {
        Template::Array(t)
    }
}
