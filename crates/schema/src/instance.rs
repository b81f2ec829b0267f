//! Value-tree instances conforming to a template.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::SchemaError;
use crate::template::{Template, TemplateKind};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// One runtime value slot, aligned with a template child.
#[derive(Debug)]
pub enum Value {
    Bool(bool),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    /// `None` is the absent marker; it serializes as `""`.
    Str(Option<String>),
    Trigger,
    Object(Json),
    Array(Json),
}

impl Value {
    pub fn kind(&self) -> TemplateKind {
        match self {
            Value::Bool(_) => TemplateKind::Bool,
            Value::Long(_) => TemplateKind::Long,
            Value::Double(_) => TemplateKind::Double,
            Value::Decimal(_) => TemplateKind::Decimal,
            Value::Str(_) => TemplateKind::String,
            Value::Trigger => TemplateKind::Trigger,
            Value::Object(_) => TemplateKind::Object,
            Value::Array(_) => TemplateKind::Array,
        }
    }

    fn default_for(template: &Arc<Template>) -> Value {
        match template.as_ref() {
            Template::Bool(_) => Value::Bool(false),
            Template::Long(_) => Value::Long(0),
            Template::Double(_) => Value::Double(0.0),
            Template::Decimal(_) => Value::Decimal(Decimal::ZERO),
            Template::String(_) => Value::Str(None),
            Template::Trigger(_) => Value::Trigger,
            Template::Object(_) => Value::Object(Json::instantiate(template.clone())),
            Template::Array(_) => Value::Array(Json::instantiate(template.clone())),
        }
    }
}

#[derive(Debug)]
enum JsonData {
    /// One slot per template child, in declaration order.
    Object(Vec<Value>),
    /// Owned element instances, wire order.
    Array(Vec<Json>),
}

/// A mutable value tree paired with its (shared, immutable) template.
///
/// Object instances own one slot per template child and the nested
/// instances inside them; array instances own their element rows. The tree
/// id is process-unique and identifies the tree across session and sibling
/// registries.
#[derive(Debug)]
pub struct Json {
    template: Arc<Template>,
    tree_id: u64,
    app_name: Option<String>,
    data: JsonData,
}

impl Json {
    /// Creates an instance tree for an object or array template, with
    /// default scalar values and empty arrays.
    pub fn new(template: Arc<Template>) -> Result<Json, SchemaError> {
        match template.as_ref() {
            Template::Object(_) | Template::Array(_) => Ok(Self::instantiate(template)),
            _ => Err(SchemaError::NotAContainer),
        }
    }

    fn instantiate(template: Arc<Template>) -> Json {
        let data = match template.as_ref() {
            Template::Object(tobj) => JsonData::Object(
                tobj.children()
                    .iter()
                    .map(|p| Value::default_for(&p.template))
                    .collect(),
            ),
            Template::Array(_) => JsonData::Array(Vec::new()),
            _ => unreachable!("scalar templates are never instantiated"),
        };
        Json {
            template,
            tree_id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            app_name: None,
            data,
        }
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Process-unique identity of this tree node.
    pub fn tree_id(&self) -> u64 {
        self.tree_id
    }

    /// Owning application name, used by the composite merge layer.
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn set_app_name(&mut self, name: impl Into<String>) {
        self.app_name = Some(name.into());
    }

    pub fn is_object(&self) -> bool {
        matches!(self.data, JsonData::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data, JsonData::Array(_))
    }

    // ----------------------------------------------------------------
    // Slot access (codec-facing)

    /// The value slot at a template child index. Panics on an array
    /// instance or an out-of-range index; the codec always derives indices
    /// from the same template.
    pub fn value(&self, index: usize) -> &Value {
        match &self.data {
            JsonData::Object(slots) => &slots[index],
            JsonData::Array(_) => panic!("value slots exist only on object instances"),
        }
    }

    pub fn value_mut(&mut self, index: usize) -> &mut Value {
        match &mut self.data {
            JsonData::Object(slots) => &mut slots[index],
            JsonData::Array(_) => panic!("value slots exist only on object instances"),
        }
    }

    // ----------------------------------------------------------------
    // Typed accessors (application-facing)

    fn index_of(&self, name: &str) -> Result<usize, SchemaError> {
        let tobj = self
            .template
            .as_object()
            .ok_or(SchemaError::NotAnObject)?;
        tobj.property_index(name)
            .ok_or_else(|| SchemaError::UnknownProperty(name.to_owned()))
    }

    fn wrong_kind(name: &str, expected: TemplateKind, actual: TemplateKind) -> SchemaError {
        SchemaError::WrongKind {
            property: name.to_owned(),
            expected,
            actual,
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, SchemaError> {
        match self.value(self.index_of(name)?) {
            Value::Bool(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, TemplateKind::Bool, other.kind())),
        }
    }

    pub fn set_bool(&mut self, name: &str, v: bool) -> Result<(), SchemaError> {
        let index = self.index_of(name)?;
        match self.value_mut(index) {
            Value::Bool(slot) => {
                *slot = v;
                Ok(())
            }
            other => Err(Self::wrong_kind(name, TemplateKind::Bool, other.kind())),
        }
    }

    pub fn get_long(&self, name: &str) -> Result<i64, SchemaError> {
        match self.value(self.index_of(name)?) {
            Value::Long(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, TemplateKind::Long, other.kind())),
        }
    }

    pub fn set_long(&mut self, name: &str, v: i64) -> Result<(), SchemaError> {
        let index = self.index_of(name)?;
        match self.value_mut(index) {
            Value::Long(slot) => {
                *slot = v;
                Ok(())
            }
            other => Err(Self::wrong_kind(name, TemplateKind::Long, other.kind())),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64, SchemaError> {
        match self.value(self.index_of(name)?) {
            Value::Double(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, TemplateKind::Double, other.kind())),
        }
    }

    pub fn set_double(&mut self, name: &str, v: f64) -> Result<(), SchemaError> {
        let index = self.index_of(name)?;
        match self.value_mut(index) {
            Value::Double(slot) => {
                *slot = v;
                Ok(())
            }
            other => Err(Self::wrong_kind(name, TemplateKind::Double, other.kind())),
        }
    }

    pub fn get_decimal(&self, name: &str) -> Result<Decimal, SchemaError> {
        match self.value(self.index_of(name)?) {
            Value::Decimal(v) => Ok(*v),
            other => Err(Self::wrong_kind(name, TemplateKind::Decimal, other.kind())),
        }
    }

    pub fn set_decimal(&mut self, name: &str, v: Decimal) -> Result<(), SchemaError> {
        let index = self.index_of(name)?;
        match self.value_mut(index) {
            Value::Decimal(slot) => {
                *slot = v;
                Ok(())
            }
            other => Err(Self::wrong_kind(name, TemplateKind::Decimal, other.kind())),
        }
    }

    /// `Ok(None)` is the absent marker, distinct from `Some("")` in memory
    /// only; both serialize as `""`.
    pub fn get_str(&self, name: &str) -> Result<Option<&str>, SchemaError> {
        match self.value(self.index_of(name)?) {
            Value::Str(v) => Ok(v.as_deref()),
            other => Err(Self::wrong_kind(name, TemplateKind::String, other.kind())),
        }
    }

    pub fn set_str(&mut self, name: &str, v: impl Into<String>) -> Result<(), SchemaError> {
        let index = self.index_of(name)?;
        match self.value_mut(index) {
            Value::Str(slot) => {
                *slot = Some(v.into());
                Ok(())
            }
            other => Err(Self::wrong_kind(name, TemplateKind::String, other.kind())),
        }
    }

    /// Returns a string property to the absent marker.
    pub fn clear_str(&mut self, name: &str) -> Result<(), SchemaError> {
        let index = self.index_of(name)?;
        match self.value_mut(index) {
            Value::Str(slot) => {
                *slot = None;
                Ok(())
            }
            other => Err(Self::wrong_kind(name, TemplateKind::String, other.kind())),
        }
    }

    /// Nested object or array child.
    pub fn child(&self, name: &str) -> Result<&Json, SchemaError> {
        match self.value(self.index_of(name)?) {
            Value::Object(j) | Value::Array(j) => Ok(j),
            other => Err(Self::wrong_kind(name, TemplateKind::Object, other.kind())),
        }
    }

    pub fn child_mut(&mut self, name: &str) -> Result<&mut Json, SchemaError> {
        let index = self.index_of(name)?;
        match self.value_mut(index) {
            Value::Object(j) | Value::Array(j) => Ok(j),
            other => Err(Self::wrong_kind(name, TemplateKind::Object, other.kind())),
        }
    }

    // ----------------------------------------------------------------
    // Array rows

    /// Appends a new element instance and returns it for mutation.
    pub fn add_item(&mut self) -> Result<&mut Json, SchemaError> {
        let element = match self.template.as_ref() {
            Template::Array(tarr) => tarr.element().clone(),
            _ => return Err(SchemaError::NotAnArray),
        };
        match &mut self.data {
            JsonData::Array(items) => {
                items.push(Json::instantiate(element));
                Ok(items.last_mut().expect("just pushed"))
            }
            JsonData::Object(_) => Err(SchemaError::NotAnArray),
        }
    }

    pub fn items(&self) -> &[Json] {
        match &self.data {
            JsonData::Array(items) => items,
            JsonData::Object(_) => &[],
        }
    }

    pub fn item(&self, index: usize) -> Option<&Json> {
        self.items().get(index)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}
