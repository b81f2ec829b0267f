//! Template schema model and typed view-model instances.
//!
//! A [`Template`] describes the wire shape of one property: scalar kind,
//! object with an ordered list of exposed children, or array with one
//! element shape. Templates are immutable and shared (`Arc`) between every
//! instance of that shape. A [`Json`] instance pairs a template with
//! mutable storage and owns its nested children exclusively.
//!
//! The codec crate consumes this model through the template tag, the typed
//! accessors and the per-child value slots; sessions and sibling sets carry
//! the serialization context for roots.

mod error;
mod instance;
mod session;
mod template;

pub use error::SchemaError;
pub use instance::{Json, Value};
pub use session::{Session, Sibling, SiblingSet, ViewModelVersion};
pub use template::{
    Property, TArray, TBool, TDecimal, TDouble, TLong, TObject, TString, TTrigger, Template,
    TemplateKind,
};

pub use rust_decimal::Decimal;
