use thiserror::Error;

use crate::template::TemplateKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown property \"{0}\"")]
    UnknownProperty(String),
    #[error("property \"{property}\" is {actual}, expected {expected}")]
    WrongKind {
        property: String,
        expected: TemplateKind,
        actual: TemplateKind,
    },
    #[error("template is not an object")]
    NotAnObject,
    #[error("template is not an array")]
    NotAnArray,
    #[error("only object and array templates can be instantiated")]
    NotAContainer,
    #[error("array element template must be an object")]
    ElementNotObject,
}
