use thiserror::Error;

use typed_json_buffers::BufferError;
use typed_json_schema::{SchemaError, TemplateKind};

/// Failures of the codec layer.
///
/// Structural errors and capacity violations are fatal for the whole pass;
/// nothing here is retried. `Capacity` and `Invariant` indicate a defect in
/// this crate (an estimate that undercounted), not bad input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("unexpected end of content")]
    UnexpectedEndOfContent,
    #[error("invalid json at offset {offset}")]
    InvalidJson { offset: usize },
    #[error("wrong value type for property \"{property}\" ({expected}), value: {value}")]
    WrongValueType {
        property: String,
        expected: TemplateKind,
        value: String,
    },
    #[error("property \"{property}\" not found in template")]
    PropertyNotFound { property: String },
    #[error("written size exceeds destination capacity: needed {needed}, capacity {capacity}")]
    Capacity { needed: usize, capacity: usize },
    #[error("estimated size {estimated} exceeds the configured maximum {max}")]
    EstimateTooLarge { estimated: usize, max: usize },
    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<BufferError> for CodecError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => CodecError::UnexpectedEndOfContent,
            BufferError::Overflow { needed, capacity } => CodecError::Capacity { needed, capacity },
            BufferError::InvalidUtf8 => CodecError::InvalidJson { offset: 0 },
        }
    }
}
