//! Bounded binary buffer utilities for typed-json.
//!
//! The serializer in this project works in two phases: a size estimate
//! reserves a buffer, then the writer fills it. Nothing here grows; running
//! out of room is an error the caller treats as a broken estimate.
//!
//! - [`Writer`] - Writes bytes into a caller-provided slice with capacity
//!   checks on every operation
//! - [`Reader`] - Reads bytes from a slice with cursor tracking and bounds
//!   checks
//!
//! # Example
//!
//! ```
//! use typed_json_buffers::{Reader, Writer};
//!
//! let mut buf = [0u8; 8];
//! let mut writer = Writer::new(&mut buf);
//! writer.u8(b'[').unwrap();
//! writer.ascii("42").unwrap();
//! writer.u8(b']').unwrap();
//! assert_eq!(writer.pos(), 4);
//!
//! let mut reader = Reader::new(&buf[..4]);
//! assert_eq!(reader.u8().unwrap(), b'[');
//! assert_eq!(reader.tail(), b"42]");
//! ```

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    EndOfBuffer,
    /// A write did not fit in the remaining capacity.
    Overflow { needed: usize, capacity: usize },
    /// Invalid UTF-8 sequence.
    InvalidUtf8,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer => write!(f, "end of buffer"),
            BufferError::Overflow { needed, capacity } => {
                write!(f, "buffer overflow: needed {needed}, capacity {capacity}")
            }
            BufferError::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
        }
    }
}

impl std::error::Error for BufferError {}
