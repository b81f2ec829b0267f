//! Schema-driven JSON codec.
//!
//! Converts between typed view-model trees ([`typed_json_schema::Json`])
//! and compact UTF-8 JSON byte buffers. Writing is a two-phase protocol:
//! [`JsonSerializer::estimate`] computes an upper bound on the encoded
//! size, then [`JsonSerializer::serialize`] performs the exact write into a
//! buffer of that size. The estimate is load-bearing: the write may never
//! exceed it, and a buffer overrun surfaces as an internal-invariant error
//! rather than a reallocation.
//!
//! Reading goes through [`JsonReader`], a forward-only pull parser over a
//! fixed buffer, driven by the schema in
//! [`JsonSerializer::populate`]. Unknown wire properties are a hard error;
//! quoted scalar literals (`"42"`, `"true"`) and the `null` token are
//! accepted wherever a scalar is expected.
//!
//! Roots attached to a view session may additionally carry an incremental
//! patch version header and, when the session enables namespaces, the
//! composite merge envelope that embeds sibling applications' view models
//! under their own names together with a synthetic `Html` merge URL.

mod error;
mod merge;
mod populate;
mod reader;
pub mod scalars;
mod serializer;
mod settings;

pub use error::CodecError;
pub use reader::{JsonReader, RootKind};
pub use serializer::{JsonSerializer, SerializeContext};
pub use settings::{SerializerSettings, DEFAULT_MAX_ESTIMATED_SIZE};
