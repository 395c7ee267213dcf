//! The schema algebra (components C2-C6): a closed set of schema kinds,
//! each of which can size and encode both its own descriptor and the values
//! it governs.

mod array;
mod enum_schema;
mod primitive;
mod record;
mod translate;

pub use array::ArraySchema;
pub use enum_schema::EnumSchema;
pub use primitive::{BoolSchema, Float64Schema, Int32Schema, Int64Schema, Utf8StringSchema};
pub use record::{CustomRecordSchema, RecordField, RecordSchema, RecordSchemaBuilder, TypedRecordSchema};
pub use translate::TranslateSchema;

use std::sync::Arc;

use crate::{sink::ByteSink, value::Value, Result};

/// Stable kind tags, fixed by the wire format (`spec.md` §6). The first four
/// bytes of every schema descriptor are one of these, big-endian.
pub mod kind {
    /// Structured record (reflected, typed, and custom-component schemas
    /// are wire-identical and share this tag).
    pub const RECORD: i32 = 0;
    /// `Int32`.
    pub const INT32: i32 = 1;
    /// `Int64`.
    pub const INT64: i32 = 2;
    /// `Float64`.
    pub const FLOAT64: i32 = 3;
    /// `Utf8String`.
    pub const UTF8_STRING: i32 = 4;
    /// `Bool`.
    pub const BOOL: i32 = 5;
    /// `Enum`.
    pub const ENUM: i32 = 6;
    /// `Array`.
    pub const ARRAY: i32 = 7;
}

/// A shared, immutable handle to a schema. Schemas are safe to share across
/// channels and writers once constructed (`spec.md` §3's schema-instance
/// lifecycle).
pub type SchemaRef = Arc<dyn Schema>;

/// The contract every schema kind satisfies (`spec.md` §3-4, component C2).
///
/// Implementations must uphold:
/// - `encode_schema` writes exactly `schema_size()` bytes, the first four of
///   which are `tag()` big-endian (P3, P4).
/// - `encode_object` writes exactly `obj_size(value)` bytes for any `value`
///   it accepts (P2).
pub trait Schema: Send + Sync + std::fmt::Debug {
    /// The schema's stable kind tag (see [`kind`]).
    fn tag(&self) -> i32;

    /// The exact byte size of this schema's own descriptor.
    fn schema_size(&self) -> usize;

    /// Writes this schema's descriptor. Must start with `tag()` and write
    /// exactly `schema_size()` bytes.
    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()>;

    /// The exact byte size `value` will occupy when encoded under this
    /// schema.
    fn obj_size(&self, value: &Value) -> Result<usize>;

    /// Writes `value`, consuming exactly `obj_size(value)` bytes.
    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()>;
}

/// Writes a schema's four-byte tag, the common prefix of every descriptor.
pub(crate) fn write_tag(tag: i32, sink: &mut dyn ByteSink) -> Result<()> {
    sink.write_exact(&tag.to_be_bytes())
}

/// Writes an `i32 len` followed by `s`'s UTF-8 bytes, the length-prefixed
/// string encoding used throughout the wire format.
pub(crate) fn write_len_prefixed_str(s: &str, sink: &mut dyn ByteSink) -> Result<()> {
    let bytes = s.as_bytes();
    sink.write_exact(&(bytes.len() as i32).to_be_bytes())?;
    sink.write_exact(bytes)
}

/// `4 + len(utf8_bytes)`, the size a length-prefixed string occupies.
pub(crate) fn len_prefixed_str_size(s: &str) -> usize {
    4 + s.as_bytes().len()
}

/// Guards against a schema's size accounting disagreeing with what it
/// actually wrote, by wrapping a sink and counting bytes passed through it.
/// Used by schema implementations whose `obj_size`/`encode_object` (or
/// `schema_size`/`encode_schema`) are computed independently, to detect a
/// `SizeAccountingMismatch` (I3) before it can corrupt a stream.
pub(crate) struct CountingSink<'a> {
    inner: &'a mut dyn ByteSink,
    written: usize,
}

impl<'a> CountingSink<'a> {
    pub(crate) fn new(inner: &'a mut dyn ByteSink) -> Self {
        Self { inner, written: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl ByteSink for CountingSink<'_> {
    fn write_exact(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_exact(buf)?;
        self.written += buf.len();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
