//! Primitive schemas (component C3): fixed-width and length-prefixed
//! encoders with no per-instance parameters. Each has `schema_size() == 4`
//! (the tag, with nothing else in its descriptor).

use super::{kind, write_len_prefixed_str, write_tag, Schema};
use crate::{sink::ByteSink, value::Value, Error, Result};

fn mismatch(expected: &'static str, value: &Value) -> Error {
    // Unreachable through the typed `Loggable` API; only reachable by
    // hand-pairing a schema with a foreign `Value` via the dynamic API.
    Error::SizeAccountingMismatch {
        schema: expected,
        expected: 0,
        actual: value.kind_name().len(),
    }
}

/// The `Int32` primitive schema: a two's-complement big-endian `i32`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Int32Schema;

impl Schema for Int32Schema {
    fn tag(&self) -> i32 {
        kind::INT32
    }

    fn schema_size(&self) -> usize {
        4
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)
    }

    fn obj_size(&self, _value: &Value) -> Result<usize> {
        Ok(4)
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::I32(v) => sink.write_exact(&v.to_be_bytes()),
            other => Err(mismatch("Int32", other)),
        }
    }
}

/// The `Int64` primitive schema: a two's-complement big-endian `i64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Int64Schema;

impl Schema for Int64Schema {
    fn tag(&self) -> i32 {
        kind::INT64
    }

    fn schema_size(&self) -> usize {
        4
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)
    }

    fn obj_size(&self, _value: &Value) -> Result<usize> {
        Ok(8)
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::I64(v) => sink.write_exact(&v.to_be_bytes()),
            other => Err(mismatch("Int64", other)),
        }
    }
}

/// The `Float64` primitive schema: an IEEE-754 big-endian double.
#[derive(Clone, Copy, Debug, Default)]
pub struct Float64Schema;

impl Schema for Float64Schema {
    fn tag(&self) -> i32 {
        kind::FLOAT64
    }

    fn schema_size(&self) -> usize {
        4
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)
    }

    fn obj_size(&self, _value: &Value) -> Result<usize> {
        Ok(8)
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::Float64(v) => sink.write_exact(&v.to_be_bytes()),
            other => Err(mismatch("Float64", other)),
        }
    }
}

/// The `Bool` primitive schema: `0x00` false, `0x01` true.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolSchema;

impl Schema for BoolSchema {
    fn tag(&self) -> i32 {
        kind::BOOL
    }

    fn schema_size(&self) -> usize {
        4
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)
    }

    fn obj_size(&self, _value: &Value) -> Result<usize> {
        Ok(1)
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::Bool(v) => sink.write_exact(&[if *v { 1 } else { 0 }]),
            other => Err(mismatch("Bool", other)),
        }
    }
}

/// The `Utf8String` primitive schema: `i32` byte length followed by UTF-8
/// bytes. Length counts bytes, not codepoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8StringSchema;

impl Schema for Utf8StringSchema {
    fn tag(&self) -> i32 {
        kind::UTF8_STRING
    }

    fn schema_size(&self) -> usize {
        4
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)
    }

    fn obj_size(&self, value: &Value) -> Result<usize> {
        match value {
            Value::Str(s) => Ok(4 + s.as_bytes().len()),
            other => Err(mismatch("Utf8String", other)),
        }
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::Str(s) => write_len_prefixed_str(s, sink),
            other => Err(mismatch("Utf8String", other)),
        }
    }
}
