//! Homogeneous array schema (component C4).

use super::{kind, write_tag, Schema, SchemaRef};
use crate::{sink::ByteSink, value::Value, Error, Result};

/// `Array(elem)`: a homogeneous, length-prefixed sequence. Descriptor is
/// `tag, elem_schema_descriptor`; value is `count:i32` followed by `count`
/// element encodings.
#[derive(Debug)]
pub struct ArraySchema {
    elem: SchemaRef,
}

impl ArraySchema {
    /// Creates an array schema over `elem`.
    pub fn new(elem: SchemaRef) -> Self {
        Self { elem }
    }

    /// The element schema.
    pub fn elem(&self) -> &SchemaRef {
        &self.elem
    }
}

impl Schema for ArraySchema {
    fn tag(&self) -> i32 {
        kind::ARRAY
    }

    fn schema_size(&self) -> usize {
        4 + self.elem.schema_size()
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)?;
        self.elem.encode_schema(sink)
    }

    fn obj_size(&self, value: &Value) -> Result<usize> {
        match value {
            Value::Array(items) => {
                let mut size = 4;
                for item in items {
                    size += self.elem.obj_size(item)?;
                }
                Ok(size)
            }
            other => Err(Error::SizeAccountingMismatch {
                schema: "Array",
                expected: 0,
                actual: other.kind_name().len(),
            }),
        }
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::Array(items) => {
                sink.write_exact(&(items.len() as i32).to_be_bytes())?;
                for item in items {
                    self.elem.encode_object(item, sink)?;
                }
                Ok(())
            }
            other => Err(Error::SizeAccountingMismatch {
                schema: "Array",
                expected: 0,
                actual: other.kind_name().len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Float64Schema;
    use crate::sink::MemSink;
    use std::sync::Arc;

    #[test]
    fn array_of_float64_round_trips() {
        let schema = ArraySchema::new(Arc::new(Float64Schema));
        let value = Value::Array(vec![Value::Float64(2.0), Value::Float64(3.0)]);
        let mut sink = MemSink::new();
        schema.encode_object(&value, &mut sink).unwrap();
        let bytes = sink.into_vec();
        assert_eq!(schema.obj_size(&value).unwrap(), bytes.len());
        assert_eq!(&bytes[0..4], &2i32.to_be_bytes());
        assert_eq!(&bytes[4..12], &2.0f64.to_be_bytes());
        assert_eq!(&bytes[12..20], &3.0f64.to_be_bytes());
    }

    #[test]
    fn empty_array_encodes_zero_count() {
        let schema = ArraySchema::new(Arc::new(Float64Schema));
        let value = Value::Array(vec![]);
        let mut sink = MemSink::new();
        schema.encode_object(&value, &mut sink).unwrap();
        assert_eq!(sink.into_vec(), 0i32.to_be_bytes());
    }

    #[test]
    fn descriptor_nests_element_descriptor() {
        let schema = ArraySchema::new(Arc::new(Float64Schema));
        let mut sink = MemSink::new();
        schema.encode_schema(&mut sink).unwrap();
        let bytes = sink.into_vec();
        assert_eq!(bytes.len(), schema.schema_size());
        assert_eq!(&bytes[0..4], &kind::ARRAY.to_be_bytes());
        assert_eq!(&bytes[4..8], &kind::FLOAT64.to_be_bytes());
    }
}
