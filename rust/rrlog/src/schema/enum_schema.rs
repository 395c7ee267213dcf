//! Enumeration schema (component C4): an ordinal-encoded value over a
//! declared, ordered list of constant names.

use super::{kind, write_len_prefixed_str, write_tag, Schema};
use crate::{sink::ByteSink, value::Value, Error, Result};

/// `Enum`: descriptor is `tag, count:i32, {len:i32, utf8_bytes}*count`.
/// Value is a 4-byte ordinal in `[0, count)`. Writing a value carries a
/// declared name, which is resolved to an ordinal by linear lookup;
/// resolution failure raises [`Error::InvalidEnumValue`] (P9).
#[derive(Clone, Debug)]
pub struct EnumSchema {
    names: Vec<String>,
}

impl EnumSchema {
    /// Creates an enum schema over `names`, in declared order. `names.len()`
    /// may be zero.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The declared constant names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn ordinal_of(&self, name: &str) -> Result<i32> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| i as i32)
            .ok_or_else(|| Error::InvalidEnumValue {
                name: name.to_string(),
            })
    }
}

impl Schema for EnumSchema {
    fn tag(&self) -> i32 {
        kind::ENUM
    }

    fn schema_size(&self) -> usize {
        4 + 4 + self.names.iter().map(|n| super::len_prefixed_str_size(n)).sum::<usize>()
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)?;
        sink.write_exact(&(self.names.len() as i32).to_be_bytes())?;
        for name in &self.names {
            write_len_prefixed_str(name, sink)?;
        }
        Ok(())
    }

    fn obj_size(&self, _value: &Value) -> Result<usize> {
        Ok(4)
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::EnumName(name) => {
                let ordinal = self.ordinal_of(name)?;
                sink.write_exact(&ordinal.to_be_bytes())
            }
            other => Err(Error::SizeAccountingMismatch {
                schema: "Enum",
                expected: 0,
                actual: other.kind_name().len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemSink;

    fn colors() -> EnumSchema {
        EnumSchema::new(["RED", "GREEN", "BLUE"])
    }

    #[test]
    fn ordinal_is_big_endian_index() {
        let schema = colors();
        let mut sink = MemSink::new();
        schema
            .encode_object(&Value::EnumName("GREEN".into()), &mut sink)
            .unwrap();
        assert_eq!(sink.into_vec(), 1i32.to_be_bytes());
    }

    #[test]
    fn unknown_name_is_rejected() {
        let schema = colors();
        let mut sink = MemSink::new();
        let err = schema
            .encode_object(&Value::EnumName("PURPLE".into()), &mut sink)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { .. }));
    }

    #[test]
    fn descriptor_lists_all_names_in_order() {
        let schema = colors();
        let mut sink = MemSink::new();
        schema.encode_schema(&mut sink).unwrap();
        let bytes = sink.into_vec();
        assert_eq!(bytes.len(), schema.schema_size());
        assert_eq!(&bytes[0..4], &kind::ENUM.to_be_bytes());
        assert_eq!(&bytes[4..8], &3i32.to_be_bytes());
    }

    #[test]
    fn zero_constant_enum_is_allowed() {
        let schema = EnumSchema::new(Vec::<String>::new());
        assert_eq!(schema.schema_size(), 8);
    }
}
