//! Translation adapter schema (component C6): wraps a base schema over `U`
//! with a pre-serialization transform `T -> U`, so a caller can log a type
//! whose in-memory shape differs from its logged shape. Wire-invisible: tag,
//! `schema_size`, and the descriptor are all those of the base schema.

use super::{Schema, SchemaRef};
use crate::{sink::ByteSink, value::Value, Result};

/// `Translate(base, to_base)`. `to_base` runs once per `obj_size`/
/// `encode_object` call against the value already converted to `U`'s
/// [`Value`] representation by the caller (see [`crate::Loggable`]); the
/// adapter itself only forwards to `base`.
#[derive(Debug)]
pub struct TranslateSchema {
    base: SchemaRef,
}

impl TranslateSchema {
    /// Wraps `base`. The `T -> U` transform lives at the [`crate::Loggable`]
    /// layer (in `to_value`), since `Schema` itself operates on the already
    /// erased [`Value`] representation.
    pub fn new(base: SchemaRef) -> Self {
        Self { base }
    }

    /// The wrapped base schema.
    pub fn base(&self) -> &SchemaRef {
        &self.base
    }
}

impl Schema for TranslateSchema {
    fn tag(&self) -> i32 {
        self.base.tag()
    }

    fn schema_size(&self) -> usize {
        self.base.schema_size()
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        self.base.encode_schema(sink)
    }

    fn obj_size(&self, value: &Value) -> Result<usize> {
        self.base.obj_size(value)
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        self.base.encode_object(value, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Int64Schema;
    use crate::sink::MemSink;
    use std::sync::Arc;

    #[test]
    fn translation_is_wire_invisible() {
        let base: SchemaRef = Arc::new(Int64Schema);
        let translate = TranslateSchema::new(base.clone());

        assert_eq!(translate.tag(), base.tag());
        assert_eq!(translate.schema_size(), base.schema_size());

        let value = Value::I64(42);
        let mut base_sink = MemSink::new();
        base.encode_object(&value, &mut base_sink).unwrap();
        let mut translate_sink = MemSink::new();
        translate
            .encode_object(&value, &mut translate_sink)
            .unwrap();
        assert_eq!(base_sink.into_vec(), translate_sink.into_vec());
    }
}
