//! Structured-record schemas (component C5): the reflected `Record`, the
//! `TypedRecord` (a `Record` with an implicit `.type` discriminator), and
//! `Custom`, a record whose values are produced by a user-supplied encoder
//! rather than reflection over a Rust type's own fields.
//!
//! All three are wire-identical: tag [`kind::RECORD`], `i32 field_count`,
//! then per field `i32 name_len, name_utf8, nested_descriptor`.

use std::sync::Arc;

use super::{kind, len_prefixed_str_size, write_len_prefixed_str, write_tag, Schema, SchemaRef};
use crate::{sink::ByteSink, value::Value, Error, Result};

/// One named field of a record-shaped schema.
#[derive(Debug, Clone)]
pub struct RecordField {
    /// The field's declared name.
    pub name: String,
    /// The field's schema.
    pub schema: SchemaRef,
}

impl RecordField {
    /// Creates a field.
    pub fn new(name: impl Into<String>, schema: SchemaRef) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    fn descriptor_size(&self) -> usize {
        len_prefixed_str_size(&self.name) + self.schema.schema_size()
    }

    fn encode_descriptor(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_len_prefixed_str(&self.name, sink)?;
        self.schema.encode_schema(sink)
    }
}

fn field_count_descriptor_size(fields: &[RecordField]) -> usize {
    4 + 4 + fields.iter().map(RecordField::descriptor_size).sum::<usize>()
}

fn encode_field_count_and_fields(fields: &[RecordField], sink: &mut dyn ByteSink) -> Result<()> {
    sink.write_exact(&(fields.len() as i32).to_be_bytes())?;
    for field in fields {
        field.encode_descriptor(sink)?;
    }
    Ok(())
}

fn arity_mismatch(schema: &'static str, expected: usize, actual: usize) -> Error {
    Error::SizeAccountingMismatch {
        schema,
        expected,
        actual,
    }
}

/// `Record(fields)`: the reflected-record schema variant. Field iteration
/// order is fixed at construction and used consistently for sizing and
/// encoding (`spec.md` §3, field-ordering invariant).
#[derive(Debug)]
pub struct RecordSchema {
    fields: Vec<RecordField>,
}

impl RecordSchema {
    /// Creates a record schema over `fields`, in declared order.
    pub fn new(fields: Vec<RecordField>) -> Self {
        Self { fields }
    }

    /// The declared fields, in order.
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Starts a builder for explicit, hand-declared fields — the
    /// non-derive path for callers who can't or don't want to
    /// `#[derive(Loggable)]` (`spec.md` §9 design note on reflective field
    /// discovery, path (a)).
    pub fn builder() -> RecordSchemaBuilder {
        RecordSchemaBuilder::default()
    }
}

/// Builds a [`RecordSchema`] field by field, in call order.
#[derive(Default)]
pub struct RecordSchemaBuilder {
    fields: Vec<RecordField>,
}

impl RecordSchemaBuilder {
    /// Appends a field.
    pub fn field(mut self, name: impl Into<String>, schema: SchemaRef) -> Self {
        self.fields.push(RecordField::new(name, schema));
        self
    }

    /// Finishes the record schema.
    pub fn build(self) -> RecordSchema {
        RecordSchema::new(self.fields)
    }
}

impl Schema for RecordSchema {
    fn tag(&self) -> i32 {
        kind::RECORD
    }

    fn schema_size(&self) -> usize {
        field_count_descriptor_size(&self.fields)
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)?;
        encode_field_count_and_fields(&self.fields, sink)
    }

    fn obj_size(&self, value: &Value) -> Result<usize> {
        match value {
            Value::Record(values) => {
                if values.len() != self.fields.len() {
                    return Err(arity_mismatch("Record", self.fields.len(), values.len()));
                }
                let mut size = 0;
                for (field, v) in self.fields.iter().zip(values) {
                    size += field.schema.obj_size(v)?;
                }
                Ok(size)
            }
            _ => Err(arity_mismatch("Record", self.fields.len(), 0)),
        }
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::Record(values) => {
                if values.len() != self.fields.len() {
                    return Err(arity_mismatch("Record", self.fields.len(), values.len()));
                }
                for (field, v) in self.fields.iter().zip(values) {
                    field.schema.encode_object(v, sink)?;
                }
                Ok(())
            }
            _ => Err(arity_mismatch("Record", self.fields.len(), 0)),
        }
    }
}

/// The `.type` discriminator field name every `TypedRecord`/`Custom` schema
/// prepends.
pub const TYPE_DISCRIMINATOR_NAME: &str = ".type";

/// `TypedRecord(type_name, fields)`: semantically a `Record` whose first
/// field is `.type: Utf8String = type_name`. Values supplied to this schema
/// are the *original* fields only; the discriminator is supplied by the
/// schema itself.
#[derive(Debug)]
pub struct TypedRecordSchema {
    type_name: String,
    fields: Vec<RecordField>,
}

impl TypedRecordSchema {
    /// Creates a typed-record schema. `fields` does not include the
    /// discriminator; it is prepended implicitly.
    pub fn new(type_name: impl Into<String>, fields: Vec<RecordField>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    /// The discriminator value (`.type`).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The original (non-discriminator) fields, in order.
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    fn discriminator_size(&self) -> usize {
        len_prefixed_str_size(TYPE_DISCRIMINATOR_NAME) + 4 // Utf8String schema_size is always 4
    }
}

impl Schema for TypedRecordSchema {
    fn tag(&self) -> i32 {
        kind::RECORD
    }

    fn schema_size(&self) -> usize {
        // tag + field_count + discriminator field descriptor + original fields.
        4 + 4
            + self.discriminator_size()
            + self
                .fields
                .iter()
                .map(RecordField::descriptor_size)
                .sum::<usize>()
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)?;
        sink.write_exact(&((self.fields.len() + 1) as i32).to_be_bytes())?;
        write_len_prefixed_str(TYPE_DISCRIMINATOR_NAME, sink)?;
        sink.write_exact(&kind::UTF8_STRING.to_be_bytes())?;
        for field in &self.fields {
            field.encode_descriptor(sink)?;
        }
        Ok(())
    }

    fn obj_size(&self, value: &Value) -> Result<usize> {
        match value {
            Value::Record(values) => {
                if values.len() != self.fields.len() {
                    return Err(arity_mismatch("TypedRecord", self.fields.len(), values.len()));
                }
                let mut size = len_prefixed_str_size(&self.type_name);
                for (field, v) in self.fields.iter().zip(values) {
                    size += field.schema.obj_size(v)?;
                }
                Ok(size)
            }
            _ => Err(arity_mismatch("TypedRecord", self.fields.len(), 0)),
        }
    }

    fn encode_object(&self, value: &Value, sink: &mut dyn ByteSink) -> Result<()> {
        match value {
            Value::Record(values) => {
                if values.len() != self.fields.len() {
                    return Err(arity_mismatch("TypedRecord", self.fields.len(), values.len()));
                }
                write_len_prefixed_str(&self.type_name, sink)?;
                for (field, v) in self.fields.iter().zip(values) {
                    field.schema.encode_object(v, sink)?;
                }
                Ok(())
            }
            _ => Err(arity_mismatch("TypedRecord", self.fields.len(), 0)),
        }
    }
}

/// A schema whose field values are produced by a user-supplied encoder over
/// some Rust type `T`, rather than by reflecting `T`'s own fields
/// (component C5, `Custom`). Wire-identical to a [`TypedRecordSchema`] whose
/// fields are `zip(component_names, component_schemas)`.
///
/// Per `spec.md` §4.5, the encoder may be invoked once while sizing a write
/// and again while encoding it; it must be deterministic and
/// side-effect-free.
pub struct CustomRecordSchema<T> {
    type_name: String,
    components: Vec<RecordField>,
    encoder: Arc<dyn Fn(&T) -> Vec<Value> + Send + Sync>,
}

impl<T> CustomRecordSchema<T> {
    /// Builds a custom-component schema. `component_names` and
    /// `component_schemas` must have equal length, or
    /// [`Error::MismatchedComponents`] is returned (a configuration error,
    /// detected at construction rather than at write time).
    pub fn new(
        type_name: impl Into<String>,
        component_names: Vec<String>,
        component_schemas: Vec<SchemaRef>,
        encoder: impl Fn(&T) -> Vec<Value> + Send + Sync + 'static,
    ) -> Result<Self> {
        let type_name = type_name.into();
        if component_names.len() != component_schemas.len() {
            return Err(Error::MismatchedComponents {
                type_name,
                name_count: component_names.len(),
                schema_count: component_schemas.len(),
            });
        }
        let components = component_names
            .into_iter()
            .zip(component_schemas)
            .map(|(name, schema)| RecordField::new(name, schema))
            .collect();
        Ok(Self {
            type_name,
            components,
            encoder: Arc::new(encoder),
        })
    }

    /// The discriminator value.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The component fields, in order.
    pub fn components(&self) -> &[RecordField] {
        &self.components
    }

    /// The schema's stable kind tag; always [`kind::RECORD`].
    pub fn tag(&self) -> i32 {
        kind::RECORD
    }

    /// The exact byte size of this schema's descriptor.
    pub fn schema_size(&self) -> usize {
        4 + 4
            + len_prefixed_str_size(TYPE_DISCRIMINATOR_NAME)
            + 4
            + self
                .components
                .iter()
                .map(RecordField::descriptor_size)
                .sum::<usize>()
    }

    /// Writes this schema's descriptor.
    pub fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)?;
        sink.write_exact(&((self.components.len() + 1) as i32).to_be_bytes())?;
        write_len_prefixed_str(TYPE_DISCRIMINATOR_NAME, sink)?;
        sink.write_exact(&kind::UTF8_STRING.to_be_bytes())?;
        for field in &self.components {
            field.encode_descriptor(sink)?;
        }
        Ok(())
    }

    fn encode_components(&self, value: &T) -> Result<Vec<Value>> {
        let parts = (self.encoder)(value);
        if parts.len() != self.components.len() {
            return Err(arity_mismatch("Custom", self.components.len(), parts.len()));
        }
        Ok(parts)
    }

    /// The exact byte size `value` will occupy, invoking the encoder once.
    pub fn obj_size(&self, value: &T) -> Result<usize> {
        let parts = self.encode_components(value)?;
        let mut size = len_prefixed_str_size(&self.type_name);
        for (field, v) in self.components.iter().zip(&parts) {
            size += field.schema.obj_size(v)?;
        }
        Ok(size)
    }

    /// Writes `value`, invoking the encoder once more (see the struct docs
    /// on the encoder's double-invocation contract).
    pub fn encode_object(&self, value: &T, sink: &mut dyn ByteSink) -> Result<()> {
        let parts = self.encode_components(value)?;
        write_len_prefixed_str(&self.type_name, sink)?;
        for (field, v) in self.components.iter().zip(&parts) {
            field.schema.encode_object(v, sink)?;
        }
        Ok(())
    }

    /// Returns a [`SchemaRef`] describing this schema's wire shape, for use
    /// when only the channel-registration bookkeeping is needed (emitting
    /// the schema entry). Its `obj_size`/`encode_object` are intentionally
    /// unreachable through the normal write path: values are written via
    /// [`CustomRecordSchema::obj_size`]/[`CustomRecordSchema::encode_object`]
    /// directly, by way of `Writer::write_custom`.
    pub fn descriptor(&self) -> SchemaRef {
        Arc::new(CustomDescriptor {
            type_name: self.type_name.clone(),
            components: self.components.clone(),
        })
    }
}

#[derive(Debug)]
struct CustomDescriptor {
    type_name: String,
    components: Vec<RecordField>,
}

impl Schema for CustomDescriptor {
    fn tag(&self) -> i32 {
        kind::RECORD
    }

    fn schema_size(&self) -> usize {
        4 + 4
            + len_prefixed_str_size(TYPE_DISCRIMINATOR_NAME)
            + 4
            + self
                .components
                .iter()
                .map(RecordField::descriptor_size)
                .sum::<usize>()
    }

    fn encode_schema(&self, sink: &mut dyn ByteSink) -> Result<()> {
        write_tag(self.tag(), sink)?;
        sink.write_exact(&((self.components.len() + 1) as i32).to_be_bytes())?;
        write_len_prefixed_str(TYPE_DISCRIMINATOR_NAME, sink)?;
        sink.write_exact(&kind::UTF8_STRING.to_be_bytes())?;
        for field in &self.components {
            field.encode_descriptor(sink)?;
        }
        Ok(())
    }

    fn obj_size(&self, _value: &Value) -> Result<usize> {
        Err(Error::UnsupportedType(format!(
            "`{}` values must be written via Writer::write_custom, not the generic Schema trait",
            self.type_name
        )))
    }

    fn encode_object(&self, _value: &Value, _sink: &mut dyn ByteSink) -> Result<()> {
        Err(Error::UnsupportedType(format!(
            "`{}` values must be written via Writer::write_custom, not the generic Schema trait",
            self.type_name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Float64Schema, Utf8StringSchema};
    use crate::sink::MemSink;

    fn point_fields() -> Vec<RecordField> {
        vec![
            RecordField::new("x", Arc::new(Float64Schema)),
            RecordField::new("y", Arc::new(Float64Schema)),
        ]
    }

    #[test]
    fn builder_produces_fields_in_call_order() {
        let schema = RecordSchema::builder()
            .field("x", Arc::new(Float64Schema))
            .field("y", Arc::new(Float64Schema))
            .build();
        assert_eq!(schema.fields()[0].name, "x");
        assert_eq!(schema.fields()[1].name, "y");
    }

    #[test]
    fn typed_record_matches_record_with_type_prepended() {
        let typed = TypedRecordSchema::new("Pt", point_fields());
        let record = RecordSchema::new(
            std::iter::once(RecordField::new(
                TYPE_DISCRIMINATOR_NAME,
                Arc::new(Utf8StringSchema) as SchemaRef,
            ))
            .chain(point_fields())
            .collect(),
        );

        let typed_value = Value::Record(vec![Value::Float64(1.0), Value::Float64(2.0)]);
        let record_value = Value::Record(vec![
            Value::Str("Pt".into()),
            Value::Float64(1.0),
            Value::Float64(2.0),
        ]);

        let mut typed_sink = MemSink::new();
        typed.encode_object(&typed_value, &mut typed_sink).unwrap();
        let mut record_sink = MemSink::new();
        record
            .encode_object(&record_value, &mut record_sink)
            .unwrap();

        assert_eq!(typed_sink.into_vec(), record_sink.into_vec());
        assert_eq!(
            typed.obj_size(&typed_value).unwrap(),
            record.obj_size(&record_value).unwrap()
        );
    }

    #[test]
    fn typed_record_descriptor_matches_scenario_s4() {
        let schema = TypedRecordSchema::new("Pt", point_fields());
        let mut sink = MemSink::new();
        schema.encode_schema(&mut sink).unwrap();
        let bytes = sink.into_vec();
        let mut expected = Vec::new();
        expected.extend(0i32.to_be_bytes()); // record tag
        expected.extend(3i32.to_be_bytes()); // field count
        expected.extend(5i32.to_be_bytes());
        expected.extend(b".type");
        expected.extend(4i32.to_be_bytes()); // Utf8String tag
        expected.extend(1i32.to_be_bytes());
        expected.extend(b"x");
        expected.extend(3i32.to_be_bytes()); // Float64 tag
        expected.extend(1i32.to_be_bytes());
        expected.extend(b"y");
        expected.extend(3i32.to_be_bytes());
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len(), schema.schema_size());
    }

    #[test]
    fn custom_matches_typed_record_over_encoded_components() {
        struct Pt {
            x: f64,
            y: f64,
        }
        let custom = CustomRecordSchema::new(
            "Pt",
            vec!["x".into(), "y".into()],
            vec![Arc::new(Float64Schema) as SchemaRef, Arc::new(Float64Schema)],
            |p: &Pt| vec![Value::Float64(p.x), Value::Float64(p.y)],
        )
        .unwrap();
        let typed = TypedRecordSchema::new("Pt", point_fields());

        let pt = Pt { x: 1.0, y: 2.0 };
        let typed_value = Value::Record(vec![Value::Float64(1.0), Value::Float64(2.0)]);

        let mut custom_sink = MemSink::new();
        custom.encode_object(&pt, &mut custom_sink).unwrap();
        let mut typed_sink = MemSink::new();
        typed.encode_object(&typed_value, &mut typed_sink).unwrap();

        assert_eq!(custom_sink.into_vec(), typed_sink.into_vec());
        assert_eq!(
            custom.obj_size(&pt).unwrap(),
            typed.obj_size(&typed_value).unwrap()
        );
    }

    #[test]
    fn mismatched_component_arrays_are_rejected_at_construction() {
        struct Pt;
        let err = CustomRecordSchema::new(
            "Pt",
            vec!["x".into()],
            vec![
                Arc::new(Float64Schema) as SchemaRef,
                Arc::new(Float64Schema),
            ],
            |_: &Pt| vec![],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MismatchedComponents { .. }));
    }
}
