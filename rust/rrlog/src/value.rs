//! The erased value representation that [`crate::schema::Schema`]
//! implementations size and encode.
//!
//! The schema algebra is a closed set of composable kinds (records nest
//! arrays of records of enums, and so on), so the boundary between "a Rust
//! value of some concrete type" and "a value a `Schema` can encode" has to
//! be crossed somewhere. [`Value`] is that crossing point; [`crate::Loggable`]
//! is how a concrete Rust type produces one.

/// A value ready to be sized and encoded by some [`crate::schema::Schema`].
///
/// `Value` mirrors the shape of the schema that describes it: an
/// `Enum`-schema value is a declared constant name, an `Array`-schema value
/// is a sequence of element values, and a record-shaped schema (`Record`,
/// `TypedRecord`, or `Custom`) value is its field values in declared order
/// (for `TypedRecord`/`Custom` this does *not* include the `.type`
/// discriminator, which the schema supplies on its own).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An `Int32`-schema value.
    I32(i32),
    /// An `Int64`-schema value.
    I64(i64),
    /// A `Float64`-schema value.
    Float64(f64),
    /// A `Bool`-schema value.
    Bool(bool),
    /// A `Utf8String`-schema value.
    Str(String),
    /// An `Enum`-schema value, given by its declared constant name. The
    /// schema resolves this to an ordinal at encode time.
    EnumName(String),
    /// An `Array`-schema value: the element values in order.
    Array(Vec<Value>),
    /// A record-shaped schema's field values, in the schema's declared
    /// order.
    Record(Vec<Value>),
}

impl Value {
    /// A human-readable name of this value's shape, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Float64(_) => "f64",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::EnumName(_) => "enum",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }
}
