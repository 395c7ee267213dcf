//! Class-to-schema derivation (component C7).
//!
//! `spec.md` §4.7 derives a schema from a type description; in a language
//! without runtime reflection, that type description has to be a
//! first-class value. [`TypeDescriptor`] is that value, [`Reflect`]-like
//! behavior is provided by the [`crate::Loggable`] trait's
//! `type_descriptor()` method (hand-written for primitives and collections,
//! generated by `#[derive(Loggable)]` for aggregates), and [`derive_schema`]
//! is the derivation algorithm itself.

use std::sync::Arc;

use crate::schema::{
    ArraySchema, BoolSchema, EnumSchema, Float64Schema, Int32Schema, Int64Schema, RecordField,
    RecordSchema, SchemaRef, TypedRecordSchema, Utf8StringSchema,
};
use crate::value::Value;
use crate::{Error, Result};

/// A Rust type that knows its own wire shape and how to turn an instance of
/// itself into a [`Value`] (component C7). Hand-written here for primitives
/// and `Vec<T>`; `#[derive(Loggable)]` generates it for aggregates and
/// C-like enums.
pub trait Loggable {
    /// The type's shape, used once per type by [`derive_schema`] (and
    /// memoized by [`crate::registry`]) to build a [`SchemaRef`].
    fn type_descriptor() -> TypeDescriptor
    where
        Self: Sized;

    /// Converts `self` into the erased [`Value`] a [`crate::schema::Schema`]
    /// can size and encode.
    fn to_value(&self) -> Value;
}

macro_rules! impl_loggable_primitive {
    ($ty:ty, $descriptor:expr, $variant:ident) => {
        impl Loggable for $ty {
            fn type_descriptor() -> TypeDescriptor {
                $descriptor
            }

            fn to_value(&self) -> Value {
                Value::$variant((*self).into())
            }
        }
    };
}

impl_loggable_primitive!(i32, TypeDescriptor::Int32, I32);
impl_loggable_primitive!(i64, TypeDescriptor::Int64, I64);
impl_loggable_primitive!(f64, TypeDescriptor::Float64, Float64);
impl_loggable_primitive!(bool, TypeDescriptor::Bool, Bool);

impl Loggable for String {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Utf8String
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl Loggable for str {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Utf8String
    }

    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl<T: Loggable> Loggable for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Array(Box::new(T::type_descriptor()))
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Loggable::to_value).collect())
    }
}

impl<T: Loggable> Loggable for &T {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }

    fn to_value(&self) -> Value {
        (*self).to_value()
    }
}

/// One field of a [`TypeDescriptor::Struct`], in declared order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The field's name.
    pub name: String,
    /// The field's own type descriptor.
    pub descriptor: TypeDescriptor,
}

impl FieldDescriptor {
    /// Creates a field descriptor.
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }
}

/// A type description that [`derive_schema`] turns into a [`SchemaRef`].
/// This is the Rust stand-in for the reflective field/constant discovery
/// the original system performs at runtime (`spec.md` §9's design notes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Maps to [`Int32Schema`].
    Int32,
    /// Maps to [`Int64Schema`].
    Int64,
    /// Maps to [`Float64Schema`].
    Float64,
    /// Maps to [`crate::schema::BoolSchema`].
    Bool,
    /// Maps to [`Utf8StringSchema`].
    Utf8String,
    /// Maps to [`EnumSchema`].
    Enum {
        /// The ordered constant names.
        names: Vec<String>,
    },
    /// Maps to [`ArraySchema`].
    Array(Box<TypeDescriptor>),
    /// Maps to [`RecordSchema`] (when `as_type` is `None`) or
    /// [`TypedRecordSchema`] (when it's `Some`) — the discriminator probe
    /// of `spec.md` §4.7 step 4 is resolved once, at the moment this
    /// descriptor is built, by looking for a container-level `as_type`
    /// (the `#[rrlog(as_type = "...")]` attribute when derived).
    Struct {
        /// The aggregate's own name, used in cycle detection.
        name: String,
        /// The aggregate's fields, in a deterministic order fixed when the
        /// descriptor was built.
        fields: Vec<FieldDescriptor>,
        /// The discriminator value, if one was found.
        as_type: Option<String>,
    },
}

/// Derives a [`SchemaRef`] from a [`TypeDescriptor`] (`spec.md` §4.7).
///
/// Cyclic type graphs (a `Struct` that recursively contains itself) are a
/// configuration error and return [`Error::UnsupportedType`] rather than
/// recursing forever.
pub fn derive_schema(descriptor: &TypeDescriptor) -> Result<SchemaRef> {
    derive_schema_inner(descriptor, &mut Vec::new())
}

fn derive_schema_inner(descriptor: &TypeDescriptor, in_progress: &mut Vec<String>) -> Result<SchemaRef> {
    match descriptor {
        TypeDescriptor::Int32 => Ok(Arc::new(Int32Schema)),
        TypeDescriptor::Int64 => Ok(Arc::new(Int64Schema)),
        TypeDescriptor::Float64 => Ok(Arc::new(Float64Schema)),
        TypeDescriptor::Bool => Ok(Arc::new(BoolSchema)),
        TypeDescriptor::Utf8String => Ok(Arc::new(Utf8StringSchema)),
        TypeDescriptor::Enum { names } => Ok(Arc::new(EnumSchema::new(names.clone()))),
        TypeDescriptor::Array(elem) => {
            let elem_schema = derive_schema_inner(elem, in_progress)?;
            Ok(Arc::new(ArraySchema::new(elem_schema)))
        }
        TypeDescriptor::Struct {
            name,
            fields,
            as_type,
        } => {
            if in_progress.iter().any(|n| n == name) {
                return Err(Error::UnsupportedType(format!(
                    "cyclic type graph detected while deriving a schema for `{name}`"
                )));
            }
            in_progress.push(name.clone());
            let mut schema_fields = Vec::with_capacity(fields.len());
            for field in fields {
                let field_schema = derive_schema_inner(&field.descriptor, in_progress)?;
                schema_fields.push(RecordField::new(field.name.clone(), field_schema));
            }
            in_progress.pop();
            match as_type {
                Some(type_name) => Ok(Arc::new(TypedRecordSchema::new(type_name.clone(), schema_fields))),
                None => Ok(Arc::new(RecordSchema::new(schema_fields))),
            }
        }
    }
}
