//! Process-wide schema registry (component C8): derives a schema from a
//! [`Loggable`] type at most once per process and hands back the same
//! [`SchemaRef`] on every subsequent lookup, the way a connection pool or a
//! metrics registry memoizes by key.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::reflect::{derive_schema, Loggable};
use crate::schema::SchemaRef;
use crate::Result;

/// A keyed cache from a Rust type to its derived [`SchemaRef`].
///
/// Most callers never construct one directly; [`global`] is the
/// process-wide instance [`crate::Writer`] consults.
#[derive(Default)]
pub struct Registry {
    schemas: Mutex<HashMap<TypeId, SchemaRef>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` for `T`, overwriting any prior entry. Overwriting
    /// an existing entry is logged at `warn`, since it usually indicates two
    /// call sites derived inconsistent schemas for the same type.
    pub fn register<T: 'static>(&self, schema: SchemaRef) {
        let mut schemas = self.schemas.lock().expect("registry mutex poisoned");
        if schemas
            .insert(TypeId::of::<T>(), schema)
            .is_some()
        {
            log::warn!(
                "overwriting a previously registered schema for {}",
                std::any::type_name::<T>()
            );
        }
    }

    /// Looks up a previously registered or derived schema for `T`, without
    /// deriving one if absent.
    pub fn lookup<T: 'static>(&self) -> Option<SchemaRef> {
        self.schemas
            .lock()
            .expect("registry mutex poisoned")
            .get(&TypeId::of::<T>())
            .cloned()
    }

    /// Returns `T`'s schema, deriving and caching it via
    /// [`derive_schema`] on first use (component C7, memoized).
    pub fn schema_of<T: Loggable + 'static>(&self) -> Result<SchemaRef> {
        if let Some(schema) = self.lookup::<T>() {
            return Ok(schema);
        }
        let schema = derive_schema(&T::type_descriptor())?;
        log::debug!("derived schema for {}", std::any::type_name::<T>());
        let mut schemas = self.schemas.lock().expect("registry mutex poisoned");
        // Another thread may have derived and inserted the same schema while
        // this one was computing it; keep whichever landed first so callers
        // observe a single consistent SchemaRef per type.
        let schema = schemas.entry(TypeId::of::<T>()).or_insert(schema).clone();
        Ok(schema)
    }
}

/// The process-wide registry instance.
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::kind;
    use crate::Schema;

    #[test]
    fn schema_of_is_memoized() {
        let registry = Registry::new();
        let first = registry.schema_of::<f64>().unwrap();
        let second = registry.schema_of::<f64>().unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert_eq!(first.tag(), kind::FLOAT64);
    }

    #[test]
    fn lookup_is_none_before_first_derivation() {
        let registry = Registry::new();
        assert!(registry.lookup::<bool>().is_none());
        registry.schema_of::<bool>().unwrap();
        assert!(registry.lookup::<bool>().is_some());
    }

    #[test]
    fn register_overwrites_existing_entry() {
        let registry = Registry::new();
        registry.schema_of::<i32>().unwrap();
        let replacement: SchemaRef = std::sync::Arc::new(crate::schema::Int64Schema);
        registry.register::<i32>(replacement.clone());
        let looked_up = registry.lookup::<i32>().unwrap();
        assert!(std::sync::Arc::ptr_eq(&looked_up, &replacement));
    }
}
