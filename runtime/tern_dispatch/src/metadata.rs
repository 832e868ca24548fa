//! Metadata for the introspection symbol.
//!
//! Dereferencing the introspection symbol (`$meta` by default) on a value
//! that does not answer it natively yields a struct describing the value's
//! type. Building it walks the provider's member lists, so results are
//! cached per type, or per class name for class instances.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use tern_value::{ScriptStruct, TypeHandle, Value};

use crate::introspect::Introspect;

/// Builds the metadata value for a target.
pub trait MetadataFactory: Send + Sync {
    fn build(&self, provider: &dyn Introspect, value: &Value) -> Value;
}

/// Default factory: a struct with `name`, `kind`, `methods` and `fields`.
///
/// `methods` lists signatures such as `add(int, int)`; `fields` lists names.
#[derive(Copy, Clone, Default, Debug)]
pub struct StructMetadata;

impl MetadataFactory for StructMetadata {
    fn build(&self, provider: &dyn Introspect, value: &Value) -> Value {
        let (name, kind, methods, fields) = match value {
            Value::Instance(obj) => (
                obj.class_name().to_string(),
                "instance",
                Vec::new(),
                obj.member_names(),
            ),
            other => {
                let ty = other.type_handle();
                let kind = if ty.is_builtin() { "builtin" } else { "host" };
                let methods = provider
                    .methods(ty)
                    .iter()
                    .map(|method| format!("{method:?}"))
                    .collect();
                let fields = provider
                    .fields(ty)
                    .iter()
                    .map(|field| field.name().as_str().to_string())
                    .collect();
                (provider.type_name(ty), kind, methods, fields)
            }
        };

        let list =
            |items: Vec<String>| Value::sequence(items.into_iter().map(Value::from).collect());
        Value::Struct(ScriptStruct::from_entries([
            ("name", Value::from(name)),
            ("kind", Value::text(kind)),
            ("methods", list(methods)),
            ("fields", list(fields)),
        ]))
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
enum MetadataKey {
    Type(TypeHandle),
    Class(String),
}

impl MetadataKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Instance(obj) => MetadataKey::Class(obj.class_name().to_string()),
            other => MetadataKey::Type(other.type_handle()),
        }
    }
}

/// Lazily populated metadata, one entry per type.
pub struct MetadataCache {
    factory: Arc<dyn MetadataFactory>,
    entries: DashMap<MetadataKey, Value, FxBuildHasher>,
}

impl MetadataCache {
    pub fn new(factory: Arc<dyn MetadataFactory>) -> Self {
        MetadataCache {
            factory,
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Metadata for `value`, building it on first request.
    pub fn get(&self, provider: &dyn Introspect, value: &Value) -> Value {
        let key = MetadataKey::of(value);
        if let Some(hit) = self.entries.get(&key) {
            return hit.value().clone();
        }
        tracing::debug!(?key, "building metadata");
        let built = self.factory.build(provider, value);
        // A concurrent build for the same key produced an equivalent value;
        // keep whichever landed first.
        self.entries.entry(key).or_insert(built).value().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(Arc::new(StructMetadata))
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
