//! The language's own struct type.
//!
//! Keys are symbols, so lookups ignore case while the first spelling of each
//! key is kept. Structs answer the referenceable protocol themselves.

use std::fmt;

use crate::capability::{Engine, Referenceable};
use crate::errors::{key_not_found, no_such_method, EvalResult};
use crate::symbol::Symbol;
use crate::value::{OrderedMap, Shared, Value};

/// Case-insensitive, insertion-ordered struct.
#[derive(Clone)]
pub struct ScriptStruct(Shared<OrderedMap<Symbol>>);

impl ScriptStruct {
    pub fn new() -> Self {
        ScriptStruct(Shared::new(OrderedMap::new()))
    }

    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<Symbol>,
        I: IntoIterator<Item = (K, Value)>,
    {
        ScriptStruct(Shared::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn get(&self, key: &Symbol) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<Symbol>, value: Value) -> Option<Value> {
        self.0.write().insert(key.into(), value)
    }

    pub fn remove(&self, key: &Symbol) -> Option<Value> {
        self.0.write().remove(key)
    }

    pub fn contains_key(&self, key: &Symbol) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Keys in insertion order, as first spelled.
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().map(|k| k.as_str().to_string()).collect()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Default for ScriptStruct {
    fn default() -> Self {
        Self::new()
    }
}

impl Referenceable for ScriptStruct {
    fn dereference(&self, _engine: &dyn Engine, symbol: &Symbol, safe: bool) -> EvalResult {
        match self.get(symbol) {
            Some(value) => Ok(value),
            None if safe => Ok(Value::Absent),
            None => Err(key_not_found(symbol.as_str(), self.keys())),
        }
    }

    fn assign(&self, _engine: &dyn Engine, symbol: &Symbol, value: Value) -> EvalResult {
        self.insert(symbol.clone(), value.clone());
        Ok(value)
    }

    fn dereference_and_invoke(
        &self,
        engine: &dyn Engine,
        symbol: &Symbol,
        args: &[Value],
        safe: bool,
    ) -> EvalResult {
        // Guard released before calling back into the engine
        if let Some(member @ (Value::Function(_) | Value::Dynamic(_))) = self.get(symbol) {
            return engine.call(&member, args);
        }
        let receiver = Value::Struct(self.clone());
        if let Some(result) = engine.call_member_function(&receiver, symbol, args) {
            return result;
        }
        if safe {
            return Ok(Value::Absent);
        }
        let kinds: Vec<_> = args.iter().map(Value::type_kind).collect();
        Err(no_such_method(symbol.as_str(), "Struct", &kinds))
    }
}

impl fmt::Debug for ScriptStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}
