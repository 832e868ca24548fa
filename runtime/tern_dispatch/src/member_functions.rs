//! Member functions.
//!
//! Runtime-provided behaviors attached to a value category rather than to a
//! host type, e.g. `contains` on sequences. The dispatcher consults this table
//! before overload resolution, so a member function shadows a host method of
//! the same name. Lookup tries the receiver's own category first, then the
//! root `Object` category.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tern_value::{EvalError, EvalResult, Symbol, TypeHandle, Value};

/// Body of a member function: receiver, then positional arguments.
pub type MemberFn = dyn Fn(&Value, &[Value]) -> EvalResult + Send + Sync;

/// Table of member functions keyed by (category, name).
#[derive(Default, Clone)]
pub struct MemberFunctions {
    table: FxHashMap<(TypeHandle, Symbol), Arc<MemberFn>>,
}

impl MemberFunctions {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table every dispatcher starts with.
    pub fn standard() -> Self {
        let mut functions = Self::new();
        for ty in [TypeHandle::SEQUENCE, TypeHandle::ARRAY] {
            functions.register(ty, "contains", sequence_contains);
            functions.register(ty, "indexOf", sequence_index_of);
        }
        functions.register(TypeHandle::TEXT, "len", text_len);
        functions.register(TypeHandle::TEXT, "upper", text_upper);
        functions.register(TypeHandle::TEXT, "lower", text_lower);
        functions.register(TypeHandle::MAP, "keyExists", map_key_exists);
        functions.register(TypeHandle::MAP, "keyList", map_key_list);
        functions.register(TypeHandle::STRUCT, "keyExists", struct_key_exists);
        functions.register(TypeHandle::STRUCT, "keyList", struct_key_list);
        functions
    }

    /// Add or replace the function `name` for values of category `ty`.
    pub fn register<F>(&mut self, ty: TypeHandle, name: &str, func: F)
    where
        F: Fn(&Value, &[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.table.insert((ty, Symbol::new(name)), Arc::new(func));
    }

    /// Find the function for `receiver`'s category, falling back to `Object`.
    pub fn lookup(&self, receiver: &Value, symbol: &Symbol) -> Option<Arc<MemberFn>> {
        let own = (receiver.type_kind().handle(), symbol.clone());
        self.table
            .get(&own)
            .or_else(|| self.table.get(&(TypeHandle::OBJECT, symbol.clone())))
            .cloned()
    }

    /// Run the function if one is registered.
    pub fn call(&self, receiver: &Value, symbol: &Symbol, args: &[Value]) -> Option<EvalResult> {
        let func = self.lookup(receiver, symbol)?;
        tracing::trace!(%symbol, receiver = %receiver.type_name(), "member function");
        Some(func(receiver, args))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl std::fmt::Debug for MemberFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberFunctions")
            .field("len", &self.table.len())
            .finish()
    }
}

// Argument helpers

#[inline]
fn require_args(method: &str, expected: usize, args: &[Value]) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::new(format!(
            "{method} expects {expected} argument(s), got {}",
            args.len()
        )))
    }
}

fn require_text<'a>(method: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    value
        .as_text()
        .ok_or_else(|| EvalError::new(format!("{method} expects text, got {}", value.type_name())))
}

fn elements(receiver: &Value) -> Vec<Value> {
    match receiver {
        Value::Sequence(seq) => seq.snapshot(),
        Value::Array(arr) => arr.snapshot(),
        _ => Vec::new(),
    }
}

// Sequence and array

fn sequence_contains(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("contains", 1, args)?;
    Ok(Value::Bool(elements(receiver).contains(&args[0])))
}

/// 1-based position of the first equal element, 0 when absent.
fn sequence_index_of(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("indexOf", 1, args)?;
    let position = elements(receiver)
        .iter()
        .position(|item| *item == args[0])
        .map_or(0, |pos| i64::try_from(pos + 1).unwrap_or(i64::MAX));
    Ok(Value::Int(position))
}

// Text

fn text_len(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("len", 0, args)?;
    let text = require_text("len", receiver)?;
    Ok(Value::Int(
        i64::try_from(text.chars().count()).unwrap_or(i64::MAX),
    ))
}

fn text_upper(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("upper", 0, args)?;
    Ok(Value::text(require_text("upper", receiver)?.to_uppercase()))
}

fn text_lower(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("lower", 0, args)?;
    Ok(Value::text(require_text("lower", receiver)?.to_lowercase()))
}

// Map

fn map_key_exists(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("keyExists", 1, args)?;
    let key = require_text("keyExists", &args[0])?;
    Ok(Value::Bool(match receiver {
        Value::Map(map) => map.contains_key(key),
        _ => false,
    }))
}

fn map_key_list(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("keyList", 0, args)?;
    let keys = match receiver {
        Value::Map(map) => map.keys(),
        _ => Vec::new(),
    };
    Ok(Value::sequence(keys.into_iter().map(Value::from).collect()))
}

// Struct

fn struct_key_exists(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("keyExists", 1, args)?;
    let key = require_text("keyExists", &args[0])?;
    Ok(Value::Bool(match receiver {
        Value::Struct(s) => s.contains_key(&Symbol::new(key)),
        _ => false,
    }))
}

fn struct_key_list(receiver: &Value, args: &[Value]) -> EvalResult {
    require_args("keyList", 0, args)?;
    let keys = match receiver {
        Value::Struct(s) => s.keys(),
        _ => Vec::new(),
    };
    Ok(Value::sequence(keys.into_iter().map(Value::from).collect()))
}
