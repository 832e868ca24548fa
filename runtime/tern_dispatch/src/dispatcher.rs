//! Unified protocol dispatcher.
//!
//! One entry point per protocol operation: `dereference`, `assign` and
//! `dereference_and_invoke`. Each tries, in order:
//!
//! 1. the target's native `Referenceable` implementation (structs, class
//!    instances);
//! 2. the introspection symbol, answered with cached metadata (reads only);
//! 3. ordered maps, keyed by the symbol's original text;
//! 4. sequences and fixed arrays, by 1-based numeric index or `length`;
//! 5. error objects, restricted to a fixed allow-list of fields;
//! 6. text, by 1-based numeric index;
//! 7. the caching resolver against the target's host type.
//!
//! Invocation calls a map entry holding a callable directly, then consults
//! the member-function table ahead of the resolver. In safe mode lookup
//! failures become `Value::Absent`; failures raised while a member runs are
//! never recovered.

use std::sync::Arc;

use tern_value::{
    index_out_of_bounds, invalid_index, key_not_found, well_known, Engine, ErrorObject, EvalError,
    EvalErrorKind, EvalResult, EvalScope, Referenceable, Symbol, TargetRef, TypeHandle, Value,
};

use crate::builder::DispatcherBuilder;
use crate::executor::Executor;
use crate::introspect::Introspect;
use crate::member_functions::MemberFunctions;
use crate::metadata::MetadataCache;
use crate::resolver::{CacheStats, Resolver};

/// Dynamic member dispatcher.
///
/// Holds the resolver (and with it the call-site cache), the member-function
/// table and the metadata cache. Shareable across threads.
#[derive(Debug)]
pub struct Dispatcher {
    executor: Executor,
    member_functions: MemberFunctions,
    metadata: MetadataCache,
    introspection_symbol: Symbol,
}

impl Dispatcher {
    /// Dispatcher with default configuration, honouring `TERN_DISPATCH_CACHE`.
    pub fn new(provider: Arc<dyn Introspect>) -> Self {
        DispatcherBuilder::new(provider).build()
    }

    pub fn builder(provider: Arc<dyn Introspect>) -> DispatcherBuilder {
        DispatcherBuilder::new(provider)
    }

    pub(crate) fn from_parts(
        resolver: Resolver,
        member_functions: MemberFunctions,
        metadata: MetadataCache,
        introspection_symbol: Symbol,
    ) -> Self {
        Dispatcher {
            executor: Executor::new(resolver),
            member_functions,
            metadata,
            introspection_symbol,
        }
    }

    /// Read the member `symbol` of `target`.
    #[tracing::instrument(
        level = "trace",
        skip(self, target, symbol),
        fields(symbol = %symbol)
    )]
    pub fn dereference(&self, target: &Value, symbol: &Symbol, safe: bool) -> EvalResult {
        if let Some(instance) = bound_instance(target) {
            return self.dereference(instance, symbol, safe);
        }
        if let Some(native) = target.as_referenceable() {
            return native.dereference(self, symbol, safe);
        }
        if *symbol == self.introspection_symbol {
            return Ok(self.metadata.get(self.provider(), target));
        }

        let result = match target {
            Value::Map(map) => map
                .get(symbol.as_str())
                .ok_or_else(|| key_not_found(symbol.as_str(), map.keys())),
            Value::Sequence(seq) => read_element(symbol, seq.len(), "Sequence", |pos| seq.get(pos)),
            Value::Array(arr) => read_element(symbol, arr.len(), "Array", |pos| arr.get(pos)),
            Value::Error(err) => match error_field(err, symbol) {
                Some(value) => Ok(value),
                None => self.read_host_field(target, symbol),
            },
            Value::Text(text) if symbol.is_numeric() => char_at(text, symbol),
            _ => self.read_host_field(target, symbol),
        };
        recover(result, safe)
    }

    /// Write `value` into the member `symbol` of `target`, returning it.
    ///
    /// Sequences grow to fit, padding the gap with `Value::Absent`; fixed
    /// arrays reject out-of-range writes. Writes to error objects are
    /// accepted and discarded.
    #[tracing::instrument(
        level = "trace",
        skip(self, target, symbol, value),
        fields(symbol = %symbol)
    )]
    pub fn assign(&self, target: &Value, symbol: &Symbol, value: Value) -> EvalResult {
        if let Some(instance) = bound_instance(target) {
            return self.assign(instance, symbol, value);
        }
        if let Some(native) = target.as_referenceable() {
            return native.assign(self, symbol, value);
        }

        match target {
            Value::Map(map) => {
                map.insert(symbol.as_str(), value.clone());
                Ok(value)
            }
            Value::Sequence(seq) => {
                let index = require_index(symbol, "Sequence")?;
                let pos = usize::try_from(index)
                    .ok()
                    .and_then(|index| index.checked_sub(1))
                    .ok_or_else(|| index_out_of_bounds(index, seq.len()))?;
                seq.set_padded(pos, value.clone())
                    .map_err(|_| index_out_of_bounds(index, seq.len()))?;
                Ok(value)
            }
            Value::Array(arr) => {
                let index = require_index(symbol, "Array")?;
                let len = arr.len();
                match position(index, len) {
                    Some(pos) if arr.set(pos, value.clone()) => Ok(value),
                    _ => Err(index_out_of_bounds(index, len)),
                }
            }
            Value::Error(_) => Ok(value),
            Value::Dynamic(target) => self.executor.set_field(target, symbol, value),
            other => self
                .executor
                .set_field(&TargetRef::of_value(other.clone()), symbol, value),
        }
    }

    /// Look up the member `symbol` of `target` and call it with `args`.
    #[tracing::instrument(
        level = "trace",
        skip(self, target, symbol, args),
        fields(symbol = %symbol)
    )]
    pub fn dereference_and_invoke(
        &self,
        target: &Value,
        symbol: &Symbol,
        args: &[Value],
        safe: bool,
    ) -> EvalResult {
        if let Some(instance) = bound_instance(target) {
            return self.dereference_and_invoke(instance, symbol, args, safe);
        }
        if let Some(native) = target.as_referenceable() {
            return native.dereference_and_invoke(self, symbol, args, safe);
        }
        if let Value::Map(map) = target {
            if let Some(member @ (Value::Function(_) | Value::Dynamic(_))) =
                map.get(symbol.as_str())
            {
                return self.call(&member, args);
            }
        }
        if let Some(result) = self.member_functions.call(target, symbol, args) {
            return result;
        }

        let result = match target {
            Value::Dynamic(target) => self.executor.invoke(target, symbol, args),
            Value::Map(map) => self
                .executor
                .invoke(&TargetRef::of_value(target.clone()), symbol, args)
                .map_err(|err| match err.kind {
                    EvalErrorKind::NoMethod { .. } => key_not_found(symbol.as_str(), map.keys()),
                    _ => err,
                }),
            other => self
                .executor
                .invoke(&TargetRef::of_value(other.clone()), symbol, args),
        };
        recover(result, safe)
    }

    /// Construct an instance of `ty`, bringing class instances up in a scope
    /// chained to `scope`.
    pub fn construct(&self, ty: TypeHandle, args: &[Value], scope: &EvalScope<'_>) -> EvalResult {
        self.executor.invoke_constructor(self, ty, args, scope)
    }

    /// Call a static member of `ty`.
    pub fn invoke_static(&self, ty: TypeHandle, symbol: &Symbol, args: &[Value]) -> EvalResult {
        self.executor.invoke_static(ty, symbol, args)
    }

    /// Read a static field of `ty`.
    pub fn get_static_field(&self, ty: TypeHandle, symbol: &Symbol) -> EvalResult {
        self.executor.get_static_field(ty, symbol)
    }

    fn read_host_field(&self, target: &Value, symbol: &Symbol) -> EvalResult {
        match target {
            Value::Dynamic(target) => self.executor.get_field(target, symbol),
            other => self
                .executor
                .get_field(&TargetRef::of_value(other.clone()), symbol),
        }
    }

    // Accessors and administration

    #[inline]
    pub fn provider(&self) -> &dyn Introspect {
        self.executor.resolver().provider()
    }

    #[inline]
    pub fn resolver(&self) -> &Resolver {
        self.executor.resolver()
    }

    #[inline]
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    #[inline]
    pub fn member_functions(&self) -> &MemberFunctions {
        &self.member_functions
    }

    #[inline]
    pub fn introspection_symbol(&self) -> &Symbol {
        &self.introspection_symbol
    }

    /// Administrative cache toggle. Cached entries survive being disabled.
    pub fn set_cache_enabled(&self, enabled: bool) {
        tracing::debug!(enabled, "call cache toggled");
        self.resolver().set_cache_enabled(enabled);
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.resolver().cache().is_enabled()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.resolver().cache_stats()
    }

    /// Drop cached resolutions and metadata, e.g. after host types change.
    pub fn clear_caches(&self) {
        self.resolver().cache().clear();
        self.metadata.clear();
    }
}

impl Engine for Dispatcher {
    /// Functions are called directly; a deferred target reference calls its
    /// bound value, or constructs its type when unbound.
    fn call(&self, callee: &Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Function(func) => func.call(args),
            Value::Dynamic(target) => match target.instance() {
                Some(instance) => self.call(instance, args),
                None => self.construct(target.type_handle(), args, &EvalScope::new()),
            },
            other => Err(EvalError::new(format!(
                "value of type {} is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_member_function(
        &self,
        receiver: &Value,
        symbol: &Symbol,
        args: &[Value],
    ) -> Option<EvalResult> {
        self.member_functions.call(receiver, symbol, args)
    }
}

/// Safe mode turns lookup failures into the absent marker.
fn recover(result: EvalResult, safe: bool) -> EvalResult {
    match result {
        Err(err) if safe && err.is_recoverable_lookup() => {
            tracing::trace!(%err, "recovered in safe mode");
            Ok(Value::Absent)
        }
        other => other,
    }
}

fn bound_instance(target: &Value) -> Option<&Value> {
    match target {
        Value::Dynamic(target) => target.instance(),
        _ => None,
    }
}

/// Zero-based position of a 1-based `index`, if within `len`.
fn position(index: i64, len: usize) -> Option<usize> {
    let pos = usize::try_from(index).ok()?.checked_sub(1)?;
    (pos < len).then_some(pos)
}

fn require_index(symbol: &Symbol, type_name: &str) -> Result<i64, EvalError> {
    symbol
        .as_index()
        .ok_or_else(|| invalid_index(symbol.as_str(), type_name))
}

fn count(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

fn read_element(
    symbol: &Symbol,
    len: usize,
    type_name: &str,
    get: impl Fn(usize) -> Option<Value>,
) -> EvalResult {
    if symbol.is(well_known::LENGTH) {
        return Ok(count(len));
    }
    let index = require_index(symbol, type_name)?;
    position(index, len)
        .and_then(get)
        .ok_or_else(|| index_out_of_bounds(index, len))
}

/// The allow-listed fields of an error object. Only `message` carries data.
fn error_field(err: &ErrorObject, symbol: &Symbol) -> Option<Value> {
    if symbol.is(well_known::MESSAGE) {
        return Some(Value::text(err.message()));
    }
    well_known::ERROR_FIELDS
        .iter()
        .any(|field| symbol.is(field))
        .then(|| Value::text(""))
}

fn char_at(text: &str, symbol: &Symbol) -> EvalResult {
    let index = require_index(symbol, "Text")?;
    let len = text.chars().count();
    position(index, len)
        .and_then(|pos| text.chars().nth(pos))
        .map(|ch| Value::text(ch.to_string()))
        .ok_or_else(|| index_out_of_bounds(index, len))
}
