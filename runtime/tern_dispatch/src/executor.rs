//! Invocation & construction executor.
//!
//! Runs what the resolver found. Arguments that are deferred target
//! references are unwrapped to their bound instance first, so overload
//! resolution sees the instance's kind. Failures raised while running a
//! member are wrapped in `InvocationFailure` (or `ConstructionFailure`)
//! with the original error attached as the cause; lookup failures pass
//! through unwrapped so safe mode can still recover them.

use std::sync::Arc;

use tern_value::{
    construction_failure, invocation_failure, missing_receiver, not_assignable, well_known,
    ClassInstance, Engine, EvalError, EvalResult, EvalScope, Referenceable, Symbol, TargetRef,
    TypeHandle, Value,
};

use crate::introspect::{FieldHandle, MethodHandle};
use crate::resolver::{ResolvedCall, Resolver, Signature};

/// Executes resolved members against their targets.
#[derive(Debug)]
pub struct Executor {
    resolver: Resolver,
}

impl Executor {
    pub fn new(resolver: Resolver) -> Self {
        Executor { resolver }
    }

    #[inline]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Call the member `symbol` of `target`.
    ///
    /// Static members run without a receiver; instance members require the
    /// target to carry one.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(symbol = %symbol, ty = %target.type_handle())
    )]
    pub fn invoke(&self, target: &TargetRef, symbol: &Symbol, args: &[Value]) -> EvalResult {
        let args = unwrap_targets(args);
        let kinds = signature_of(&args);
        let resolved = self.resolver.resolve(target, symbol, &kinds)?;
        let method = callable(&resolved)?;
        let receiver = self.receiver(&resolved, target, symbol)?;

        self.resolver
            .provider()
            .invoke(method, receiver, &args)
            .map_err(|cause| invocation_failure(symbol.as_str(), &self.type_name(target), cause))
    }

    /// Call a static member of `ty`.
    pub fn invoke_static(&self, ty: TypeHandle, symbol: &Symbol, args: &[Value]) -> EvalResult {
        self.invoke(&TargetRef::of_type(ty), symbol, args)
    }

    /// Construct an instance of `ty`.
    ///
    /// A class instance that supports bring-up is brought up once: its field
    /// initializers run in a scope chained to `scope`, then `init` runs with
    /// the constructor arguments if the class declares it. A non-null result
    /// from `init` replaces the freshly built instance.
    #[tracing::instrument(level = "debug", skip(self, engine, args, scope))]
    pub fn invoke_constructor(
        &self,
        engine: &dyn Engine,
        ty: TypeHandle,
        args: &[Value],
        scope: &EvalScope<'_>,
    ) -> EvalResult {
        self.construct(engine, ty, args, scope).map_err(|cause| {
            construction_failure(&self.resolver.provider().type_name(ty), cause)
        })
    }

    fn construct(
        &self,
        engine: &dyn Engine,
        ty: TypeHandle,
        args: &[Value],
        scope: &EvalScope<'_>,
    ) -> EvalResult {
        let args = unwrap_targets(args);
        let kinds = signature_of(&args);
        let resolved = self.resolver.resolve_constructor(ty, &kinds)?;
        let ctor = callable(&resolved)?;
        let instance = self.resolver.provider().invoke(ctor, None, &args)?;
        bring_up(engine, instance, &args, scope)
    }

    /// Read the field `symbol` of `target`.
    pub fn get_field(&self, target: &TargetRef, symbol: &Symbol) -> EvalResult {
        let resolved = self.resolver.resolve_field(target, symbol)?;
        let field = field(&resolved)?;
        let receiver = self.receiver(&resolved, target, symbol)?;

        self.resolver
            .provider()
            .read(field, receiver)
            .map_err(|cause| invocation_failure(symbol.as_str(), &self.type_name(target), cause))
    }

    /// Read a static field of `ty`.
    pub fn get_static_field(&self, ty: TypeHandle, symbol: &Symbol) -> EvalResult {
        self.get_field(&TargetRef::of_type(ty), symbol)
    }

    /// Write the field `symbol` of `target`, returning the stored value.
    pub fn set_field(&self, target: &TargetRef, symbol: &Symbol, value: Value) -> EvalResult {
        let resolved = self.resolver.resolve_field(target, symbol)?;
        let field = field(&resolved)?;
        if !field.is_writable() {
            return Err(not_assignable(&format!(
                "{}.{}",
                self.type_name(target),
                field.name()
            )));
        }
        let receiver = self.receiver(&resolved, target, symbol)?;

        self.resolver
            .provider()
            .write(field, receiver, value.clone())
            .map_err(|cause| invocation_failure(symbol.as_str(), &self.type_name(target), cause))?;
        Ok(value)
    }

    /// Static members never bind; instance members need the target's instance.
    fn receiver<'t>(
        &self,
        resolved: &ResolvedCall,
        target: &'t TargetRef,
        symbol: &Symbol,
    ) -> Result<Option<&'t Value>, EvalError> {
        if resolved.is_static() {
            return Ok(None);
        }
        match target.instance() {
            Some(instance) => Ok(Some(instance)),
            None => Err(missing_receiver(symbol.as_str(), &self.type_name(target))),
        }
    }

    fn type_name(&self, target: &TargetRef) -> String {
        self.resolver.provider().type_name(target.type_handle())
    }
}

/// Replace bound deferred target references with their instance.
///
/// Unbound references stay as they are: they denote a class, not a value.
fn unwrap_targets(args: &[Value]) -> Vec<Value> {
    args.iter()
        .map(|arg| match arg {
            Value::Dynamic(target) => target.instance().cloned().unwrap_or_else(|| arg.clone()),
            other => other.clone(),
        })
        .collect()
}

fn signature_of(args: &[Value]) -> Signature {
    args.iter().map(Value::type_kind).collect()
}

fn callable(resolved: &ResolvedCall) -> Result<&MethodHandle, EvalError> {
    resolved
        .as_method()
        .map(|handle| &**handle)
        .ok_or_else(|| EvalError::new("resolved member is a field, not a callable"))
}

fn field(resolved: &ResolvedCall) -> Result<&FieldHandle, EvalError> {
    resolved
        .as_field()
        .map(|handle| &**handle)
        .ok_or_else(|| EvalError::new("resolved member is a callable, not a field"))
}

/// Two-phase bring-up of a freshly constructed class instance.
fn bring_up(
    engine: &dyn Engine,
    instance: Value,
    args: &[Value],
    scope: &EvalScope<'_>,
) -> EvalResult {
    let obj: Option<Arc<dyn ClassInstance>> = match &instance {
        Value::Instance(obj) => Some(Arc::clone(obj)),
        _ => None,
    };
    let Some(obj) = obj else {
        return Ok(instance);
    };
    let Some(phases) = obj.bring_up() else {
        return Ok(instance);
    };
    if !phases.begin_bring_up() {
        return Ok(instance);
    }

    tracing::debug!(class = obj.class_name(), "bringing up instance");
    let mut initializer_scope = scope.child();
    phases.run_initializers(engine, &mut initializer_scope)?;

    let init = Symbol::new(well_known::INIT);
    if phases.declares(&init) {
        let result = obj.dereference_and_invoke(engine, &init, args, false)?;
        if !result.is_nullish() {
            return Ok(result);
        }
    }
    Ok(instance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
