//! Overload resolution.
//!
//! Runs on a cache miss. Candidates come from the provider in its stable
//! enumeration order (own members before inherited). Three filters apply in
//! sequence: name equality ignoring case, exact arity, then per-parameter
//! assignability. The **first** survivor wins; there is no most-specific
//! tie-break, so with `f(any)` declared before `f(Text)` a text argument
//! selects `f(any)`.

use std::sync::Arc;

use tern_value::{no_such_field, no_such_method, EvalError, Symbol, TypeHandle, TypeKind};

use crate::introspect::{FieldHandle, Introspect, MethodHandle};

/// Whether an argument of kind `arg` may be passed to a parameter of kind
/// `param`.
///
/// - `Any` accepts everything.
/// - Boxed arguments compare by their primitive.
/// - Null is compatible with every reference kind.
/// - Primitives widen `Char -> Int -> Float`, into primitive or boxed params.
/// - Host objects and class instances are compared by the provider's
///   subtype relation; an `Instance` parameter takes any class type.
pub fn is_assignable(provider: &dyn Introspect, arg: TypeKind, param: TypeKind) -> bool {
    match (arg.unboxed(), param) {
        (_, TypeKind::Any) => true,
        (TypeKind::Null, param) => param.is_reference(),
        (TypeKind::Primitive(a), TypeKind::Primitive(p) | TypeKind::Boxed(p)) => a.widens_to(p),
        (TypeKind::Object(a), TypeKind::Object(p)) => provider.is_subtype(a, p),
        (TypeKind::Object(a), TypeKind::Instance) => provider.is_subtype(a, TypeHandle::INSTANCE),
        (arg, param) => arg == param,
    }
}

fn accepts(provider: &dyn Introspect, params: &[TypeKind], args: &[TypeKind]) -> bool {
    params.len() == args.len()
        && params
            .iter()
            .zip(args)
            .all(|(&param, &arg)| is_assignable(provider, arg, param))
}

/// Find the first method named `symbol` accepting `args`.
#[tracing::instrument(level = "debug", skip(provider, symbol), fields(symbol = %symbol))]
pub fn discover_method(
    provider: &dyn Introspect,
    ty: TypeHandle,
    symbol: &Symbol,
    args: &[TypeKind],
) -> Result<Arc<MethodHandle>, EvalError> {
    let found = provider
        .methods(ty)
        .into_iter()
        .filter(|method| method.name() == symbol)
        .filter(|method| method.arity() == args.len())
        .find(|method| accepts(provider, method.params(), args));

    match found {
        Some(method) => {
            tracing::debug!(?method, "discovered method");
            Ok(method)
        }
        None => Err(no_such_method(
            symbol.as_str(),
            &provider.type_name(ty),
            args,
        )),
    }
}

/// Find the first constructor accepting `args`. Names do not participate.
#[tracing::instrument(level = "debug", skip(provider))]
pub fn discover_constructor(
    provider: &dyn Introspect,
    ty: TypeHandle,
    args: &[TypeKind],
) -> Result<Arc<MethodHandle>, EvalError> {
    provider
        .constructors(ty)
        .into_iter()
        .find(|ctor| accepts(provider, ctor.params(), args))
        .ok_or_else(|| no_such_method("new", &provider.type_name(ty), args))
}

/// Find the field named `symbol`, ignoring case.
#[tracing::instrument(level = "debug", skip(provider, symbol), fields(symbol = %symbol))]
pub fn discover_field(
    provider: &dyn Introspect,
    ty: TypeHandle,
    symbol: &Symbol,
) -> Result<Arc<FieldHandle>, EvalError> {
    let fields = provider.fields(ty);
    if let Some(field) = fields.iter().find(|field| field.name() == symbol) {
        return Ok(Arc::clone(field));
    }
    let available = fields
        .iter()
        .map(|field| field.name().as_str().to_string())
        .collect();
    Err(no_such_field(
        symbol.as_str(),
        &provider.type_name(ty),
        available,
    ))
}
