//! Native dispatch capabilities.
//!
//! Values that know how to answer `dereference`, `assign` and
//! `dereference_and_invoke` themselves implement `Referenceable`; the
//! dispatcher hands them the request before trying any generic rule.
//! User-defined class instances additionally implement `ClassInstance`, and
//! may expose the two-phase `BringUp` run after construction.

use std::fmt;

use crate::errors::{EvalError, EvalResult};
use crate::scope::EvalScope;
use crate::script_struct::ScriptStruct;
use crate::symbol::Symbol;
use crate::types::TypeHandle;
use crate::value::Value;

/// Engine services available to natively referenceable values.
pub trait Engine {
    /// Invoke a callable value with positional arguments.
    fn call(&self, callee: &Value, args: &[Value]) -> EvalResult;

    /// Run the member function registered for the receiver's category.
    ///
    /// Returns `None` when no member function of that name exists.
    fn call_member_function(
        &self,
        receiver: &Value,
        symbol: &Symbol,
        args: &[Value],
    ) -> Option<EvalResult>;
}

/// The `{assign, dereference, dereference_and_invoke}` protocol.
pub trait Referenceable: Send + Sync {
    /// Read the member named by `symbol`.
    ///
    /// In safe mode a missing member yields `Value::Absent` instead of an error.
    fn dereference(&self, engine: &dyn Engine, symbol: &Symbol, safe: bool) -> EvalResult;

    /// Write the member named by `symbol`, returning the stored value.
    fn assign(&self, engine: &dyn Engine, symbol: &Symbol, value: Value) -> EvalResult;

    /// Look up the member named by `symbol` and call it.
    fn dereference_and_invoke(
        &self,
        engine: &dyn Engine,
        symbol: &Symbol,
        args: &[Value],
        safe: bool,
    ) -> EvalResult;
}

/// A user-defined class instance.
pub trait ClassInstance: Referenceable {
    fn class_name(&self) -> &str;

    /// Type descriptor used for overload resolution against the instance.
    fn type_handle(&self) -> TypeHandle {
        TypeHandle::INSTANCE
    }

    /// Declared member names, for metadata and diagnostics.
    fn member_names(&self) -> Vec<String>;

    /// Post-construction bring-up, if the class defines one.
    fn bring_up(&self) -> Option<&dyn BringUp> {
        None
    }
}

/// One-time, two-phase initialization of a freshly allocated instance.
pub trait BringUp {
    /// Claim the bring-up. Returns `false` if it was already claimed.
    fn begin_bring_up(&self) -> bool;

    /// Phase one: run field and property initializers in `scope`.
    fn run_initializers(&self, engine: &dyn Engine, scope: &mut EvalScope<'_>)
        -> Result<(), EvalError>;

    /// Whether the instance declares a member named `symbol`.
    fn declares(&self, symbol: &Symbol) -> bool;
}

/// Borrowed view of a natively referenceable value.
#[derive(Clone, Copy)]
pub enum NativeRef<'a> {
    Struct(&'a ScriptStruct),
    Instance(&'a dyn ClassInstance),
}

impl Referenceable for NativeRef<'_> {
    fn dereference(&self, engine: &dyn Engine, symbol: &Symbol, safe: bool) -> EvalResult {
        match self {
            NativeRef::Struct(s) => s.dereference(engine, symbol, safe),
            NativeRef::Instance(obj) => obj.dereference(engine, symbol, safe),
        }
    }

    fn assign(&self, engine: &dyn Engine, symbol: &Symbol, value: Value) -> EvalResult {
        match self {
            NativeRef::Struct(s) => s.assign(engine, symbol, value),
            NativeRef::Instance(obj) => obj.assign(engine, symbol, value),
        }
    }

    fn dereference_and_invoke(
        &self,
        engine: &dyn Engine,
        symbol: &Symbol,
        args: &[Value],
        safe: bool,
    ) -> EvalResult {
        match self {
            NativeRef::Struct(s) => s.dereference_and_invoke(engine, symbol, args, safe),
            NativeRef::Instance(obj) => obj.dereference_and_invoke(engine, symbol, args, safe),
        }
    }
}

impl fmt::Debug for NativeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeRef::Struct(_) => f.write_str("NativeRef::Struct"),
            NativeRef::Instance(obj) => write!(f, "NativeRef::Instance({})", obj.class_name()),
        }
    }
}
