//! Test doubles for the `Engine` callback surface.

use rustc_hash::FxHashMap;

use crate::capability::Engine;
use crate::errors::{EvalError, EvalResult};
use crate::symbol::Symbol;
use crate::value::Value;

type MemberFn = Box<dyn Fn(&Value, &[Value]) -> EvalResult>;

/// Engine that calls functions directly and knows a fixed set of member
/// functions, independent of the receiver's category.
#[derive(Default)]
pub struct MockEngine {
    members: FxHashMap<Symbol, MemberFn>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_member(
        mut self,
        name: &str,
        func: impl Fn(&Value, &[Value]) -> EvalResult + 'static,
    ) -> Self {
        self.members.insert(Symbol::new(name), Box::new(func));
        self
    }
}

impl Engine for MockEngine {
    fn call(&self, callee: &Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Function(func) => func.call(args),
            other => Err(EvalError::new(format!("{} is not callable", other.type_name()))),
        }
    }

    fn call_member_function(
        &self,
        receiver: &Value,
        symbol: &Symbol,
        args: &[Value],
    ) -> Option<EvalResult> {
        self.members.get(symbol).map(|func| func(receiver, args))
    }
}
