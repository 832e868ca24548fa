//! Chained evaluation scopes.
//!
//! A child scope sees every binding of its ancestors; new bindings land in
//! the innermost scope only. Used for class bring-up, where initializers run
//! in a scope chained to the caller's.

use rustc_hash::FxHashMap;

use crate::symbol::Symbol;
use crate::value::Value;

/// A single scope with an optional parent.
#[derive(Debug, Default)]
pub struct EvalScope<'p> {
    parent: Option<&'p EvalScope<'p>>,
    bindings: FxHashMap<Symbol, Value>,
}

impl<'p> EvalScope<'p> {
    /// Root scope with no parent.
    pub fn new() -> Self {
        EvalScope {
            parent: None,
            bindings: FxHashMap::default(),
        }
    }

    /// Child scope chained to `self`.
    pub fn child(&self) -> EvalScope<'_> {
        EvalScope {
            parent: Some(self),
            bindings: FxHashMap::default(),
        }
    }

    /// Bind in this scope, shadowing any ancestor binding.
    pub fn bind(&mut self, name: impl Into<Symbol>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look a name up, innermost scope first.
    pub fn lookup(&self, name: &Symbol) -> Option<&Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.bindings.get(name) {
                return Some(value);
            }
            scope = current.parent;
        }
        None
    }

    /// Look a name up in this scope only.
    pub fn lookup_local(&self, name: &Symbol) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Number of scopes from here to the root, counting this one.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut scope = self.parent;
        while let Some(current) = scope {
            depth += 1;
            scope = current.parent;
        }
        depth
    }
}
