//! Tern Value - values, symbols and errors for the Tern runtime.
//!
//! This crate holds the data model the dispatch engine operates on:
//! - `Symbol`: canonical, case-insensitive names
//! - `TypeHandle` / `TypeKind`: type descriptors and argument kinds
//! - `Value`: the closed sum type over every dispatch target
//! - `TargetRef`: a (type, optional instance) pair
//! - `Referenceable` / `ClassInstance` / `BringUp`: native capabilities
//! - `EvalError` / `EvalResult`: structured errors

mod capability;
pub mod errors;
mod scope;
mod script_struct;
mod symbol;
mod target;
mod types;
mod value;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use capability::{BringUp, ClassInstance, Engine, NativeRef, Referenceable};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use scope::EvalScope;
pub use script_struct::ScriptStruct;
pub use symbol::{well_known, Symbol};
pub use target::TargetRef;
pub use types::{PrimitiveKind, TypeHandle, TypeKind};
pub use value::{
    ArrayRef, Callable, ErrorObject, HostObject, MapRef, NativeFn, OrderedMap, SequenceRef, Shared,
    Value,
};

// Re-export error constructors for convenience
pub use errors::{
    construction_failure, index_out_of_bounds, invalid_index, invocation_failure, key_not_found,
    missing_receiver, no_such_field, no_such_method, not_assignable,
};
