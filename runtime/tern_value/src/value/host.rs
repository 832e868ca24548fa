//! Opaque host objects and native callables.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::errors::{EvalError, EvalResult};
use crate::types::TypeHandle;

use super::Value;

/// A host object reachable only through introspection.
///
/// The payload is type-erased; providers downcast it inside member handles.
#[derive(Clone)]
pub struct HostObject {
    ty: TypeHandle,
    data: Arc<dyn Any + Send + Sync>,
}

impl HostObject {
    pub fn new<T: Any + Send + Sync>(ty: TypeHandle, data: T) -> Self {
        HostObject {
            ty,
            data: Arc::new(data),
        }
    }

    /// Runtime type of the object.
    #[inline]
    pub fn type_handle(&self) -> TypeHandle {
        self.ty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostObject({})", self.ty)
    }
}

/// Signature of a native callable body.
pub type NativeFn = dyn Fn(&[Value]) -> EvalResult + Send + Sync;

/// A first-class callable value.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl Callable {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Callable {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> EvalResult {
        (self.func)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

/// An error held as a value.
///
/// Only the message is exposed to scripts; see the error allow-list in the
/// dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorObject {
    type_name: Arc<str>,
    message: Arc<str>,
}

impl ErrorObject {
    pub fn new(type_name: &str, message: &str) -> Self {
        ErrorObject {
            type_name: Arc::from(type_name),
            message: Arc::from(message),
        }
    }

    /// Capture a dispatch error as a value.
    pub fn from_error(error: &EvalError) -> Self {
        let type_name = match &error.kind {
            crate::errors::EvalErrorKind::Custom { .. } => "Error",
            _ => "DispatchError",
        };
        ErrorObject::new(type_name, &error.to_string())
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
