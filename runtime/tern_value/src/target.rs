//! Target references.
//!
//! Every resolver entry point works against a `(type, optional instance)`
//! pair. An absent instance means only static members can be used.

use crate::types::TypeHandle;
use crate::value::Value;

/// What a lookup resolves against.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetRef {
    ty: TypeHandle,
    instance: Option<Value>,
}

impl TargetRef {
    /// Explicit type and optional instance.
    pub fn new(ty: TypeHandle, instance: Option<Value>) -> Self {
        TargetRef { ty, instance }
    }

    /// Derive the type from the instance.
    ///
    /// A deferred target reference is unwrapped rather than nested.
    pub fn of_value(value: Value) -> Self {
        match value {
            Value::Dynamic(target) => (*target).clone(),
            other => TargetRef {
                ty: other.type_handle(),
                instance: Some(other),
            },
        }
    }

    /// Static-only lookup.
    pub fn of_type(ty: TypeHandle) -> Self {
        TargetRef { ty, instance: None }
    }

    #[inline]
    pub fn type_handle(&self) -> TypeHandle {
        self.ty
    }

    #[inline]
    pub fn instance(&self) -> Option<&Value> {
        self.instance.as_ref()
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.instance.is_none()
    }

    /// Same type, bound to `instance`.
    #[must_use]
    pub fn bind(&self, instance: Value) -> Self {
        TargetRef {
            ty: self.ty,
            instance: Some(instance),
        }
    }
}
