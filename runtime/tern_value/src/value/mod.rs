//! Runtime values.
//!
//! `Value` is a closed sum type over every target kind the dispatcher knows:
//! scalars, text, containers, error objects, host objects, callables,
//! user-defined class instances and deferred target references. Dispatch
//! matches on it rather than probing for capabilities.
//!
//! # Thread Safety
//!
//! Heap variants are reference counted with `Arc`; mutable containers guard
//! their storage with `parking_lot::RwLock`.

mod containers;
mod host;

use std::fmt;
use std::sync::Arc;

pub use containers::{ArrayRef, MapRef, OrderedMap, SequenceRef, Shared};
pub use host::{Callable, ErrorObject, HostObject, NativeFn};

use crate::capability::{ClassInstance, NativeRef};
use crate::errors::EvalResult;
use crate::script_struct::ScriptStruct;
use crate::target::TargetRef;
use crate::types::{PrimitiveKind, TypeHandle, TypeKind};

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Absent marker: "no value" stored inside a container slot.
    Absent,

    // Scalars
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f64),

    /// Immutable text.
    Text(Arc<str>),

    // Raw containers, handled by the dispatcher's container rules
    /// Growable sequence.
    Sequence(SequenceRef),
    /// Fixed-size array.
    Array(ArrayRef),
    /// Raw ordered map keyed by case-preserving text.
    Map(MapRef),

    // Natively referenceable
    /// The language's own case-insensitive struct.
    Struct(ScriptStruct),
    /// User-defined class instance.
    Instance(Arc<dyn ClassInstance>),

    /// Error held as a value.
    Error(ErrorObject),
    /// Host object reachable through introspection.
    Host(HostObject),
    /// Callable value.
    Function(Callable),
    /// Deferred target reference: a class reference, optionally bound.
    Dynamic(Arc<TargetRef>),
}

// Factory methods

impl Value {
    pub fn text(text: impl AsRef<str>) -> Self {
        Value::Text(Arc::from(text.as_ref()))
    }

    pub fn sequence(items: Vec<Value>) -> Self {
        Value::Sequence(Shared::new(items))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Shared::new(items.into_boxed_slice()))
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(Shared::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn error(type_name: &str, message: &str) -> Self {
        Value::Error(ErrorObject::new(type_name, message))
    }

    pub fn function<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        Value::Function(Callable::new(name, func))
    }

    pub fn instance<T: ClassInstance + 'static>(instance: T) -> Self {
        Value::Instance(Arc::new(instance))
    }

    pub fn dynamic(target: TargetRef) -> Self {
        Value::Dynamic(Arc::new(target))
    }
}

// Inspection

impl Value {
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or absent.
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Native implementation of the referenceable protocol, if any.
    pub fn as_referenceable(&self) -> Option<NativeRef<'_>> {
        match self {
            Value::Struct(s) => Some(NativeRef::Struct(s)),
            Value::Instance(obj) => Some(NativeRef::Instance(obj.as_ref())),
            _ => None,
        }
    }

    /// Runtime kind used for overload resolution.
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Value::Null | Value::Absent => TypeKind::Null,
            Value::Bool(_) => TypeKind::Primitive(PrimitiveKind::Bool),
            Value::Char(_) => TypeKind::Primitive(PrimitiveKind::Char),
            Value::Int(_) => TypeKind::Primitive(PrimitiveKind::Int),
            Value::Float(_) => TypeKind::Primitive(PrimitiveKind::Float),
            Value::Text(_) => TypeKind::Text,
            Value::Sequence(_) => TypeKind::Sequence,
            Value::Array(_) => TypeKind::Array,
            Value::Map(_) => TypeKind::Map,
            Value::Struct(_) => TypeKind::Struct,
            Value::Instance(obj) if obj.type_handle() == TypeHandle::INSTANCE => {
                TypeKind::Instance
            }
            Value::Instance(obj) => TypeKind::Object(obj.type_handle()),
            Value::Error(_) => TypeKind::Error,
            Value::Host(obj) => TypeKind::Object(obj.type_handle()),
            Value::Function(_) => TypeKind::Function,
            Value::Dynamic(target) => TypeKind::Object(target.type_handle()),
        }
    }

    /// Type descriptor the value resolves members against.
    pub fn type_handle(&self) -> TypeHandle {
        match self {
            Value::Host(obj) => obj.type_handle(),
            Value::Instance(obj) => obj.type_handle(),
            Value::Dynamic(target) => target.type_handle(),
            other => other.type_kind().handle(),
        }
    }

    /// Name used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Instance(obj) => obj.class_name().to_string(),
            Value::Error(err) => err.type_name().to_string(),
            other => other.type_handle().to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Absent, Value::Absent) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => {
                a.ptr_eq(b) || a.snapshot() == b.snapshot()
            }
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || a.snapshot() == b.snapshot(),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            (Value::Struct(a), Value::Struct(b)) => a.ptr_eq(b),
            (Value::Instance(a), Value::Instance(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Dynamic(a), Value::Dynamic(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Absent => f.write_str("Absent"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Char(c) => write!(f, "Char({c:?})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Text(s) => write!(f, "Text({:?})", &**s),
            Value::Sequence(items) => write!(f, "Sequence({items:?})"),
            Value::Array(items) => write!(f, "Array({items:?})"),
            Value::Map(entries) => write!(f, "Map({entries:?})"),
            Value::Struct(s) => write!(f, "Struct({s:?})"),
            Value::Instance(obj) => write!(f, "Instance({})", obj.class_name()),
            Value::Error(err) => write!(f, "Error({}: {})", err.type_name(), err.message()),
            Value::Host(obj) => write!(f, "{obj:?}"),
            Value::Function(func) => write!(f, "{func:?}"),
            Value::Dynamic(target) => write!(f, "Dynamic({target:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Absent => f.write_str(""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Error(err) => f.write_str(err.message()),
            Value::Instance(obj) => write!(f, "<{}>", obj.class_name()),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}
