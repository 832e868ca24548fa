//! Host introspection.
//!
//! The `Introspect` trait is the only view of host types the resolver and
//! overload resolution depend on: list a type's members, compare types, and
//! invoke / read / write a member handle. `HostRegistry` implements it with a
//! hand-built table.

mod registry;

use std::fmt;
use std::sync::Arc;

use tern_value::{EvalError, EvalResult, Symbol, TypeHandle, TypeKind, Value};

pub use registry::{HostRegistry, TypeBuilder};

/// Body of a host method or constructor. Receives the bound instance for
/// instance members and `None` for static members and constructors.
pub type HostMethodFn = dyn Fn(Option<&Value>, &[Value]) -> EvalResult + Send + Sync;
/// Field reader.
pub type HostGetterFn = dyn Fn(Option<&Value>) -> EvalResult + Send + Sync;
/// Field writer.
pub type HostSetterFn = dyn Fn(Option<&Value>, Value) -> Result<(), EvalError> + Send + Sync;

/// Stable identity of a registered member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemberId(u32);

impl MemberId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        MemberId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// What kind of member a lookup targets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberKind {
    Method,
    Field,
    Constructor,
}

/// A callable member: method or constructor.
pub struct MethodHandle {
    pub(crate) id: MemberId,
    pub(crate) name: Symbol,
    pub(crate) declaring_type: TypeHandle,
    pub(crate) params: Vec<TypeKind>,
    pub(crate) is_static: bool,
    pub(crate) body: Arc<HostMethodFn>,
}

impl MethodHandle {
    /// Build a handle outside of `HostRegistry`, for custom providers.
    pub fn new(
        id: MemberId,
        name: Symbol,
        declaring_type: TypeHandle,
        params: Vec<TypeKind>,
        is_static: bool,
        body: Arc<HostMethodFn>,
    ) -> Self {
        MethodHandle {
            id,
            name,
            declaring_type,
            params,
            is_static,
            body,
        }
    }

    #[inline]
    pub fn id(&self) -> MemberId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    #[inline]
    pub fn declaring_type(&self) -> TypeHandle {
        self.declaring_type
    }

    #[inline]
    pub fn params(&self) -> &[TypeKind] {
        &self.params
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Same name (ignoring case) and identical parameter kinds.
    pub fn same_signature(&self, other: &MethodHandle) -> bool {
        self.name == other.name && self.params == other.params
    }

    /// Run the body.
    pub fn call(&self, receiver: Option<&Value>, args: &[Value]) -> EvalResult {
        (self.body)(receiver, args)
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        if self.is_static {
            f.write_str(" static")?;
        }
        Ok(())
    }
}

/// A field member.
pub struct FieldHandle {
    pub(crate) id: MemberId,
    pub(crate) name: Symbol,
    pub(crate) declaring_type: TypeHandle,
    pub(crate) kind: TypeKind,
    pub(crate) is_static: bool,
    pub(crate) getter: Arc<HostGetterFn>,
    pub(crate) setter: Option<Arc<HostSetterFn>>,
}

impl FieldHandle {
    /// Build a handle outside of `HostRegistry`, for custom providers.
    pub fn new(
        id: MemberId,
        name: Symbol,
        declaring_type: TypeHandle,
        kind: TypeKind,
        is_static: bool,
        getter: Arc<HostGetterFn>,
        setter: Option<Arc<HostSetterFn>>,
    ) -> Self {
        FieldHandle {
            id,
            name,
            declaring_type,
            kind,
            is_static,
            getter,
            setter,
        }
    }

    #[inline]
    pub fn id(&self) -> MemberId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    #[inline]
    pub fn declaring_type(&self) -> TypeHandle {
        self.declaring_type
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

impl fmt::Debug for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.kind)?;
        if self.is_static {
            f.write_str(" static")?;
        }
        Ok(())
    }
}

/// Host introspection provider.
pub trait Introspect: Send + Sync {
    /// Display name of a type.
    fn type_name(&self, ty: TypeHandle) -> String;

    /// Whether `sub` is `sup` or inherits from it.
    fn is_subtype(&self, sub: TypeHandle, sup: TypeHandle) -> bool;

    /// Callable members, own before inherited, otherwise in declaration
    /// order, with overridden signatures removed.
    fn methods(&self, ty: TypeHandle) -> Vec<Arc<MethodHandle>>;

    /// Constructors declared by the type itself.
    fn constructors(&self, ty: TypeHandle) -> Vec<Arc<MethodHandle>>;

    /// Fields, own before inherited, shadowed names removed.
    fn fields(&self, ty: TypeHandle) -> Vec<Arc<FieldHandle>>;

    /// Execute a callable handle.
    fn invoke(&self, method: &MethodHandle, receiver: Option<&Value>, args: &[Value]) -> EvalResult {
        method.call(receiver, args)
    }

    /// Read a field handle.
    fn read(&self, field: &FieldHandle, receiver: Option<&Value>) -> EvalResult {
        (field.getter)(receiver)
    }

    /// Write a field handle. Read-only fields reject the write.
    fn write(
        &self,
        field: &FieldHandle,
        receiver: Option<&Value>,
        value: Value,
    ) -> Result<(), EvalError> {
        match &field.setter {
            Some(setter) => setter(receiver, value),
            None => Err(tern_value::not_assignable(&format!(
                "{}.{}",
                self.type_name(field.declaring_type),
                field.name
            ))),
        }
    }
}
