//! Type descriptors and argument kinds.
//!
//! `TypeHandle` identifies a type registered with an introspection provider.
//! `TypeKind` is what overload resolution compares: the runtime kind of an
//! argument, or the declared kind of a parameter.

use std::fmt;

/// Opaque identity of a type descriptor.
///
/// The first `BUILTIN_COUNT` handles are reserved for the value categories
/// the runtime itself knows about. Providers hand out the rest.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct TypeHandle(u32);

impl TypeHandle {
    /// Root of every reference type.
    pub const OBJECT: TypeHandle = TypeHandle(0);
    pub const NULL: TypeHandle = TypeHandle(1);
    pub const BOOL: TypeHandle = TypeHandle(2);
    pub const CHAR: TypeHandle = TypeHandle(3);
    pub const INT: TypeHandle = TypeHandle(4);
    pub const FLOAT: TypeHandle = TypeHandle(5);
    pub const TEXT: TypeHandle = TypeHandle(6);
    pub const SEQUENCE: TypeHandle = TypeHandle(7);
    pub const ARRAY: TypeHandle = TypeHandle(8);
    pub const MAP: TypeHandle = TypeHandle(9);
    pub const STRUCT: TypeHandle = TypeHandle(10);
    pub const ERROR: TypeHandle = TypeHandle(11);
    pub const FUNCTION: TypeHandle = TypeHandle(12);
    pub const INSTANCE: TypeHandle = TypeHandle(13);

    /// Number of reserved handles.
    pub const BUILTIN_COUNT: u32 = 14;

    const BUILTIN_NAMES: [&'static str; Self::BUILTIN_COUNT as usize] = [
        "Object", "Null", "Bool", "Char", "Int", "Float", "Text", "Sequence", "Array", "Map",
        "Struct", "Error", "Function", "Instance",
    ];

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeHandle(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this handle is one of the reserved built-in categories.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }

    /// Display name of a reserved handle.
    pub fn builtin_name(self) -> Option<&'static str> {
        Self::BUILTIN_NAMES.get(self.0 as usize).copied()
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "type#{}", self.0),
        }
    }
}

/// Unboxed scalar kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveKind {
    Bool,
    Char,
    Int,
    Float,
}

impl PrimitiveKind {
    /// Widening conversion: `Char -> Int -> Float`. `Bool` only matches itself.
    pub fn widens_to(self, target: PrimitiveKind) -> bool {
        use PrimitiveKind::{Char, Float, Int};
        self == target || matches!((self, target), (Char, Int | Float) | (Int, Float))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
        }
    }
}

/// Runtime kind of an argument, or declared kind of a parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    /// Null or absent argument.
    Null,
    Primitive(PrimitiveKind),
    /// Nullable reference wrapping a primitive.
    Boxed(PrimitiveKind),
    Text,
    Sequence,
    Array,
    Map,
    Struct,
    Error,
    Function,
    /// User-defined class instance.
    Instance,
    /// Host type known to an introspection provider.
    Object(TypeHandle),
    /// Generic reference; every argument is assignable to it.
    Any,
}

impl TypeKind {
    /// Boxed kinds compare by their primitive.
    #[inline]
    pub fn unboxed(self) -> Self {
        match self {
            TypeKind::Boxed(p) => TypeKind::Primitive(p),
            other => other,
        }
    }

    /// Whether null is a legal value of this kind.
    #[inline]
    pub fn is_reference(self) -> bool {
        !matches!(self, TypeKind::Primitive(_))
    }

    /// The type handle values of this kind are looked up against.
    pub fn handle(self) -> TypeHandle {
        match self {
            TypeKind::Null => TypeHandle::NULL,
            TypeKind::Primitive(p) | TypeKind::Boxed(p) => match p {
                PrimitiveKind::Bool => TypeHandle::BOOL,
                PrimitiveKind::Char => TypeHandle::CHAR,
                PrimitiveKind::Int => TypeHandle::INT,
                PrimitiveKind::Float => TypeHandle::FLOAT,
            },
            TypeKind::Text => TypeHandle::TEXT,
            TypeKind::Sequence => TypeHandle::SEQUENCE,
            TypeKind::Array => TypeHandle::ARRAY,
            TypeKind::Map => TypeHandle::MAP,
            TypeKind::Struct => TypeHandle::STRUCT,
            TypeKind::Error => TypeHandle::ERROR,
            TypeKind::Function => TypeHandle::FUNCTION,
            TypeKind::Instance => TypeHandle::INSTANCE,
            TypeKind::Object(handle) => handle,
            TypeKind::Any => TypeHandle::OBJECT,
        }
    }

    /// Inverse of `handle` for declared parameter kinds.
    ///
    /// Reserved scalar handles map to their boxed kind, since a parameter
    /// declared by type handle is a reference.
    pub fn of_handle(handle: TypeHandle) -> Self {
        match handle {
            TypeHandle::OBJECT => TypeKind::Any,
            TypeHandle::NULL => TypeKind::Null,
            TypeHandle::BOOL => TypeKind::Boxed(PrimitiveKind::Bool),
            TypeHandle::CHAR => TypeKind::Boxed(PrimitiveKind::Char),
            TypeHandle::INT => TypeKind::Boxed(PrimitiveKind::Int),
            TypeHandle::FLOAT => TypeKind::Boxed(PrimitiveKind::Float),
            TypeHandle::TEXT => TypeKind::Text,
            TypeHandle::SEQUENCE => TypeKind::Sequence,
            TypeHandle::ARRAY => TypeKind::Array,
            TypeHandle::MAP => TypeKind::Map,
            TypeHandle::STRUCT => TypeKind::Struct,
            TypeHandle::ERROR => TypeKind::Error,
            TypeHandle::FUNCTION => TypeKind::Function,
            TypeHandle::INSTANCE => TypeKind::Instance,
            other => TypeKind::Object(other),
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Null => f.write_str("null"),
            TypeKind::Primitive(p) => f.write_str(p.as_str()),
            TypeKind::Boxed(p) => write!(f, "{}?", p.as_str()),
            TypeKind::Object(handle) => write!(f, "{handle}"),
            TypeKind::Any => f.write_str("any"),
            other => write!(f, "{}", other.handle()),
        }
    }
}

#[cfg(test)]
mod tests;
