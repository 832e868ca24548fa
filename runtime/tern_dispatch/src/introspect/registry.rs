//! Hand-built host type registry.
//!
//! Types are registered up front with their parent, methods, constructors
//! and fields. Handles index straight into `types`; the reserved built-in
//! handles occupy the first slots so member tables can be attached to text,
//! sequences and the other built-in categories too.

use std::sync::Arc;

use tern_value::{EvalError, EvalResult, Symbol, TypeHandle, TypeKind, Value};

use super::{FieldHandle, Introspect, MemberId, MethodHandle};

/// Name given to constructor handles.
const CONSTRUCTOR_NAME: &str = "<init>";

struct TypeDef {
    name: String,
    parent: Option<TypeHandle>,
    methods: Vec<Arc<MethodHandle>>,
    constructors: Vec<Arc<MethodHandle>>,
    fields: Vec<Arc<FieldHandle>>,
}

impl TypeDef {
    fn new(name: &str, parent: Option<TypeHandle>) -> Self {
        TypeDef {
            name: name.to_string(),
            parent,
            methods: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
        }
    }
}

/// Registry of host types and their members.
pub struct HostRegistry {
    types: Vec<TypeDef>,
    next_member: u32,
}

impl HostRegistry {
    /// Create a registry holding only the built-in categories.
    pub fn new() -> Self {
        let types = (0..TypeHandle::BUILTIN_COUNT)
            .map(|raw| {
                let handle = TypeHandle::from_raw(raw);
                let parent = (handle != TypeHandle::OBJECT).then_some(TypeHandle::OBJECT);
                TypeDef::new(handle.builtin_name().unwrap_or("Object"), parent)
            })
            .collect();
        HostRegistry {
            types,
            next_member: 0,
        }
    }

    /// Register a type deriving directly from `Object`.
    pub fn define_type(&mut self, name: &str) -> TypeHandle {
        self.define_subtype(name, TypeHandle::OBJECT)
    }

    /// Register a user-defined class type, deriving from the reserved
    /// instance root so its instances also satisfy `Instance` parameters.
    pub fn define_class(&mut self, name: &str) -> TypeHandle {
        self.define_subtype(name, TypeHandle::INSTANCE)
    }

    /// Register a type with an explicit parent.
    pub fn define_subtype(&mut self, name: &str, parent: TypeHandle) -> TypeHandle {
        let raw = u32::try_from(self.types.len()).unwrap_or(u32::MAX);
        self.types.push(TypeDef::new(name, Some(parent)));
        TypeHandle::from_raw(raw)
    }

    /// Attach members to a registered type.
    pub fn members(&mut self, ty: TypeHandle) -> TypeBuilder<'_> {
        TypeBuilder { registry: self, ty }
    }

    /// Look up a registered type by name, ignoring case.
    pub fn find_type(&self, name: &str) -> Option<TypeHandle> {
        self.types
            .iter()
            .position(|def| def.name.eq_ignore_ascii_case(name))
            .and_then(|index| u32::try_from(index).ok())
            .map(TypeHandle::from_raw)
    }

    /// Number of registered types, built-ins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn def(&self, ty: TypeHandle) -> Option<&TypeDef> {
        self.types.get(ty.raw() as usize)
    }

    fn def_mut(&mut self, ty: TypeHandle) -> Option<&mut TypeDef> {
        self.types.get_mut(ty.raw() as usize)
    }

    fn next_id(&mut self) -> MemberId {
        let id = MemberId::from_raw(self.next_member);
        self.next_member += 1;
        id
    }

    /// The type followed by its ancestors, nearest first.
    fn lineage(&self, ty: TypeHandle) -> impl Iterator<Item = &TypeDef> + '_ {
        let mut next = self.def(ty).map(|_| ty);
        std::iter::from_fn(move || {
            let current = self.def(next?)?;
            next = current.parent;
            Some(current)
        })
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Introspect for HostRegistry {
    fn type_name(&self, ty: TypeHandle) -> String {
        match self.def(ty) {
            Some(def) => def.name.clone(),
            None => ty.to_string(),
        }
    }

    fn is_subtype(&self, sub: TypeHandle, sup: TypeHandle) -> bool {
        if sub == sup || sup == TypeHandle::OBJECT {
            return true;
        }
        let mut current = self.def(sub).and_then(|def| def.parent);
        while let Some(ty) = current {
            if ty == sup {
                return true;
            }
            current = self.def(ty).and_then(|def| def.parent);
        }
        false
    }

    fn methods(&self, ty: TypeHandle) -> Vec<Arc<MethodHandle>> {
        let mut out: Vec<Arc<MethodHandle>> = Vec::new();
        for def in self.lineage(ty) {
            for method in &def.methods {
                if !out.iter().any(|seen| seen.same_signature(method)) {
                    out.push(Arc::clone(method));
                }
            }
        }
        out
    }

    fn constructors(&self, ty: TypeHandle) -> Vec<Arc<MethodHandle>> {
        self.def(ty)
            .map(|def| def.constructors.clone())
            .unwrap_or_default()
    }

    fn fields(&self, ty: TypeHandle) -> Vec<Arc<FieldHandle>> {
        let mut out: Vec<Arc<FieldHandle>> = Vec::new();
        for def in self.lineage(ty) {
            for field in &def.fields {
                if !out.iter().any(|seen| seen.name == field.name) {
                    out.push(Arc::clone(field));
                }
            }
        }
        out
    }
}

/// Builder attaching members to one registered type.
///
/// Members keep the order they are added in; overload resolution picks the
/// first assignable candidate in that order.
pub struct TypeBuilder<'r> {
    registry: &'r mut HostRegistry,
    ty: TypeHandle,
}

impl TypeBuilder<'_> {
    /// Instance method.
    #[must_use]
    pub fn method<F>(self, name: &str, params: &[TypeKind], body: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.add_method(name, params, false, Arc::new(body))
    }

    /// Static method; invoked without a receiver.
    #[must_use]
    pub fn static_method<F>(self, name: &str, params: &[TypeKind], body: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        self.add_method(
            name,
            params,
            true,
            Arc::new(move |_: Option<&Value>, args: &[Value]| body(args)),
        )
    }

    /// Constructor producing a new instance.
    #[must_use]
    pub fn constructor<F>(self, params: &[TypeKind], body: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    {
        let id = self.registry.next_id();
        let handle = Arc::new(MethodHandle {
            id,
            name: Symbol::new(CONSTRUCTOR_NAME),
            declaring_type: self.ty,
            params: params.to_vec(),
            is_static: true,
            body: Arc::new(move |_: Option<&Value>, args: &[Value]| body(args)),
        });
        if let Some(def) = self.registry.def_mut(self.ty) {
            def.constructors.push(handle);
        }
        self
    }

    /// Read-only instance field.
    #[must_use]
    pub fn field<G>(self, name: &str, kind: TypeKind, getter: G) -> Self
    where
        G: Fn(Option<&Value>) -> EvalResult + Send + Sync + 'static,
    {
        self.add_field(name, kind, false, Arc::new(getter), None)
    }

    /// Writable instance field.
    #[must_use]
    pub fn field_rw<G, S>(self, name: &str, kind: TypeKind, getter: G, setter: S) -> Self
    where
        G: Fn(Option<&Value>) -> EvalResult + Send + Sync + 'static,
        S: Fn(Option<&Value>, Value) -> Result<(), EvalError> + Send + Sync + 'static,
    {
        self.add_field(name, kind, false, Arc::new(getter), Some(Arc::new(setter)))
    }

    /// Read-only static field.
    #[must_use]
    pub fn static_field<G>(self, name: &str, kind: TypeKind, getter: G) -> Self
    where
        G: Fn() -> EvalResult + Send + Sync + 'static,
    {
        self.add_field(name, kind, true, Arc::new(move |_: Option<&Value>| getter()), None)
    }

    fn add_method(
        self,
        name: &str,
        params: &[TypeKind],
        is_static: bool,
        body: Arc<super::HostMethodFn>,
    ) -> Self {
        let id = self.registry.next_id();
        let handle = Arc::new(MethodHandle {
            id,
            name: Symbol::new(name),
            declaring_type: self.ty,
            params: params.to_vec(),
            is_static,
            body,
        });
        if let Some(def) = self.registry.def_mut(self.ty) {
            def.methods.push(handle);
        }
        self
    }

    fn add_field(
        self,
        name: &str,
        kind: TypeKind,
        is_static: bool,
        getter: Arc<super::HostGetterFn>,
        setter: Option<Arc<super::HostSetterFn>>,
    ) -> Self {
        let id = self.registry.next_id();
        let handle = Arc::new(FieldHandle {
            id,
            name: Symbol::new(name),
            declaring_type: self.ty,
            kind,
            is_static,
            getter,
            setter,
        });
        if let Some(def) = self.registry.def_mut(self.ty) {
            def.fields.push(handle);
        }
        self
    }
}
