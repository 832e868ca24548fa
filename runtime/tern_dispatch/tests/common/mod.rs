//! Fixtures shared by the integration tests.

#![allow(dead_code, reason = "not every test binary uses every fixture")]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tern_dispatch::HostRegistry;
use tern_value::{
    no_such_method, BringUp, ClassInstance, Engine, EvalError, EvalResult, EvalScope, HostObject,
    PrimitiveKind, Referenceable, ScriptStruct, Symbol, TypeHandle, TypeKind, Value,
};

pub const INT: TypeKind = TypeKind::Primitive(PrimitiveKind::Int);

/// Payload of `Greeter` host objects.
pub struct GreeterData {
    pub name: String,
}

/// A `Session` class instance. Its `init` hands back a fresh session marked
/// as the replacement, so callers can tell the two apart.
pub struct Session {
    ty: TypeHandle,
    state: ScriptStruct,
    claimed: AtomicBool,
    pub init_calls: Arc<AtomicUsize>,
}

impl Session {
    pub fn new(ty: TypeHandle, init_calls: Arc<AtomicUsize>) -> Self {
        Session {
            ty,
            state: ScriptStruct::new(),
            claimed: AtomicBool::new(false),
            init_calls,
        }
    }
}

impl Referenceable for Session {
    fn dereference(&self, engine: &dyn Engine, symbol: &Symbol, safe: bool) -> EvalResult {
        self.state.dereference(engine, symbol, safe)
    }

    fn assign(&self, engine: &dyn Engine, symbol: &Symbol, value: Value) -> EvalResult {
        self.state.assign(engine, symbol, value)
    }

    fn dereference_and_invoke(
        &self,
        _engine: &dyn Engine,
        symbol: &Symbol,
        args: &[Value],
        safe: bool,
    ) -> EvalResult {
        if symbol.is("init") {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            let replacement = Session::new(self.ty, Arc::clone(&self.init_calls));
            replacement.state.insert("origin", Value::text("init"));
            replacement
                .state
                .insert("user", args.first().cloned().unwrap_or(Value::Null));
            return Ok(Value::instance(replacement));
        }
        if safe {
            return Ok(Value::Absent);
        }
        let kinds: Vec<_> = args.iter().map(Value::type_kind).collect();
        Err(no_such_method(symbol.as_str(), "Session", &kinds))
    }
}

impl ClassInstance for Session {
    fn class_name(&self) -> &str {
        "Session"
    }

    fn type_handle(&self) -> TypeHandle {
        self.ty
    }

    fn member_names(&self) -> Vec<String> {
        vec!["origin".into(), "user".into()]
    }

    fn bring_up(&self) -> Option<&dyn BringUp> {
        Some(self)
    }
}

impl BringUp for Session {
    fn begin_bring_up(&self) -> bool {
        !self.claimed.swap(true, Ordering::SeqCst)
    }

    fn run_initializers(
        &self,
        _engine: &dyn Engine,
        _scope: &mut EvalScope<'_>,
    ) -> Result<(), EvalError> {
        self.state.insert("origin", Value::text("allocated"));
        Ok(())
    }

    fn declares(&self, symbol: &Symbol) -> bool {
        symbol.is("init")
    }
}

pub struct World {
    pub registry: Arc<HostRegistry>,
    pub greeter: TypeHandle,
    pub calculator: TypeHandle,
    pub session: TypeHandle,
    pub init_calls: Arc<AtomicUsize>,
}

fn name_of(receiver: Option<&Value>) -> String {
    receiver
        .and_then(|value| match value {
            Value::Host(obj) => obj.downcast_ref::<GreeterData>(),
            _ => None,
        })
        .map(|data| data.name.clone())
        .unwrap_or_default()
}

pub fn world() -> World {
    let mut registry = HostRegistry::new();
    let greeter = registry.define_type("Greeter");
    let calculator = registry.define_type("Calculator");
    let session = registry.define_class("Session");
    let init_calls = Arc::new(AtomicUsize::new(0));

    let _ = registry
        .members(greeter)
        .constructor(&[TypeKind::Text], move |args| {
            Ok(Value::Host(HostObject::new(
                greeter,
                GreeterData {
                    name: args[0].to_string(),
                },
            )))
        })
        .method("sayHello", &[TypeKind::Text], |receiver, args| {
            Ok(Value::text(format!("Hello {}, from {}", args[0], name_of(receiver))))
        });

    let _ = registry
        .members(calculator)
        .method("add", &[INT], |_, args| Ok(args[0].clone()))
        .method("add", &[INT, INT], |_, args| {
            let sum = args.iter().filter_map(Value::as_int).sum::<i64>();
            Ok(Value::Int(sum))
        });

    let calls = Arc::clone(&init_calls);
    let _ = registry
        .members(session)
        .constructor(&[TypeKind::Any], move |_| {
            Ok(Value::instance(Session::new(session, Arc::clone(&calls))))
        });

    World {
        registry: Arc::new(registry),
        greeter,
        calculator,
        session,
        init_calls,
    }
}

pub fn greeter(world: &World, name: &str) -> Value {
    Value::Host(HostObject::new(
        world.greeter,
        GreeterData {
            name: name.to_string(),
        },
    ))
}

pub fn calculator(world: &World) -> Value {
    Value::Host(HostObject::new(world.calculator, ()))
}

/// Read a member of a natively referenceable value in safe mode.
pub fn member(value: &Value, engine: &dyn Engine, name: &str) -> Value {
    value
        .as_referenceable()
        .map_or(Value::Absent, |native| {
            native
                .dereference(engine, &Symbol::new(name), true)
                .unwrap_or(Value::Absent)
        })
}
