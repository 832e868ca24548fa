//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tern_value::{
    no_such_method, BringUp, ClassInstance, Engine, EvalError, EvalResult, EvalScope,
    HostObject, PrimitiveKind, Referenceable, ScriptStruct, Symbol, TypeHandle, TypeKind, Value,
};

use crate::introspect::HostRegistry;

pub const INT: TypeKind = TypeKind::Primitive(PrimitiveKind::Int);

/// Engine that only calls functions.
pub struct PlainEngine;

impl Engine for PlainEngine {
    fn call(&self, callee: &Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Function(func) => func.call(args),
            other => Err(EvalError::new(format!("{} is not callable", other.type_name()))),
        }
    }

    fn call_member_function(&self, _: &Value, _: &Symbol, _: &[Value]) -> Option<EvalResult> {
        None
    }
}

/// Host payload behind `Widget` values.
pub struct WidgetData {
    pub label: RwLock<String>,
}

pub fn widget(ty: TypeHandle, label: &str) -> Value {
    Value::Host(HostObject::new(
        ty,
        WidgetData {
            label: RwLock::new(label.to_string()),
        },
    ))
}

fn label_of(receiver: Option<&Value>) -> Result<String, EvalError> {
    match receiver {
        Some(Value::Host(obj)) => obj
            .downcast_ref::<WidgetData>()
            .map(|data| data.label.read().clone())
            .ok_or_else(|| EvalError::new("not a widget")),
        _ => Err(EvalError::new("not a widget")),
    }
}

/// What `init` does when a `Greeter` is brought up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InitMode {
    /// The class declares no `init`.
    Undeclared,
    /// `init` records its arguments and returns null.
    ReturnsNull,
    /// `init` returns a different `Greeter`.
    Replaces,
    /// `init` fails.
    Fails,
}

/// User-defined class instance with a bring-up.
pub struct Greeter {
    ty: TypeHandle,
    fields: ScriptStruct,
    mode: InitMode,
    claimed: AtomicBool,
}

impl Greeter {
    pub fn new(ty: TypeHandle, mode: InitMode) -> Self {
        Greeter {
            ty,
            fields: ScriptStruct::new(),
            mode,
            claimed: AtomicBool::new(false),
        }
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(&Symbol::new(name))
    }
}

/// Read a field of a natively referenceable value, `None` when absent.
pub fn field_of(value: &Value, name: &str) -> Option<Value> {
    let native = value.as_referenceable()?;
    match native.dereference(&PlainEngine, &Symbol::new(name), true) {
        Ok(Value::Absent) | Err(_) => None,
        Ok(found) => Some(found),
    }
}

impl Referenceable for Greeter {
    fn dereference(&self, engine: &dyn Engine, symbol: &Symbol, safe: bool) -> EvalResult {
        self.fields.dereference(engine, symbol, safe)
    }

    fn assign(&self, engine: &dyn Engine, symbol: &Symbol, value: Value) -> EvalResult {
        self.fields.assign(engine, symbol, value)
    }

    fn dereference_and_invoke(
        &self,
        _engine: &dyn Engine,
        symbol: &Symbol,
        args: &[Value],
        safe: bool,
    ) -> EvalResult {
        if symbol.is("init") && self.mode != InitMode::Undeclared {
            let calls = self
                .fields
                .get(&Symbol::new("initCalls"))
                .and_then(|calls| calls.as_int())
                .unwrap_or(0);
            self.fields.insert("initCalls", Value::Int(calls + 1));
            self.fields.insert("initArgs", Value::sequence(args.to_vec()));
            return match self.mode {
                InitMode::Replaces => {
                    let other = Greeter::new(self.ty, InitMode::Undeclared);
                    other.fields.insert("replacement", Value::Bool(true));
                    Ok(Value::instance(other))
                }
                InitMode::Fails => Err(EvalError::new("init exploded")),
                _ => Ok(Value::Null),
            };
        }
        if symbol.is("greet") {
            let greeting = self.fields.get(&Symbol::new("greeting")).unwrap_or(Value::Null);
            return Ok(Value::text(format!("{greeting}!")));
        }
        if safe {
            return Ok(Value::Absent);
        }
        let kinds: Vec<_> = args.iter().map(Value::type_kind).collect();
        Err(no_such_method(symbol.as_str(), "Greeter", &kinds))
    }
}

impl ClassInstance for Greeter {
    fn class_name(&self) -> &str {
        "Greeter"
    }

    fn type_handle(&self) -> TypeHandle {
        self.ty
    }

    fn member_names(&self) -> Vec<String> {
        vec!["greeting".into(), "greet".into()]
    }

    fn bring_up(&self) -> Option<&dyn BringUp> {
        Some(self)
    }
}

impl BringUp for Greeter {
    fn begin_bring_up(&self) -> bool {
        !self.claimed.swap(true, Ordering::SeqCst)
    }

    fn run_initializers(
        &self,
        _engine: &dyn Engine,
        scope: &mut EvalScope<'_>,
    ) -> Result<(), EvalError> {
        let greeting = scope
            .lookup(&Symbol::new("defaultGreeting"))
            .cloned()
            .unwrap_or_else(|| Value::text("hello"));
        scope.bind("this", Value::Bool(true));
        self.fields.insert("greeting", greeting);
        self.fields.insert("scopeDepth", Value::Int(i64::try_from(scope.depth()).unwrap_or(0)));
        Ok(())
    }

    fn declares(&self, symbol: &Symbol) -> bool {
        symbol.is("init") && self.mode != InitMode::Undeclared
    }
}

/// Registry with a `Widget` host type and a `Greeter` class type.
pub struct Fixture {
    pub registry: Arc<HostRegistry>,
    pub widget: TypeHandle,
    pub greeter: TypeHandle,
}

pub fn fixture(mode: InitMode) -> Fixture {
    let mut registry = HostRegistry::new();
    let widget_ty = registry.define_type("Widget");
    let greeter_ty = registry.define_class("Greeter");

    let _ = registry
        .members(widget_ty)
        .constructor(&[TypeKind::Text], move |args| {
            Ok(widget(widget_ty, args[0].as_text().unwrap_or_default()))
        })
        .method("describe", &[], |receiver, _| {
            Ok(Value::text(format!("widget {}", label_of(receiver)?)))
        })
        .method("describe", &[TypeKind::Text], |receiver, args| {
            Ok(Value::text(format!("{} {}", args[0], label_of(receiver)?)))
        })
        .method("explode", &[], |_, _| Err(EvalError::new("boom")))
        .static_method("create", &[INT], move |args| {
            Ok(widget(widget_ty, &format!("#{}", args[0])))
        })
        .field_rw(
            "label",
            TypeKind::Text,
            |receiver| Ok(Value::text(label_of(receiver)?)),
            |receiver, value| match receiver {
                Some(Value::Host(obj)) => {
                    if let Some(data) = obj.downcast_ref::<WidgetData>() {
                        *data.label.write() = value.to_string();
                    }
                    Ok(())
                }
                _ => Err(EvalError::new("not a widget")),
            },
        )
        .field("kind", TypeKind::Text, |_| Ok(Value::text("widget")))
        .static_field("VERSION", INT, || Ok(Value::Int(3)));

    let _ = registry
        .members(greeter_ty)
        .constructor(&[], move |_| Ok(Value::instance(Greeter::new(greeter_ty, mode))))
        .constructor(&[TypeKind::Any], move |_| {
            Ok(Value::instance(Greeter::new(greeter_ty, mode)))
        });

    Fixture {
        registry: Arc::new(registry),
        widget: widget_ty,
        greeter: greeter_ty,
    }
}
