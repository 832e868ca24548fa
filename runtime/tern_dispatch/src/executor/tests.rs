use super::*;
use crate::test_helpers::{field_of, fixture, widget, Greeter, InitMode, PlainEngine};
use pretty_assertions::assert_eq;
use tern_value::{BringUp, EvalErrorKind};

fn executor(mode: InitMode) -> (Executor, crate::test_helpers::Fixture) {
    let fx = fixture(mode);
    let exec = Executor::new(Resolver::new(fx.registry.clone()));
    (exec, fx)
}

#[test]
fn test_invoke_binds_instance_and_selects_by_arity() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let target = TargetRef::of_value(widget(fx.widget, "w1"));

    assert_eq!(
        exec.invoke(&target, &Symbol::new("describe"), &[]),
        Ok(Value::text("widget w1"))
    );
    assert_eq!(
        exec.invoke(&target, &Symbol::new("Describe"), &[Value::text("big")]),
        Ok(Value::text("big w1"))
    );
}

#[test]
fn test_invoke_static_needs_no_receiver() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let made = exec
        .invoke_static(fx.widget, &Symbol::new("create"), &[Value::Int(7)])
        .unwrap();
    let label = exec
        .get_field(&TargetRef::of_value(made), &Symbol::new("label"))
        .unwrap();
    assert_eq!(label, Value::text("#7"));
}

#[test]
fn test_instance_member_without_receiver_fails() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let err = exec
        .invoke_static(fx.widget, &Symbol::new("describe"), &[])
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingReceiver {
            member: "describe".into(),
            type_name: "Widget".into(),
        }
    );
}

#[test]
fn test_execution_failure_is_wrapped_with_cause() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let target = TargetRef::of_value(widget(fx.widget, "w"));
    let err = exec.invoke(&target, &Symbol::new("explode"), &[]).unwrap_err();

    assert!(matches!(err.kind, EvalErrorKind::InvocationFailure { .. }));
    assert!(!err.is_recoverable_lookup());
    assert_eq!(err.cause().map(|cause| cause.message.as_str()), Some("boom"));
}

#[test]
fn test_lookup_failure_is_not_wrapped() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let target = TargetRef::of_value(widget(fx.widget, "w"));
    let err = exec
        .invoke(&target, &Symbol::new("describe"), &[Value::Int(1), Value::Int(2)])
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NoMethod { arity: 2, .. }));
}

#[test]
fn test_dynamic_arguments_are_unwrapped() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let target = TargetRef::of_value(widget(fx.widget, "w"));
    let wrapped = Value::dynamic(TargetRef::of_value(Value::text("tiny")));

    assert_eq!(
        exec.invoke(&target, &Symbol::new("describe"), &[wrapped]),
        Ok(Value::text("tiny w"))
    );
}

#[test]
fn test_fields_read_write_and_read_only() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let target = TargetRef::of_value(widget(fx.widget, "before"));

    assert_eq!(
        exec.set_field(&target, &Symbol::new("LABEL"), Value::text("after")),
        Ok(Value::text("after"))
    );
    assert_eq!(
        exec.get_field(&target, &Symbol::new("label")),
        Ok(Value::text("after"))
    );

    let err = exec
        .set_field(&target, &Symbol::new("kind"), Value::text("x"))
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotAssignable {
            type_name: "Widget.kind".into(),
        }
    );

    assert_eq!(
        exec.get_static_field(fx.widget, &Symbol::new("version")),
        Ok(Value::Int(3))
    );
}

#[test]
fn test_constructor_without_bring_up() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let made = exec
        .invoke_constructor(&PlainEngine, fx.widget, &[Value::text("new")], &EvalScope::new())
        .unwrap();
    assert_eq!(made.type_handle(), fx.widget);
}

#[test]
fn test_constructor_failure_wraps_cause() {
    let (exec, fx) = executor(InitMode::Undeclared);
    let err = exec
        .invoke_constructor(&PlainEngine, fx.widget, &[Value::Int(1)], &EvalScope::new())
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ConstructionFailure {
            type_name: "Widget".into(),
        }
    );
    assert!(matches!(
        err.cause().map(|cause| &cause.kind),
        Some(EvalErrorKind::NoMethod { .. })
    ));
}

#[test]
fn test_bring_up_runs_initializers_in_child_scope() {
    let (exec, fx) = executor(InitMode::ReturnsNull);
    let mut scope = EvalScope::new();
    scope.bind("defaultGreeting", Value::text("hi"));

    let made = exec
        .invoke_constructor(&PlainEngine, fx.greeter, &[Value::Int(5)], &scope)
        .unwrap();

    assert_eq!(field_of(&made, "greeting"), Some(Value::text("hi")));
    assert_eq!(field_of(&made, "scopeDepth"), Some(Value::Int(2)));
    assert_eq!(
        field_of(&made, "initArgs"),
        Some(Value::sequence(vec![Value::Int(5)]))
    );
    assert_eq!(field_of(&made, "initCalls"), Some(Value::Int(1)));
    // initializer bindings stay in the child scope
    assert!(scope.lookup(&Symbol::new("this")).is_none());
}

#[test]
fn test_init_result_replaces_instance() {
    let (exec, fx) = executor(InitMode::Replaces);
    let made = exec
        .invoke_constructor(&PlainEngine, fx.greeter, &[], &EvalScope::new())
        .unwrap();
    assert_eq!(field_of(&made, "replacement"), Some(Value::Bool(true)));
    assert_eq!(field_of(&made, "greeting"), None);
}

#[test]
fn test_init_failure_becomes_construction_failure() {
    let (exec, fx) = executor(InitMode::Fails);
    let err = exec
        .invoke_constructor(&PlainEngine, fx.greeter, &[], &EvalScope::new())
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ConstructionFailure { .. }));
    assert_eq!(err.root_cause().message, "init exploded");
}

#[test]
fn test_bring_up_is_claimed_once() {
    let fx = fixture(InitMode::ReturnsNull);
    let greeter = Greeter::new(fx.greeter, InitMode::ReturnsNull);
    assert!(greeter.begin_bring_up());
    assert!(!greeter.begin_bring_up());
    assert_eq!(greeter.field("greeting"), None);
}
