use super::*;

#[test]
fn test_primitive_widening() {
    use PrimitiveKind::{Bool, Char, Float, Int};

    assert!(Int.widens_to(Int));
    assert!(Int.widens_to(Float));
    assert!(Char.widens_to(Int));
    assert!(Char.widens_to(Float));
    assert!(!Float.widens_to(Int));
    assert!(!Int.widens_to(Char));
    assert!(!Bool.widens_to(Int));
    assert!(!Int.widens_to(Bool));
}

#[test]
fn test_unboxed() {
    assert_eq!(
        TypeKind::Boxed(PrimitiveKind::Int).unboxed(),
        TypeKind::Primitive(PrimitiveKind::Int)
    );
    assert_eq!(TypeKind::Text.unboxed(), TypeKind::Text);
}

#[test]
fn test_reference_kinds() {
    assert!(!TypeKind::Primitive(PrimitiveKind::Int).is_reference());
    assert!(TypeKind::Boxed(PrimitiveKind::Int).is_reference());
    assert!(TypeKind::Text.is_reference());
    assert!(TypeKind::Any.is_reference());
}

#[test]
fn test_handle_round_trip_for_reference_kinds() {
    for kind in [
        TypeKind::Text,
        TypeKind::Sequence,
        TypeKind::Array,
        TypeKind::Map,
        TypeKind::Struct,
        TypeKind::Error,
        TypeKind::Function,
        TypeKind::Instance,
        TypeKind::Any,
        TypeKind::Object(TypeHandle::from_raw(40)),
    ] {
        assert_eq!(TypeKind::of_handle(kind.handle()), kind);
    }
}

#[test]
fn test_builtin_names() {
    assert_eq!(TypeHandle::TEXT.builtin_name(), Some("Text"));
    assert_eq!(TypeHandle::INSTANCE.builtin_name(), Some("Instance"));
    assert!(TypeHandle::INSTANCE.is_builtin());
    assert!(!TypeHandle::from_raw(TypeHandle::BUILTIN_COUNT).is_builtin());
    assert_eq!(TypeHandle::from_raw(99).builtin_name(), None);
    assert_eq!(TypeHandle::from_raw(99).to_string(), "type#99");
}

#[test]
fn test_kind_display() {
    assert_eq!(TypeKind::Primitive(PrimitiveKind::Int).to_string(), "int");
    assert_eq!(TypeKind::Boxed(PrimitiveKind::Float).to_string(), "float?");
    assert_eq!(TypeKind::Text.to_string(), "Text");
    assert_eq!(TypeKind::Null.to_string(), "null");
    assert_eq!(TypeKind::Any.to_string(), "any");
}
