//! Property-based tests for symbols, containers and the call cache.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

mod common;

use std::sync::Arc;

use common::{world, INT};
use proptest::prelude::*;
use tern_dispatch::{Dispatcher, Resolver};
use tern_value::{Symbol, TargetRef, TypeKind, Value};

// -- Strategies --

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,15}").expect("valid regex")
}

/// Case-scrambled copy of `text`.
fn scramble(text: &str, mask: u64) -> String {
    text.chars()
        .enumerate()
        .map(|(i, ch)| {
            if (mask >> (i % 64)) & 1 == 1 {
                ch.to_ascii_uppercase()
            } else {
                ch.to_ascii_lowercase()
            }
        })
        .collect()
}

fn kinds_strategy() -> impl Strategy<Value = Vec<TypeKind>> {
    prop::collection::vec(
        prop_oneof![
            Just(INT),
            Just(TypeKind::Text),
            Just(TypeKind::Null),
            Just(TypeKind::Map),
        ],
        0..4,
    )
}

proptest! {
    #[test]
    fn symbols_ignore_case(name in identifier_strategy(), mask in any::<u64>()) {
        let original = Symbol::new(&name);
        let scrambled = Symbol::new(scramble(&name, mask));
        prop_assert_eq!(&original, &scrambled);
        prop_assert_eq!(original.canonical(), scrambled.canonical());
        prop_assert_eq!(original.as_str(), name.as_str());
    }

    #[test]
    fn cached_and_uncached_resolution_agree(kinds in kinds_strategy()) {
        let w = world();
        let cached = Resolver::new(w.registry.clone());
        let uncached = Resolver::with_cache(w.registry.clone(), false);
        let target = TargetRef::of_type(w.calculator);
        let add = Symbol::new("add");

        let a = cached.resolve(&target, &add, &kinds).map(|call| call.member_id());
        let b = uncached.resolve(&target, &add, &kinds).map(|call| call.member_id());
        prop_assert_eq!(a.is_ok(), b.is_ok());
        prop_assert_eq!(a.ok(), b.ok());

        if let (Ok(first), Ok(second)) = (
            cached.resolve(&target, &add, &kinds),
            cached.resolve(&target, &add, &kinds),
        ) {
            prop_assert!(Arc::ptr_eq(&first, &second));
        }
    }

    #[test]
    fn sequence_assign_grows_to_index(initial in 0usize..8, index in 1i64..32) {
        let w = world();
        let d = Dispatcher::new(w.registry.clone());
        let seq = Value::sequence(vec![Value::Int(0); initial]);

        d.assign(&seq, &Symbol::from_index(index), Value::Int(index)).unwrap();

        let expected_len = initial.max(usize::try_from(index).unwrap());
        let len = d.dereference(&seq, &Symbol::new("length"), false).unwrap();
        prop_assert_eq!(len, Value::Int(i64::try_from(expected_len).unwrap()));
        prop_assert_eq!(
            d.dereference(&seq, &Symbol::from_index(index), false).unwrap(),
            Value::Int(index)
        );
    }

    #[test]
    fn out_of_range_reads_are_absent_in_safe_mode(len in 0usize..8, offset in 1i64..16) {
        let w = world();
        let d = Dispatcher::new(w.registry.clone());
        let arr = Value::array(vec![Value::Null; len]);
        let past_end = i64::try_from(len).unwrap() + offset;

        prop_assert_eq!(
            d.dereference(&arr, &Symbol::from_index(past_end), true).unwrap(),
            Value::Absent
        );
        prop_assert!(d.dereference(&arr, &Symbol::from_index(past_end), false).is_err());
    }
}
