//! Property-based tests for formcheck.

use formcheck::prelude::*;
use formcheck::EMPTY_MANDATORY_FIELD_ERROR;
use formcheck::predicate::is_empty_value;
use futures::executor::block_on;
use proptest::prelude::*;
use serde_json::{Value, json};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// ============================================================================
// EMPTINESS
// ============================================================================

proptest! {
    #[test]
    fn numbers_are_never_empty(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
        prop_assert!(!is_empty_value(&json!(n)));
    }

    #[test]
    fn strings_are_empty_iff_zero_length(s in ".{0,12}") {
        prop_assert_eq!(is_empty_value(&Value::String(s.clone())), s.is_empty());
    }

    #[test]
    fn mandatory_empty_field_gets_mandatory_message(value in arb_value()) {
        let validation = Validation::new(vec![FieldRule::new("field")]).unwrap();
        let report = block_on(validation.validate(&json!({"field": value.clone()}))).unwrap();

        let expected = if is_empty_value(&value) {
            FieldResult::invalid(EMPTY_MANDATORY_FIELD_ERROR)
        } else {
            FieldResult::Valid
        };
        prop_assert_eq!(report.is_valid(), expected.is_valid());
        prop_assert_eq!(report.get("field"), Some(&expected));
    }

    #[test]
    fn optional_field_without_tests_never_invalidates(value in arb_value()) {
        let validation = Validation::new(vec![FieldRule::new("field").optional()]).unwrap();
        let report = block_on(validation.validate(&json!({"field": value.clone()}))).unwrap();

        prop_assert!(report.is_valid());
        prop_assert_eq!(report.get("field").is_some(), !is_empty_value(&value));
    }
}

// ============================================================================
// IDEMPOTENCY: validate(x) == validate(x)
// ============================================================================

proptest! {
    #[test]
    fn validate_is_idempotent(breads in prop::collection::vec("[a-z]{0,10}", 0..6)) {
        let validation = Validation::new(vec![
            FieldRule::new("subs").fields(vec![
                FieldRule::new("bread").test(Test::new(|v, _| v.as_str() == Some("herbs"), "nope")),
            ]),
        ])
        .unwrap();
        let subs: Vec<Value> = breads.iter().map(|b| json!({"bread": b})).collect();
        let data = json!({"subs": subs});

        let first = block_on(validation.validate(&data)).unwrap();
        let second = block_on(validation.validate(&data)).unwrap();

        prop_assert_eq!(first, second);
    }
}
