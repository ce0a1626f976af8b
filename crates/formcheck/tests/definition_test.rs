//! Loading rule trees from JSON definitions.

use formcheck::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Map, json};

const ORDER_FORM: &str = r#"[
    { "name": "customer.email",
      "tests": [{ "fn": "not_blank", "message": "Email is required" },
                { "fn": "has_at", "message": "Invalid email" }],
      "stopOnFailure": "tests" },
    { "name": "nickname", "isOptional": true },
    { "name": "gift_note", "skipIf": "not_a_gift" },
    { "name": "subs",
      "emptyFieldMessage": "Order at least one sandwich",
      "fields": [
        { "name": "bread",
          "tests": [{ "fn": "stocked_bread", "message": "Bread not available" }] }
      ] }
]"#;

fn registry() -> PredicateRegistry {
    let mut registry = PredicateRegistry::with_builtins();
    registry
        .register_fn("has_at", |v, _| v.as_str().is_some_and(|s| s.contains('@')))
        .register_fn("not_a_gift", |_, ctx| ctx.get("gift") != Some(&json!(true)))
        .register_async("stocked_bread", |value, _ctx| async move {
            Ok::<_, PredicateError>(matches!(value.as_str(), Some("herbs" | "wholemeal")))
        });
    registry
}

#[tokio::test]
async fn json_definition_evaluates_like_builder_rules() {
    let validation = Validation::from_json(ORDER_FORM, &registry()).unwrap();

    let report = validation
        .validate(&json!({
            "customer": {"email": "   "},
            "subs": [{"bread": "herbs"}, {"bread": "rye"}]
        }))
        .await
        .unwrap();

    assert!(!report.is_valid());
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "fields": {
                "customer.email": "Email is required",
                "subs": true,
                "subs.0.bread": true,
                "subs.1.bread": "Bread not available"
            },
            "isValid": false
        })
    );
}

#[tokio::test]
async fn json_definition_uses_context_and_messages() {
    let validation = Validation::from_json(ORDER_FORM, &registry()).unwrap();
    let mut context = Map::new();
    context.insert("gift".into(), json!(true));

    let report = validation
        .validate_with_context(&json!({"customer": {"email": "kari@example.no"}}), &context)
        .await
        .unwrap();

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(
        errors,
        vec![
            ("gift_note", "empty_mandatory_field"),
            ("subs", "Order at least one sandwich"),
        ]
    );
}

#[test]
fn unknown_predicate_is_a_config_error() {
    let err = Validation::from_json(ORDER_FORM, &PredicateRegistry::with_builtins()).unwrap_err();

    assert!(matches!(
        err,
        ConfigError::UnknownPredicate { ref field, ref name }
            if field == "customer.email" && name == "has_at"
    ));
}

#[test]
fn legacy_boolean_stop_is_rejected() {
    let err = Validation::from_json(
        r#"[{"name": "age", "stopOnFailure": true}]"#,
        &PredicateRegistry::new(),
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid stop option 'true' on field 'age': expected \"tests\" or \"fields\""
    );
}

#[test]
fn missing_name_is_reported_with_location() {
    let err = Validation::from_json(
        r#"[{"name": "subs", "fields": [{"isOptional": true}]}]"#,
        &PredicateRegistry::new(),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::MissingName { ref path } if path == "subs.fields[0]"));
}

#[test]
fn malformed_document_is_a_parse_error() {
    let err = Validation::from_json(r#"{"name": "age"}"#, &PredicateRegistry::new()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = Validation::from_json(
        r#"[{"name": "age", "tests": [{"fn": "is_number"}]}]"#,
        &PredicateRegistry::with_builtins(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
