//! Validates a sign-up form, first from builder rules, then from a JSON
//! definition.
//!
//! ```text
//! RUST_LOG=formcheck=debug cargo run -p formcheck --example signup_form
//! ```

use std::time::Duration;

use formcheck::prelude::*;
use serde_json::{Map, json};
use tracing_subscriber::EnvFilter;

const SANDWICH_ORDER: &str = r#"[
    { "name": "subs", "emptyFieldMessage": "Order at least one sandwich",
      "fields": [
        { "name": "bread", "tests": [{ "fn": "stocked", "message": "Bread not available" }] },
        { "name": "extras", "isOptional": true, "tests": [{ "fn": "is_array", "message": "Extras must be a list" }] }
      ] }
]"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let signup = Validation::new(vec![
        FieldRule::new("username")
            .test(Test::new(
                |v, _| v.as_str().is_some_and(|s| s.len() >= 3),
                "At least 3 characters",
            ))
            .test(Test::with_predicate(
                from_async(|value, _ctx| async move {
                    // stand-in for a lookup against the accounts service
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, PredicateError>(value.as_str() != Some("admin"))
                }),
                "Username is taken",
            ))
            .stop_on_failure(StopScope::Tests),
        FieldRule::new("email").test(Test::new(
            |v, _| v.as_str().is_some_and(|s| s.contains('@')),
            "Invalid email",
        )),
        FieldRule::new("company").skip_if(|_, ctx| ctx.get("account") != Some(&json!("business"))),
        FieldRule::new("address.post_code").test(Test::new(
            |v, _| v.is_u64(),
            "Post code must be a number",
        )),
        FieldRule::new("newsletter").optional(),
    ])?
    .with_mandatory_field_error("This field is required");

    let mut context = Map::new();
    context.insert("account".into(), json!("personal"));

    let mut model = Model::new();
    let valid = signup
        .validate_into(
            &mut model,
            &json!({
                "username": "admin",
                "email": "kari.example.no",
                "address": {"post_code": 4890}
            }),
            &context,
        )
        .await?;

    println!("sign-up valid: {valid}");
    println!("{}", serde_json::to_string_pretty(&model)?);

    let mut registry = PredicateRegistry::with_builtins();
    registry.register_fn("stocked", |v, _| {
        matches!(v.as_str(), Some("herbs" | "wholemeal"))
    });
    let order = Validation::from_json(SANDWICH_ORDER, &registry)?;

    let report = order
        .validate(&json!({"subs": [{"bread": "herbs"}, {"bread": "rye", "extras": "cheese"}]}))
        .await?;

    println!("order valid: {}", report.is_valid());
    for (path, message) in report.errors() {
        println!("  {path}: {message}");
    }
    println!("{}", serde_json::to_string_pretty(&report.to_tree())?);

    Ok(())
}
