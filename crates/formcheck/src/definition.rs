//! Declarative rule definitions.
//!
//! Rule trees can be written as JSON, using the same field names as form
//! authors already know. Predicates are referenced by name and resolved through
//! a [`PredicateRegistry`]:
//!
//! ```json
//! [
//!   { "name": "age", "tests": [{ "fn": "is_number", "message": "Age must be a number" }] },
//!   { "name": "nickname", "isOptional": true },
//!   { "name": "subs", "stopOnFailure": "fields",
//!     "fields": [{ "name": "bread", "emptyFieldMessage": "Pick a bread" }] }
//! ]
//! ```
//!
//! All checks happen while building: unknown keys, unknown predicate names
//! and stop options other than `"tests"` / `"fields"` are [`ConfigError`]s.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::predicate::{
    FieldContext, Predicate, PredicateResult, SharedPredicate, from_async, from_fn,
};
use crate::rule::{FieldRule, StopScope, Test};

// ============================================================================
// DEFINITIONS
// ============================================================================

/// One rule as written in a definition document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleDef {
    /// Dotted path of the field. Required; checked when the engine is built.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether an empty value is accepted.
    #[serde(default)]
    pub is_optional: bool,
    /// Message for an empty mandatory field.
    #[serde(default)]
    pub empty_field_message: Option<String>,
    /// Registered predicate replacing the default emptiness test.
    #[serde(default)]
    pub empty_test: Option<String>,
    /// Registered predicate that skips the field when it passes.
    #[serde(default)]
    pub skip_if: Option<String>,
    /// Tests in order.
    #[serde(default)]
    pub tests: Option<Vec<TestDef>>,
    /// Rules for array elements.
    #[serde(default)]
    pub fields: Option<Vec<RuleDef>>,
    /// `"tests"`, `"fields"` or absent.
    #[serde(default)]
    pub stop_on_failure: Option<Value>,
    /// `"tests"`, `"fields"` or absent.
    #[serde(default)]
    pub stop_on_success: Option<Value>,
}

/// One test as written in a definition document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestDef {
    /// Name of a registered predicate.
    #[serde(rename = "fn")]
    pub predicate: String,
    /// Message written on failure.
    pub message: String,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Named predicates available to definitions.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, SharedPredicate>,
}

impl PredicateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the type and presence checks:
    ///
    /// | name         | passes when                               |
    /// |--------------|-------------------------------------------|
    /// | `is_number`  | the value is any JSON number              |
    /// | `is_integer` | the value is an integral JSON number      |
    /// | `is_string`  | the value is a string                     |
    /// | `is_bool`    | the value is `true` or `false`            |
    /// | `is_array`   | the value is an array                     |
    /// | `is_object`  | the value is an object                    |
    /// | `is_true`    | the value is exactly `true`               |
    /// | `not_blank`  | the value is a string with non-whitespace |
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register_fn("is_number", |v, _| v.is_number())
            .register_fn("is_integer", |v, _| v.is_i64() || v.is_u64())
            .register_fn("is_string", |v, _| v.is_string())
            .register_fn("is_bool", |v, _| v.is_boolean())
            .register_fn("is_array", |v, _| v.is_array())
            .register_fn("is_object", |v, _| v.is_object())
            .register_fn("is_true", |v, _| v.as_bool() == Some(true))
            .register_fn("not_blank", |v, _| {
                v.as_str().is_some_and(|s| !s.trim().is_empty())
            });
        registry
    }

    /// Registers `predicate` under `name`, replacing any previous entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        predicate: impl Predicate + 'static,
    ) -> &mut Self {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Registers a synchronous closure.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value, &FieldContext) -> bool + Send + Sync + 'static,
    {
        self.register(name, from_fn(f))
    }

    /// Registers an async closure.
    pub fn register_async<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Value, FieldContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PredicateResult> + Send + 'static,
    {
        self.register(name, from_async(f))
    }

    /// The predicate registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SharedPredicate> {
        self.predicates.get(name)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Parses a JSON array of rule definitions and builds the rules.
    pub fn parse(&self, definition: &str) -> Result<Vec<FieldRule>, ConfigError> {
        let defs: Vec<RuleDef> = serde_json::from_str(definition)?;
        self.build(&defs)
    }

    /// Builds rules from parsed definitions.
    ///
    /// Names are not checked here; [`Validation`](crate::Validation) does that
    /// for every tree, whatever its origin.
    pub fn build(&self, defs: &[RuleDef]) -> Result<Vec<FieldRule>, ConfigError> {
        defs.iter().map(|def| self.build_rule(def)).collect()
    }

    fn build_rule(&self, def: &RuleDef) -> Result<FieldRule, ConfigError> {
        let name = def.name.clone().unwrap_or_default();

        let mut rule = FieldRule::new(name.as_str())
            .with_optional(def.is_optional)
            .stop_on_failure(stop_scope(&name, def.stop_on_failure.as_ref())?)
            .stop_on_success(stop_scope(&name, def.stop_on_success.as_ref())?);

        if let Some(message) = &def.empty_field_message {
            rule = rule.empty_field_message(message.clone());
        }
        if let Some(empty_test) = &def.empty_test {
            rule = rule.empty_test_with(self.resolve(&name, empty_test)?);
        }
        if let Some(skip_if) = &def.skip_if {
            rule = rule.skip_if_with(self.resolve(&name, skip_if)?);
        }
        for test in def.tests.iter().flatten() {
            let predicate = self.resolve(&name, &test.predicate)?;
            rule = rule.test(Test::shared(predicate, test.message.clone()));
        }
        if let Some(fields) = &def.fields {
            rule = rule.fields(self.build(fields)?);
        }

        Ok(rule)
    }

    fn resolve(&self, field: &str, name: &str) -> Result<SharedPredicate, ConfigError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownPredicate {
                field: field.to_owned(),
                name: name.to_owned(),
            })
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.predicates.keys().collect();
        names.sort();
        f.debug_struct("PredicateRegistry")
            .field("predicates", &names)
            .finish()
    }
}

fn stop_scope(field: &str, raw: Option<&Value>) -> Result<StopScope, ConfigError> {
    let invalid = |value: String| ConfigError::InvalidStopScope {
        field: field.to_owned(),
        value,
    };

    match raw {
        None | Some(Value::Null) => Ok(StopScope::Never),
        Some(Value::String(s)) => s.parse().map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn definition_uses_authoring_names() {
        let defs: Vec<RuleDef> = serde_json::from_value(json!([{
            "name": "subs",
            "isOptional": true,
            "emptyFieldMessage": "pick one",
            "emptyTest": "is_array",
            "skipIf": "is_true",
            "tests": [{"fn": "is_array", "message": "not a list"}],
            "fields": [{"name": "bread"}],
            "stopOnFailure": "fields",
            "stopOnSuccess": "tests"
        }]))
        .unwrap();

        assert_eq!(defs[0].name.as_deref(), Some("subs"));
        assert!(defs[0].is_optional);
        assert_eq!(defs[0].tests.as_ref().unwrap()[0].predicate, "is_array");
        assert_eq!(defs[0].stop_on_failure, Some(json!("fields")));

        let rules = PredicateRegistry::with_builtins().build(&defs).unwrap();
        let rule = &rules[0];
        assert!(rule.is_optional());
        assert_eq!(rule.get_fields()[0].name(), "bread");
        assert_eq!(rule.get_tests()[0].message(), "not a list");
        assert_eq!(rule.get_stop_on_failure(), StopScope::Fields);
        assert_eq!(rule.get_stop_on_success(), StopScope::Tests);
    }

    #[test]
    fn null_tests_are_allowed() {
        let rules = PredicateRegistry::new()
            .parse(r#"[{"name": "name", "tests": null}]"#)
            .unwrap();
        assert!(rules[0].get_tests().is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PredicateRegistry::new()
            .parse(r#"[{"name": "age", "stopOnFailer": "tests"}]"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn stop_literals_are_checked() {
        let registry = PredicateRegistry::new();

        let err = registry
            .parse(r#"[{"name": "age", "stopOnFailure": "always"}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidStopScope { ref field, ref value } if field == "age" && value == "always"
        ));

        let err = registry
            .parse(r#"[{"name": "age", "stopOnSuccess": true}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidStopScope { ref value, .. } if value == "true"
        ));

        let err = registry
            .parse(r#"[{"name": "subs", "fields": [{"name": "bread", "stopOnFailure": "field"}]}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidStopScope { ref field, .. } if field == "bread"
        ));
    }

    #[test]
    fn unknown_predicates_are_reported() {
        let err = PredicateRegistry::with_builtins()
            .parse(r#"[{"name": "email", "tests": [{"fn": "is_email", "message": "bad"}]}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownPredicate { ref field, ref name } if field == "email" && name == "is_email"
        ));
    }

    #[test]
    fn registry_lists_builtins() {
        let registry = PredicateRegistry::with_builtins();
        for name in [
            "is_number",
            "is_integer",
            "is_string",
            "is_bool",
            "is_array",
            "is_object",
            "is_true",
            "not_blank",
        ] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
        assert!(!registry.contains("is_email"));
        assert!(format!("{registry:?}").contains("is_integer"));
    }

    #[tokio::test]
    async fn builtins_answer_as_documented() {
        let registry = PredicateRegistry::with_builtins();
        let ctx = FieldContext::new("f", Arc::new(Value::Null), Arc::default());

        let cases = [
            ("is_number", json!(4890), true),
            ("is_number", json!("4890"), false),
            ("is_integer", json!(3), true),
            ("is_integer", json!(3.5), false),
            ("is_string", json!(""), true),
            ("is_bool", json!(false), true),
            ("is_array", json!({}), false),
            ("is_object", json!({}), true),
            ("is_true", json!(true), true),
            ("is_true", json!("true"), false),
            ("not_blank", json!("  "), false),
            ("not_blank", json!(" x "), true),
        ];

        for (name, value, expected) in cases {
            let predicate = registry.get(name).unwrap();
            assert_eq!(
                predicate.check(&value, &ctx).await.unwrap(),
                expected,
                "{name}({value})"
            );
        }
    }
}
