//! # formcheck
//!
//! Declarative, data-driven field validation for form models.
//!
//! A [`Validation`] holds a tree of [`FieldRule`]s. Evaluating it against a
//! JSON value produces a flat map from dotted path to [`FieldResult`] plus an
//! overall validity flag, which is exactly what a form component needs in its
//! model.
//!
//! ## Quick Start
//!
//! ```
//! use formcheck::prelude::*;
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let validation = Validation::new(vec![
//!     FieldRule::new("email")
//!         .test(Test::new(|v, _| v.as_str().is_some_and(|s| s.contains('@')), "Invalid email")),
//!     FieldRule::new("nickname").optional(),
//!     FieldRule::new("subs").fields(vec![
//!         FieldRule::new("bread").empty_field_message("Pick a bread"),
//!     ]),
//! ])?;
//!
//! let report = validation
//!     .validate(&json!({"email": "kari@example.no", "subs": [{"bread": ""}]}))
//!     .await?;
//!
//! assert!(!report.is_valid());
//! assert_eq!(report.get("email"), Some(&FieldResult::Valid));
//! assert_eq!(report.get("nickname"), None);
//! assert_eq!(report.get("subs.0.bread"), Some(&FieldResult::invalid("Pick a bread")));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```
//!
//! ## Rule Semantics
//!
//! Rules run in declaration order. For each rule the engine reads the value,
//! applies the emptiness test, then `skip_if`. Empty optional fields are left
//! out; empty mandatory fields get their empty-field message. Array values
//! with nested [`fields`](FieldRule::fields) are checked element by element
//! before the field's own tests. [`StopScope`] controls how far a failing or
//! passing test cuts evaluation short.
//!
//! ## Definitions
//!
//! Rules can also be loaded from JSON with named predicates, see
//! [`definition`] and [`Validation::from_json`].

pub mod definition;
pub mod engine;
pub mod error;
mod evaluate;
pub mod path;
pub mod predicate;
pub mod prelude;
pub mod report;
pub mod rule;
pub mod tree;

pub use definition::{PredicateRegistry, RuleDef, TestDef};
pub use engine::{EMPTY_MANDATORY_FIELD_ERROR, EngineConfig, Validation};
pub use error::{BoxError, ConfigError, EngineError, PredicateError};
pub use predicate::{FieldContext, Predicate, PredicateResult, SharedPredicate};
pub use report::{FieldResult, FieldResults, Model, ValidationReport, ValidationTarget};
pub use rule::{FieldRule, StopScope, Test};
pub use tree::RuleTree;
