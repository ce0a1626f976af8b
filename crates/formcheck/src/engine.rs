//! The [`Validation`] façade and its [`EngineConfig`].

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::definition::PredicateRegistry;
use crate::error::{ConfigError, EngineError};
use crate::evaluate::Evaluator;
use crate::report::{FieldResults, ValidationReport, ValidationTarget};
use crate::rule::FieldRule;
use crate::tree::RuleTree;

/// Message written to an empty mandatory field when neither the rule nor the
/// engine configuration provides one.
pub const EMPTY_MANDATORY_FIELD_ERROR: &str = "empty_mandatory_field";

// ============================================================================
// CONFIG
// ============================================================================

/// Engine-wide settings.
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// use formcheck::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config.mandatory_field_error, "empty_mandatory_field");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default message for empty mandatory fields.
    pub mandatory_field_error: Cow<'static, str>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mandatory_field_error: Cow::Borrowed(EMPTY_MANDATORY_FIELD_ERROR),
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// A checked rule tree, ready to evaluate input data.
///
/// Stateless between calls: every `validate` builds a fresh
/// [`ValidationReport`], so one `Validation` can serve concurrent calls.
///
/// # Examples
///
/// ```
/// use formcheck::prelude::*;
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let validation = Validation::new(vec![
///     FieldRule::new("name"),
///     FieldRule::new("age").test(Test::new(|v, _| v.is_number(), "Age must be a number")),
/// ])?
/// .with_mandatory_field_error("This field is required");
///
/// let mut model = Model::new();
/// let valid = validation
///     .validate_into(&mut model, &json!({"name": "", "age": 25}), &Default::default())
///     .await?;
///
/// assert!(!valid);
/// assert_eq!(model.field("name"), Some(&FieldResult::invalid("This field is required")));
/// assert_eq!(model.field("age"), Some(&FieldResult::Valid));
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Validation {
    rules: RuleTree,
    config: EngineConfig,
}

impl Validation {
    /// Checks `rules` and builds an engine with the default configuration.
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, ConfigError> {
        Self::with_config(rules, EngineConfig::default())
    }

    /// Checks `rules` and builds an engine with `config`.
    pub fn with_config(rules: Vec<FieldRule>, config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rules: RuleTree::new(rules)?,
            config,
        })
    }

    /// Parses a JSON rule definition, resolving predicate names in `registry`.
    pub fn from_json(definition: &str, registry: &PredicateRegistry) -> Result<Self, ConfigError> {
        Self::new(registry.parse(definition)?)
    }

    /// Overrides the default message for empty mandatory fields.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_mandatory_field_error(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.config.mandatory_field_error = message.into();
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The checked rule tree.
    #[must_use]
    pub fn rules(&self) -> &RuleTree {
        &self.rules
    }

    /// Evaluates `data` with no extra context.
    pub async fn validate(&self, data: &Value) -> Result<ValidationReport, EngineError> {
        self.validate_with_context(data, &Map::new()).await
    }

    /// Evaluates `data`, handing `context` to every predicate.
    ///
    /// Predicates run one at a time in declaration order. The first predicate
    /// error aborts the call.
    #[instrument(skip_all, fields(rules = self.rules.len()))]
    pub async fn validate_with_context(
        &self,
        data: &Value,
        context: &Map<String, Value>,
    ) -> Result<ValidationReport, EngineError> {
        let evaluator = Evaluator::new(
            &self.config.mandatory_field_error,
            Arc::new(data.clone()),
            Arc::new(context.clone()),
        );
        let mut fields = FieldResults::new();
        let is_valid = evaluator.run(&self.rules, &mut fields).await?;

        debug!(is_valid, recorded = fields.len(), "validation finished");
        Ok(ValidationReport::new(fields, is_valid))
    }

    /// Evaluates `data` and merges the results into `target`.
    ///
    /// Paths already in the target that this run did not produce are kept.
    /// The target's validity flag is set to the overall result, which is also
    /// returned. On error the target is left untouched.
    pub async fn validate_into<T>(
        &self,
        target: &mut T,
        data: &Value,
        context: &Map<String, Value>,
    ) -> Result<bool, EngineError>
    where
        T: ValidationTarget + ?Sized,
    {
        let report = self.validate_with_context(data, context).await?;
        Ok(report.merge_into(target))
    }
}
