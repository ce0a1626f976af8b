//! Rule-tree building blocks: [`FieldRule`], [`Test`] and [`StopScope`].
//!
//! A rule tree is plain data. Nothing here runs on its own; the evaluator walks
//! it. Rules are assembled with builder methods:
//!
//! ```
//! use formcheck::rule::{FieldRule, StopScope, Test};
//!
//! let rules = vec![
//!     FieldRule::new("email")
//!         .test(Test::new(|v, _| v.as_str().is_some_and(|s| s.contains('@')), "Invalid email"))
//!         .stop_on_failure(StopScope::Tests),
//!     FieldRule::new("nickname").optional(),
//!     FieldRule::new("subs").fields(vec![FieldRule::new("bread")]),
//! ];
//! # let _ = rules;
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::predicate::{FieldContext, Predicate, SharedPredicate, from_fn};

// ============================================================================
// STOP SCOPE
// ============================================================================

/// How far a stop option reaches once it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopScope {
    /// Keep going.
    #[default]
    Never,
    /// Stop running this field's remaining tests.
    Tests,
    /// Stop this field's remaining tests and every later sibling field.
    Fields,
}

impl StopScope {
    /// `true` unless this is [`StopScope::Never`].
    #[must_use]
    pub fn is_set(self) -> bool {
        self != Self::Never
    }

    /// The literal used in rule definitions, if any.
    #[must_use]
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Never => None,
            Self::Tests => Some("tests"),
            Self::Fields => Some("fields"),
        }
    }
}

/// Error returned when parsing a stop literal fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected \"tests\" or \"fields\", got '{0}'")]
pub struct ParseStopScopeError(pub String);

impl FromStr for StopScope {
    type Err = ParseStopScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tests" => Ok(Self::Tests),
            "fields" => Ok(Self::Fields),
            other => Err(ParseStopScopeError(other.to_owned())),
        }
    }
}

impl Serialize for StopScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for StopScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(Self::Never),
            Some(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// TEST
// ============================================================================

/// One check run against a field value, with the message written on failure.
#[derive(Clone)]
pub struct Test {
    predicate: SharedPredicate,
    message: Cow<'static, str>,
}

impl Test {
    /// Creates a test from a synchronous closure.
    pub fn new<F>(f: F, message: impl Into<Cow<'static, str>>) -> Self
    where
        F: Fn(&Value, &FieldContext) -> bool + Send + Sync + 'static,
    {
        Self::with_predicate(from_fn(f), message)
    }

    /// Creates a test from any [`Predicate`], including async ones.
    pub fn with_predicate(
        predicate: impl Predicate + 'static,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::shared(Arc::new(predicate), message)
    }

    /// Creates a test from an already shared predicate.
    pub fn shared(predicate: SharedPredicate, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            predicate,
            message: message.into(),
        }
    }

    /// The predicate, `fn` in rule definitions.
    #[must_use]
    pub fn predicate(&self) -> &dyn Predicate {
        &*self.predicate
    }

    /// Message written to the field's path when the predicate fails.
    #[must_use]
    pub fn message(&self) -> &Cow<'static, str> {
        &self.message
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// FIELD RULE
// ============================================================================

/// One validation unit in a rule tree.
#[derive(Clone, Default)]
pub struct FieldRule {
    pub(crate) name: String,
    pub(crate) is_optional: bool,
    pub(crate) empty_field_message: Option<Cow<'static, str>>,
    pub(crate) empty_test: Option<SharedPredicate>,
    pub(crate) skip_if: Option<SharedPredicate>,
    pub(crate) tests: Vec<Test>,
    pub(crate) fields: Vec<FieldRule>,
    pub(crate) stop_on_failure: StopScope,
    pub(crate) stop_on_success: StopScope,
}

impl FieldRule {
    /// Creates a mandatory rule for the dotted path `name`.
    ///
    /// The name is relative to the parent's data scope: the whole input at the
    /// root, or the current element inside an array fan-out.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Marks the field optional: an empty value is silently accepted.
    #[must_use = "builder methods must be chained or built"]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Sets whether the field is optional.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_optional(mut self, is_optional: bool) -> Self {
        self.is_optional = is_optional;
        self
    }

    /// Message used instead of the engine default when this mandatory field
    /// is empty.
    #[must_use = "builder methods must be chained or built"]
    pub fn empty_field_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.empty_field_message = Some(message.into());
        self
    }

    /// Replaces the default emptiness test with a closure.
    #[must_use = "builder methods must be chained or built"]
    pub fn empty_test<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &FieldContext) -> bool + Send + Sync + 'static,
    {
        self.empty_test_with(from_fn(f))
    }

    /// Replaces the default emptiness test with any predicate.
    #[must_use = "builder methods must be chained or built"]
    pub fn empty_test_with(mut self, predicate: impl Predicate + 'static) -> Self {
        self.empty_test = Some(Arc::new(predicate));
        self
    }

    /// Skips the field, tests and sub-fields included, when `f` returns `true`.
    #[must_use = "builder methods must be chained or built"]
    pub fn skip_if<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &FieldContext) -> bool + Send + Sync + 'static,
    {
        self.skip_if_with(from_fn(f))
    }

    /// Like [`skip_if`](Self::skip_if), with any predicate.
    #[must_use = "builder methods must be chained or built"]
    pub fn skip_if_with(mut self, predicate: impl Predicate + 'static) -> Self {
        self.skip_if = Some(Arc::new(predicate));
        self
    }

    /// Appends a test.
    #[must_use = "builder methods must be chained or built"]
    pub fn test(mut self, test: Test) -> Self {
        self.tests.push(test);
        self
    }

    /// Appends several tests, in order.
    #[must_use = "builder methods must be chained or built"]
    pub fn tests(mut self, tests: impl IntoIterator<Item = Test>) -> Self {
        self.tests.extend(tests);
        self
    }

    /// Sets the rules applied to every element when the value is an array.
    #[must_use = "builder methods must be chained or built"]
    pub fn fields(mut self, fields: Vec<FieldRule>) -> Self {
        self.fields = fields;
        self
    }

    /// What to stop after a failing test.
    #[must_use = "builder methods must be chained or built"]
    pub fn stop_on_failure(mut self, scope: StopScope) -> Self {
        self.stop_on_failure = scope;
        self
    }

    /// What to stop after a passing test.
    #[must_use = "builder methods must be chained or built"]
    pub fn stop_on_success(mut self, scope: StopScope) -> Self {
        self.stop_on_success = scope;
        self
    }

    /// Dotted path of the field, relative to its scope.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an empty value is accepted.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    /// Tests in declaration order.
    #[must_use]
    pub fn get_tests(&self) -> &[Test] {
        &self.tests
    }

    /// Nested rules for array elements.
    #[must_use]
    pub fn get_fields(&self) -> &[FieldRule] {
        &self.fields
    }

    /// Scope of the stop-on-failure option.
    #[must_use]
    pub fn get_stop_on_failure(&self) -> StopScope {
        self.stop_on_failure
    }

    /// Scope of the stop-on-success option.
    #[must_use]
    pub fn get_stop_on_success(&self) -> StopScope {
        self.stop_on_success
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("is_optional", &self.is_optional)
            .field("empty_field_message", &self.empty_field_message)
            .field("empty_test", &self.empty_test.is_some())
            .field("skip_if", &self.skip_if.is_some())
            .field("tests", &self.tests)
            .field("fields", &self.fields)
            .field("stop_on_failure", &self.stop_on_failure)
            .field("stop_on_success", &self.stop_on_success)
            .finish()
    }
}
