//! Error types for rule construction and evaluation.
//!
//! Failed field checks are never errors: they are data in the
//! [`ValidationReport`](crate::report::ValidationReport). The types here cover
//! the two ways a call can go wrong instead:
//!
//! - [`ConfigError`]: the rule tree itself is malformed. Raised while building
//!   a [`Validation`](crate::engine::Validation), before any data is seen.
//! - [`EngineError`]: a predicate failed to produce an answer at all. Raised
//!   from `validate`, aborting the remaining fields.

use std::borrow::Cow;

use thiserror::Error;

/// Boxed error type carried as the source of a [`PredicateError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// A malformed rule tree.
///
/// These are fatal: the author has to fix the rules, nothing is retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A rule has no name, or only whitespace.
    #[error("rule at '{path}' has no name")]
    MissingName {
        /// Location of the offending rule, e.g. `subs.fields[1]`.
        path: String,
    },

    /// A stop option holds something other than `"tests"` or `"fields"`.
    #[error("invalid stop option '{value}' on field '{field}': expected \"tests\" or \"fields\"")]
    InvalidStopScope {
        /// Name of the rule carrying the option.
        field: String,
        /// The rejected literal.
        value: String,
    },

    /// A definition references a predicate that was never registered.
    #[error("unknown predicate '{name}' referenced by field '{field}'")]
    UnknownPredicate {
        /// Name of the rule referencing the predicate.
        field: String,
        /// The unregistered predicate name.
        name: String,
    },

    /// The definition document is not valid JSON for the rule schema.
    #[error("malformed rule definition: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// PREDICATE ERRORS
// ============================================================================

/// Raised by a predicate that could not decide.
///
/// This is different from a predicate returning `false`. A timeout talking to
/// a uniqueness service is a `PredicateError`. A taken username is `Ok(false)`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PredicateError {
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxError>,
}

impl PredicateError {
    /// Creates an error with a message and no underlying cause.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error.
    pub fn with_source(
        message: impl Into<Cow<'static, str>>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// ENGINE ERRORS
// ============================================================================

/// A `validate` call that could not finish.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A test, `skip_if` or `empty_test` predicate returned an error.
    #[error("predicate for field '{field}' failed: {source}")]
    Predicate {
        /// Full dotted path of the field being evaluated.
        field: String,
        /// The error the predicate raised.
        #[source]
        source: PredicateError,
    },
}

impl EngineError {
    /// Dotted path of the field whose predicate failed.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Predicate { field, .. } => field,
        }
    }
}
