//! Prelude module for convenient imports.
//!
//! ```
//! use formcheck::prelude::*;
//!
//! let rules = vec![FieldRule::new("age").test(Test::new(|v, _| v.is_number(), "Not a number"))];
//! assert!(Validation::new(rules).is_ok());
//! ```

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::engine::{EngineConfig, Validation};
pub use crate::report::{FieldResult, Model, ValidationReport, ValidationTarget};

// ============================================================================
// RULES AND PREDICATES
// ============================================================================

pub use crate::predicate::{FieldContext, Predicate, from_async, from_fn, from_try_fn};
pub use crate::rule::{FieldRule, StopScope, Test};

// ============================================================================
// DEFINITIONS AND ERRORS
// ============================================================================

pub use crate::definition::PredicateRegistry;
pub use crate::error::{ConfigError, EngineError, PredicateError};
