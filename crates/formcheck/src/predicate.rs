//! Predicates and the context they are evaluated in.
//!
//! Tests, `skip_if` conditions and `empty_test` overrides all share one
//! signature:
//!
//! ```text
//! (value: &Value, ctx: &FieldContext) -> Result<bool, PredicateError>   (async)
//! ```
//!
//! Implement [`Predicate`] directly for reusable checks that need state. For
//! the common case, wrap a closure with [`from_fn`], [`from_try_fn`] or
//! [`from_async`].
//!
//! # Examples
//!
//! ```
//! use formcheck::predicate::{from_async, from_fn};
//! use formcheck::PredicateError;
//!
//! let is_number = from_fn(|value, _ctx| value.is_number());
//!
//! let username_free = from_async(|value, _ctx| async move {
//!     // pretend this asks a remote service
//!     Ok::<_, PredicateError>(value.as_str() != Some("admin"))
//! });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde_json::{Map, Value};

use crate::error::PredicateError;
use crate::path;

/// Result of evaluating a single predicate.
pub type PredicateResult = Result<bool, PredicateError>;

// ============================================================================
// FIELD CONTEXT
// ============================================================================

/// Read-only view handed to every predicate.
///
/// Carries the full dotted path of the field under evaluation, the data scope
/// the field's name was resolved against, and any extra context the caller
/// passed to `validate_with_context`. Inside an array fan-out the scope is the
/// current element, not the whole input.
///
/// The input is held once per call and shared; a scope is its dotted path
/// inside that input, so cloning a context never copies data.
#[derive(Clone)]
pub struct FieldContext {
    field: String,
    root: Arc<Value>,
    scope: String,
    extra: Arc<Map<String, Value>>,
}

impl FieldContext {
    /// Creates a context for `field`, resolved against the whole of `data`.
    pub fn new(
        field: impl Into<String>,
        data: Arc<Value>,
        extra: Arc<Map<String, Value>>,
    ) -> Self {
        Self::scoped(field, data, String::new(), extra)
    }

    /// Creates a context whose scope is the value at `scope` inside `root`.
    pub(crate) fn scoped(
        field: impl Into<String>,
        root: Arc<Value>,
        scope: String,
        extra: Arc<Map<String, Value>>,
    ) -> Self {
        Self {
            field: field.into(),
            root,
            scope,
            extra,
        }
    }

    /// Full dotted path of the field, e.g. `subs.1.bread`.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Alias of [`field`](Self::field).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.field
    }

    /// The data scope the field was read from.
    #[must_use]
    pub fn data(&self) -> &Value {
        path::lookup(&self.root, &self.scope).unwrap_or(&path::NULL)
    }

    /// Looks up a caller-supplied context entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// All caller-supplied context entries.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

impl fmt::Debug for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldContext")
            .field("field", &self.field)
            .field("scope", &self.scope)
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// PREDICATE TRAIT
// ============================================================================

/// An asynchronous yes/no question about a field value.
///
/// `Ok(false)` is an ordinary answer. `Err` means the question could not be
/// answered; the engine aborts the whole `validate` call with it.
pub trait Predicate: Send + Sync {
    /// Evaluates the predicate.
    fn check<'a>(&'a self, value: &'a Value, ctx: &'a FieldContext)
    -> BoxFuture<'a, PredicateResult>;
}

impl<P: Predicate + ?Sized> Predicate for Arc<P> {
    fn check<'a>(
        &'a self,
        value: &'a Value,
        ctx: &'a FieldContext,
    ) -> BoxFuture<'a, PredicateResult> {
        (**self).check(value, ctx)
    }
}

/// Shared, type-erased predicate as stored in rules.
pub type SharedPredicate = Arc<dyn Predicate>;

// ============================================================================
// CLOSURE ADAPTERS
// ============================================================================

/// Predicate backed by a synchronous, infallible closure.
#[derive(Clone, Copy)]
pub struct FnPredicate<F>(F);

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Value, &FieldContext) -> bool + Send + Sync,
{
    fn check<'a>(
        &'a self,
        value: &'a Value,
        ctx: &'a FieldContext,
    ) -> BoxFuture<'a, PredicateResult> {
        future::ready(Ok((self.0)(value, ctx))).boxed()
    }
}

/// Wraps a synchronous `bool` closure.
pub fn from_fn<F>(f: F) -> FnPredicate<F>
where
    F: Fn(&Value, &FieldContext) -> bool + Send + Sync,
{
    FnPredicate(f)
}

/// Predicate backed by a synchronous closure that may fail.
#[derive(Clone, Copy)]
pub struct TryFnPredicate<F>(F);

impl<F> Predicate for TryFnPredicate<F>
where
    F: Fn(&Value, &FieldContext) -> PredicateResult + Send + Sync,
{
    fn check<'a>(
        &'a self,
        value: &'a Value,
        ctx: &'a FieldContext,
    ) -> BoxFuture<'a, PredicateResult> {
        future::ready((self.0)(value, ctx)).boxed()
    }
}

/// Wraps a synchronous closure returning `Result<bool, PredicateError>`.
pub fn from_try_fn<F>(f: F) -> TryFnPredicate<F>
where
    F: Fn(&Value, &FieldContext) -> PredicateResult + Send + Sync,
{
    TryFnPredicate(f)
}

/// Predicate backed by an async closure.
///
/// The closure receives owned clones of the value and the context so that the
/// returned future can be `'static`.
#[derive(Clone, Copy)]
pub struct AsyncPredicate<F>(F);

impl<F, Fut> Predicate for AsyncPredicate<F>
where
    F: Fn(Value, FieldContext) -> Fut + Send + Sync,
    Fut: Future<Output = PredicateResult> + Send + 'static,
{
    fn check<'a>(
        &'a self,
        value: &'a Value,
        ctx: &'a FieldContext,
    ) -> BoxFuture<'a, PredicateResult> {
        (self.0)(value.clone(), ctx.clone()).boxed()
    }
}

/// Wraps a closure returning a future, for checks that perform I/O.
pub fn from_async<F, Fut>(f: F) -> AsyncPredicate<F>
where
    F: Fn(Value, FieldContext) -> Fut + Send + Sync,
    Fut: Future<Output = PredicateResult> + Send + 'static,
{
    AsyncPredicate(f)
}

// ============================================================================
// EMPTINESS
// ============================================================================

/// The default emptiness test.
///
/// A value is empty unless it is a number, `true`, or a string or array with
/// a non-zero length. Objects count as empty whatever they hold, so a
/// mandatory object-valued field needs its own `empty_test`.
///
/// | value                  | empty |
/// |------------------------|-------|
/// | `null` / missing       | yes   |
/// | `""`, `[]`             | yes   |
/// | any object             | yes   |
/// | `false`                | yes   |
/// | `true`                 | no    |
/// | any number, even `0`   | no    |
/// | non-empty string/array | no    |
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Object(_) => true,
        Value::Bool(b) => !b,
        Value::Number(_) => false,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
    }
}
