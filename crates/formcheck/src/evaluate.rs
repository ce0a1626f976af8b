//! Recursive rule-tree evaluation.
//!
//! Walks one level of rules against a data scope, writing into an output map
//! that is passed down by `&mut`. Array-valued fields with nested rules fan
//! out once per element, depth-first, before the field's own tests run.
//!
//! Predicates are awaited one at a time in declaration order. Later tests and
//! the stop options depend on earlier answers, so nothing runs concurrently.

use std::borrow::Cow;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::EngineError;
use crate::path;
use crate::predicate::{FieldContext, Predicate, is_empty_value};
use crate::report::{FieldResult, FieldResults};
use crate::rule::{FieldRule, StopScope};

/// Per-call evaluation state. Nothing here outlives one `validate` call.
pub(crate) struct Evaluator<'e> {
    mandatory_field_error: &'e Cow<'static, str>,
    root: Arc<Value>,
    extra: Arc<Map<String, Value>>,
}

impl<'e> Evaluator<'e> {
    pub(crate) fn new(
        mandatory_field_error: &'e Cow<'static, str>,
        root: Arc<Value>,
        extra: Arc<Map<String, Value>>,
    ) -> Self {
        Self {
            mandatory_field_error,
            root,
            extra,
        }
    }

    /// Evaluates `rules` against the whole input.
    pub(crate) async fn run(
        &self,
        rules: &[FieldRule],
        out: &mut FieldResults,
    ) -> Result<bool, EngineError> {
        self.evaluate(rules, &self.root, String::new(), out).await
    }

    /// Evaluates `rules` against `scope`, prefixing every path with `base`.
    ///
    /// `scope` is the value found at `base` inside the input. Returns `true`
    /// when every path written under this level, including nested array
    /// elements, is valid.
    fn evaluate<'a>(
        &'a self,
        rules: &'a [FieldRule],
        scope: &'a Value,
        base: String,
        out: &'a mut FieldResults,
    ) -> BoxFuture<'a, Result<bool, EngineError>> {
        async move {
            let mut valid = true;

            for rule in rules {
                let field = path::join(&[base.as_str(), rule.name.as_str()]);
                let value = path::lookup(scope, &rule.name).unwrap_or(&path::NULL);
                let ctx = FieldContext::scoped(
                    field.clone(),
                    Arc::clone(&self.root),
                    base.clone(),
                    Arc::clone(&self.extra),
                );

                let is_empty = match &rule.empty_test {
                    Some(empty_test) => ask(&**empty_test, value, &ctx).await?,
                    None => is_empty_value(value),
                };

                if let Some(skip_if) = &rule.skip_if {
                    if ask(&**skip_if, value, &ctx).await? {
                        debug!(field = %field, "field skipped");
                        continue;
                    }
                }

                if is_empty {
                    if rule.is_optional {
                        trace!(field = %field, "optional field is empty");
                        continue;
                    }
                    let message = rule
                        .empty_field_message
                        .clone()
                        .unwrap_or_else(|| self.mandatory_field_error.clone());
                    debug!(field = %field, "mandatory field is empty");
                    out.insert(field, FieldResult::Invalid(message));
                    valid = false;
                    continue;
                }

                out.insert(field.clone(), FieldResult::Valid);

                if let Value::Array(items) = value {
                    if !rule.fields.is_empty() {
                        for (index, item) in items.iter().enumerate() {
                            let index = index.to_string();
                            let element_base = path::join(&[field.as_str(), index.as_str()]);
                            trace!(base = %element_base, "evaluating array element");
                            let element_valid = self
                                .evaluate(&rule.fields, item, element_base, out)
                                .await?;
                            valid &= element_valid;
                        }
                    }
                }

                let mut stop_siblings = false;
                for test in rule.get_tests() {
                    let passed = ask(test.predicate(), value, &ctx).await?;
                    trace!(field = %field, passed, "test evaluated");

                    if passed {
                        if rule.stop_on_success.is_set() {
                            stop_siblings = rule.stop_on_success == StopScope::Fields;
                            break;
                        }
                    } else {
                        out.insert(field.clone(), FieldResult::Invalid(test.message().clone()));
                        valid = false;
                        if rule.stop_on_failure.is_set() {
                            stop_siblings = rule.stop_on_failure == StopScope::Fields;
                            break;
                        }
                    }
                }

                if stop_siblings {
                    debug!(field = %field, "remaining sibling fields stopped");
                    break;
                }
            }

            Ok(valid)
        }
        .boxed()
    }
}

async fn ask(
    predicate: &dyn Predicate,
    value: &Value,
    ctx: &FieldContext,
) -> Result<bool, EngineError> {
    predicate.check(value, ctx).await.map_err(|source| {
        warn!(field = ctx.field(), error = %source, "predicate returned an error");
        EngineError::Predicate {
            field: ctx.field().to_owned(),
            source,
        }
    })
}
