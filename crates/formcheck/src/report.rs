//! Evaluation output: per-path results, the report, and model targets.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::path;

/// Ordered map from dotted path to result, in evaluation order.
pub type FieldResults = IndexMap<String, FieldResult>;

// ============================================================================
// FIELD RESULT
// ============================================================================

/// Outcome recorded for one path.
///
/// Serializes as `true` for [`Valid`](Self::Valid) and as the bare message
/// string for [`Invalid`](Self::Invalid), which is the shape form components
/// read from `model.fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResult {
    /// The field passed.
    Valid,
    /// The field failed, with the message to show.
    Invalid(Cow<'static, str>),
}

impl FieldResult {
    /// Creates a failure with `message`.
    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid(message.into())
    }

    /// `true` for [`Valid`](Self::Valid).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(&**message),
        }
    }

    /// JSON form: `true` or the message string.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Valid => Value::Bool(true),
            Self::Invalid(message) => Value::String(message.to_string()),
        }
    }
}

impl fmt::Display for FieldResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("true"),
            Self::Invalid(message) => f.write_str(message),
        }
    }
}

impl Serialize for FieldResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid => serializer.serialize_bool(true),
            Self::Invalid(message) => serializer.serialize_str(message),
        }
    }
}

impl<'de> Deserialize<'de> for FieldResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldResultVisitor;

        impl Visitor<'_> for FieldResultVisitor {
            type Value = FieldResult;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("`true` or an error message")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldResult, E> {
                if v {
                    Ok(FieldResult::Valid)
                } else {
                    Err(E::invalid_value(de::Unexpected::Bool(false), &self))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldResult, E> {
                Ok(FieldResult::Invalid(Cow::Owned(v.to_owned())))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FieldResult, E> {
                Ok(FieldResult::Invalid(Cow::Owned(v)))
            }
        }

        deserializer.deserialize_any(FieldResultVisitor)
    }
}

// ============================================================================
// TARGET
// ============================================================================

/// A stateful model that receives evaluation results.
///
/// Presentation layers implement this for their own model type, or use
/// [`Model`].
pub trait ValidationTarget {
    /// Records `result` under `path`, replacing any previous value.
    fn record(&mut self, path: &str, result: FieldResult);

    /// Sets the model's overall validity flag.
    fn set_valid(&mut self, is_valid: bool);
}

/// Ready-made model: a `fields` map and an `isValid` flag.
///
/// ```
/// use formcheck::Model;
///
/// let model = Model::default();
/// assert_eq!(
///     serde_json::to_value(&model).unwrap(),
///     serde_json::json!({"fields": {}, "isValid": false})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Results by dotted path.
    #[serde(default)]
    pub fields: FieldResults,
    /// Overall validity after the last `validate_into`.
    #[serde(default)]
    pub is_valid: bool,
}

impl Model {
    /// Creates an empty, not-yet-valid model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Result recorded for `path`.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&FieldResult> {
        self.fields.get(path)
    }

    /// Drops every recorded result and resets the flag.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.is_valid = false;
    }
}

impl ValidationTarget for Model {
    fn record(&mut self, path: &str, result: FieldResult) {
        self.fields.insert(path.to_owned(), result);
    }

    fn set_valid(&mut self, is_valid: bool) {
        self.is_valid = is_valid;
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Result of one `validate` call.
///
/// Only fields that were evaluated have entries: skipped fields, empty
/// optional fields and siblings cut off by a stop option are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    fields: FieldResults,
    is_valid: bool,
}

impl ValidationReport {
    pub(crate) fn new(fields: FieldResults, is_valid: bool) -> Self {
        Self { fields, is_valid }
    }

    /// Whether every evaluated path is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// All results, in evaluation order.
    #[must_use]
    pub fn fields(&self) -> &FieldResults {
        &self.fields
    }

    /// Result for one path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FieldResult> {
        self.fields.get(path)
    }

    /// Failing paths with their messages.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(path, result)| result.message().map(|m| (path.as_str(), m)))
    }

    /// Number of recorded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when no path was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Writes every result into `target` and sets its validity.
    ///
    /// Paths the target already holds but this report lacks are kept.
    /// Returns the overall validity.
    pub fn merge_into<T: ValidationTarget + ?Sized>(&self, target: &mut T) -> bool {
        for (path, result) in &self.fields {
            target.record(path, result.clone());
        }
        target.set_valid(self.is_valid);
        self.is_valid
    }

    /// Unwraps into the results map and the validity flag.
    #[must_use]
    pub fn into_parts(self) -> (FieldResults, bool) {
        (self.fields, self.is_valid)
    }

    /// Results as a nested JSON object, with dotted paths expanded.
    ///
    /// Array indices become object keys: `subs.0.bread` ends up at
    /// `{"subs": {"0": {"bread": ...}}}`. If both `subs` and `subs.0.bread`
    /// are recorded, the deeper path wins because it is written later.
    #[must_use]
    pub fn to_tree(&self) -> Value {
        let mut tree = Value::Object(serde_json::Map::new());
        for (field, result) in &self.fields {
            path::assign(&mut tree, field, result.to_json());
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ValidationReport {
        let mut fields = FieldResults::new();
        fields.insert("name".into(), FieldResult::Valid);
        fields.insert("subs.0.bread".into(), FieldResult::invalid("Bread not available"));
        fields.insert("subs.1.bread".into(), FieldResult::Valid);
        ValidationReport::new(fields, false)
    }

    #[test]
    fn field_result_json_shape() {
        assert_eq!(serde_json::to_value(FieldResult::Valid).unwrap(), json!(true));
        assert_eq!(
            serde_json::to_value(FieldResult::invalid("Invalid email")).unwrap(),
            json!("Invalid email")
        );

        let back: FieldResult = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(back, FieldResult::Valid);
        let back: FieldResult = serde_json::from_value(json!("nope")).unwrap();
        assert_eq!(back.message(), Some("nope"));
        assert!(serde_json::from_value::<FieldResult>(json!(false)).is_err());
    }

    #[test]
    fn report_serializes_like_a_model() {
        assert_eq!(
            serde_json::to_value(sample()).unwrap(),
            json!({
                "fields": {
                    "name": true,
                    "subs.0.bread": "Bread not available",
                    "subs.1.bread": true
                },
                "isValid": false
            })
        );
    }

    #[test]
    fn errors_lists_only_failures() {
        let report = sample();
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors, vec![("subs.0.bread", "Bread not available")]);
        assert_eq!(report.len(), 3);
        assert!(!report.is_empty());
    }

    #[test]
    fn merge_keeps_seeded_fields() {
        let mut model = Model::new();
        model.fields.insert("server_error".into(), FieldResult::invalid("try later"));
        model.fields.insert("name".into(), FieldResult::invalid("stale"));

        let valid = sample().merge_into(&mut model);

        assert!(!valid);
        assert!(!model.is_valid);
        assert_eq!(model.field("server_error").and_then(FieldResult::message), Some("try later"));
        assert_eq!(model.field("name"), Some(&FieldResult::Valid));
        assert_eq!(model.fields.len(), 4);

        model.reset();
        assert!(model.fields.is_empty());
    }

    #[test]
    fn tree_expands_paths() {
        assert_eq!(
            sample().to_tree(),
            json!({
                "name": true,
                "subs": {
                    "0": {"bread": "Bread not available"},
                    "1": {"bread": true}
                }
            })
        );
    }

    #[test]
    fn model_round_trips_through_json() {
        let model: Model = serde_json::from_value(json!({
            "fields": {"email": "Invalid email"},
            "isValid": false
        }))
        .unwrap();
        assert_eq!(model.field("email"), Some(&FieldResult::invalid("Invalid email")));
    }
}
