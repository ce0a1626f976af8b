//! Dotted-path access into `serde_json::Value` trees.
//!
//! Paths are `.`-separated segments. Object members are addressed by key and
//! array elements by decimal index, so `"subs.0.bread"` reaches the `bread`
//! member of the first element of `subs`.
//!
//! Reads are tolerant: a missing segment yields `None` rather than an error.

use serde_json::{Map, Value};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// What a missing value reads as.
pub(crate) static NULL: Value = Value::Null;

/// Looks up `path` inside `root`.
///
/// An empty path returns `root` itself.
///
/// # Examples
///
/// ```
/// use formcheck::path::lookup;
/// use serde_json::json;
///
/// let data = json!({"address": {"post_code": 4890}, "subs": [{"bread": "rye"}]});
/// assert_eq!(lookup(&data, "address.post_code"), Some(&json!(4890)));
/// assert_eq!(lookup(&data, "subs.0.bread"), Some(&json!("rye")));
/// assert_eq!(lookup(&data, "address.city"), None);
/// ```
#[must_use]
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }

    path.split(SEPARATOR).try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Writes `value` at `path` inside `root`, creating intermediate objects.
///
/// Intermediates that are neither objects nor arrays are replaced by objects.
/// On an existing array a numeric segment indexes into it, and an index equal
/// to the array's length appends. Any other segment on an array replaces the
/// array with an object.
///
/// # Examples
///
/// ```
/// use formcheck::path::assign;
/// use serde_json::json;
///
/// let mut tree = json!({});
/// assign(&mut tree, "subs.0.bread", json!("Bread not available"));
/// assert_eq!(tree, json!({"subs": {"0": {"bread": "Bread not available"}}}));
/// ```
pub fn assign(root: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        *root = value;
        return;
    }

    let mut node = root;
    for segment in path.split(SEPARATOR) {
        node = child_mut(node, segment);
    }
    *node = value;
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match (&*node, segment.parse::<usize>()) {
        (Value::Array(items), Ok(index)) if index <= items.len() => Some(index),
        _ => None,
    };

    match (index, node) {
        (Some(index), Value::Array(items)) => {
            if index == items.len() {
                items.push(Value::Null);
            }
            &mut items[index]
        }
        (_, node) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            match node {
                Value::Object(map) => map.entry(segment).or_insert(Value::Null),
                _ => unreachable!("node was just replaced by an object"),
            }
        }
    }
}

/// Joins the non-empty parts with [`SEPARATOR`].
///
/// ```
/// use formcheck::path::join;
///
/// assert_eq!(join(&["", "name"]), "name");
/// assert_eq!(join(&["subs.0", "bread"]), "subs.0.bread");
/// ```
#[must_use]
pub fn join(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !out.is_empty() {
            out.push(SEPARATOR);
        }
        out.push_str(part);
    }
    out
}
