//! Helpers for reading untyped supplier payloads.
//!
//! Supplier JSON is loosely structured: the same logical field shows up under
//! several key names, numbers arrive as strings and lists are sometimes
//! double-encoded. These helpers keep the lookup rules in one place.

use serde_json::{Map, Value};

/// One untyped activity record as returned by a supplier.
pub type RawActivity = Map<String, Value>;

/// Truthiness as the supplier payloads are written against: `null`, `false`,
/// `0`, `NaN` and `""` are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns the first value among `keys` that is present and truthy.
pub fn first_truthy<'a>(raw: &'a RawActivity, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| is_truthy(value))
}

/// Returns the first value among `keys` that is present and not null.
pub fn first_present<'a>(raw: &'a RawActivity, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

/// Renders a scalar as text. Strings are returned verbatim, numbers and
/// booleans in their JSON form; containers and null yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// First truthy scalar among `keys`, rendered as text.
pub fn first_text(raw: &RawActivity, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .filter(|value| is_truthy(value))
        .find_map(scalar_text)
}

/// Walks `path` through nested objects.
pub fn value_at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, key| current.get(*key))
}

/// Text at `path` when it is a truthy scalar.
pub fn text_at(root: &Value, path: &[&str]) -> Option<String> {
    value_at(root, path)
        .filter(|value| is_truthy(value))
        .and_then(scalar_text)
}

/// Decodes a JSON document embedded in a string value.
pub fn parse_embedded_json(value: &Value) -> Option<Value> {
    match value {
        Value::String(text) => serde_json::from_str(text).ok(),
        _ => None,
    }
}

/// Keeps only the object elements of an array.
pub fn object_items(items: &[Value]) -> Vec<RawActivity> {
    items
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect()
}
