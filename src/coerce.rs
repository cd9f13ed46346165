//!
//! Lenient value coercion shared by the record mappers.
//!
//! None of these helpers fail: a value that cannot be coerced is reported as absent and the caller picks a default.
//!
use serde_json::{Map, Value};

/// Interpret a JSON value as a finite number, accepting numeric strings.
pub fn finite_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

/// Interpret a JSON value as a count. Fractions are truncated and negatives clamp to zero.
pub fn count(value: &Value) -> Option<u64> {
    finite_number(value).map(|n| if n <= 0.0 { 0 } else { n.trunc() as u64 })
}

/// First value among `keys` that is present and not null.
pub fn first_value<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// First value among `keys` that coerces to a count.
pub fn first_count(record: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(count)
}

/// First value among `keys` that is a non-empty string.
pub fn first_string(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Like [`first_string`], but numeric identifiers are accepted and rendered as text.
pub fn first_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(text)
}

/// First value among `keys` that is a JSON boolean.
pub fn first_bool(record: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(Value::as_bool)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce every element of a sequence to a string, dropping falsy entries.
///
/// Anything that is not a sequence yields an empty list.
pub fn string_list(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Vec::new(),
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Null | Value::Bool(false) => None,
            Value::Bool(true) => Some("true".to_owned()),
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect()
}
