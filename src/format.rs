//!
//! Display helpers for dashboard views.
//!
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Title-case an identifier such as `dead-letter_queue` into `Dead Letter Queue`.
pub fn title_case(value: &str) -> String {
    value
        .split(['-', '_'])
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Render a timestamp as a long-form calendar date, e.g. `January 2, 2024`.
///
/// Accepts RFC 3339 timestamps, plain `YYYY-MM-DD` dates and epoch milliseconds. Dates are rendered in UTC.
/// Input that matches none of these is returned unchanged.
pub fn format_date(value: &str) -> String {
    let trimmed = value.trim();
    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok())
        .or_else(|| {
            trimmed
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.date_naive())
        });
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => value.to_owned(),
    }
}

/// Best-effort pretty printing of an opaque message body.
pub fn pretty_body(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => {
                serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| text.clone())
            }
            _ => text.clone(),
        },
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
