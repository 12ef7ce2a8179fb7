//! Timestamp coercion for `timestamp` fields and bounds.
//!
//! Two encodings are accepted: integer seconds since the Unix epoch (as a
//! JSON integer or an integer string) and a calendar string in
//! `YYYY-MM-DD HH:MM:SS` form. Calendar strings carry no zone and are read
//! as UTC.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// Calendar format accepted for timestamp values and bounds.
pub const CALENDAR_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Coerces a raw field value to epoch seconds.
///
/// The epoch-seconds reading is tried first; the calendar reading is the
/// fallback. Returns `None` when neither applies.
pub fn coerce_epoch_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .and_then(whole_f64_to_i64)
        }),
        Value::String(s) => parse_epoch_or_calendar(s),
        _ => None,
    }
}

/// Parses a string as epoch seconds, falling back to the calendar format.
///
/// Surrounding whitespace is ignored for epoch seconds only; calendar strings
/// must match the format exactly.
pub fn parse_epoch_or_calendar(text: &str) -> Option<i64> {
    text.trim()
        .parse::<i64>()
        .ok()
        .or_else(|| parse_calendar(text))
}

/// Parses a `YYYY-MM-DD HH:MM:SS` string into epoch seconds (UTC).
pub fn parse_calendar(text: &str) -> Option<i64> {
    // chrono skips whitespace before numeric fields
    if text.trim() != text {
        return None;
    }
    NaiveDateTime::parse_from_str(text, CALENDAR_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Renders epoch seconds in the calendar format used in diagnostics.
pub fn format_epoch(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format(CALENDAR_FORMAT).to_string())
        .unwrap_or_else(|| seconds.to_string())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn whole_f64_to_i64(value: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; the bound is exclusive
    if value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
