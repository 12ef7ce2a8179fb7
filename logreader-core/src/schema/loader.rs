//! Loading schemas from JSON files.
//!
//! A schema file is a JSON object mapping field names to rule objects, read
//! in file order:
//!
//! ```json
//! {
//!   "ts": {"type": "timestamp", "min": 0, "fullname": "timestamp"},
//!   "dp": {"type": "int", "values": {"1": "MALICIOUS", "2": "CLEAN"}},
//!   "nm": {"type": "text", "min_len": 1}
//! }
//! ```
//!
//! Recognized rule keys are `type`, `min`, `max`, `pattern`, `values`,
//! `min_len`, `max_len` and `fullname`. A key that the rule's type does not
//! support is a configuration error rather than being silently ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::{Constraint, FieldRule, FieldType, Schema};
use crate::error::{LogReaderError, Result};
use crate::pattern::PatternMatcher;
use crate::timestamp::parse_epoch_or_calendar;

/// One rule object as written in a schema file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldSpec {
    #[serde(rename = "type")]
    type_tag: String,
    min: Option<Value>,
    max: Option<Value>,
    pattern: Option<String>,
    values: Option<Value>,
    min_len: Option<usize>,
    max_len: Option<usize>,
    fullname: Option<String>,
}

impl FieldSpec {
    fn applicable_keys(field_type: FieldType) -> &'static [&'static str] {
        match field_type {
            FieldType::Timestamp => &["min", "max"],
            FieldType::Number | FieldType::EnumeratedInt => &["min", "max", "values"],
            FieldType::Pattern => &["pattern"],
            FieldType::Text => &["min_len", "max_len", "values"],
        }
    }

    fn present_keys(&self) -> impl Iterator<Item = &'static str> {
        [
            ("min", self.min.is_some()),
            ("max", self.max.is_some()),
            ("pattern", self.pattern.is_some()),
            ("values", self.values.is_some()),
            ("min_len", self.min_len.is_some()),
            ("max_len", self.max_len.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, present)| present.then_some(key))
    }

    fn into_rule(self, field: &str) -> Result<FieldRule> {
        let field_type = FieldType::from_tag(&self.type_tag).ok_or_else(|| {
            LogReaderError::field_configuration(
                field,
                format!("unrecognized value type '{}'", self.type_tag),
            )
        })?;

        let applicable = Self::applicable_keys(field_type);
        if let Some(key) = self.present_keys().find(|key| !applicable.contains(key)) {
            return Err(LogReaderError::field_configuration(
                field,
                format!("key '{}' does not apply to type '{}'", key, field_type),
            ));
        }

        let constraint = match field_type {
            FieldType::Timestamp => Constraint::Timestamp {
                min: bound(field, "min", self.min.as_ref(), timestamp_bound)?,
                max: bound(field, "max", self.max.as_ref(), timestamp_bound)?,
            },
            FieldType::Number => Constraint::Number {
                min: bound(field, "min", self.min.as_ref(), Value::as_f64)?,
                max: bound(field, "max", self.max.as_ref(), Value::as_f64)?,
                values: self
                    .values
                    .as_ref()
                    .map(|v| number_values(field, v))
                    .transpose()?,
            },
            FieldType::Pattern => {
                let pattern = self.pattern.as_deref().ok_or_else(|| {
                    LogReaderError::field_configuration(field, "pattern rules require 'pattern'")
                })?;
                Constraint::Pattern {
                    matcher: PatternMatcher::new(pattern)?,
                }
            }
            FieldType::Text => Constraint::Text {
                min_len: self.min_len,
                max_len: self.max_len,
                values: self
                    .values
                    .as_ref()
                    .map(|v| text_values(field, v))
                    .transpose()?,
            },
            FieldType::EnumeratedInt => Constraint::EnumeratedInt {
                min: bound(field, "min", self.min.as_ref(), Value::as_i64)?,
                max: bound(field, "max", self.max.as_ref(), Value::as_i64)?,
                values: self
                    .values
                    .as_ref()
                    .map(|v| int_values(field, v))
                    .transpose()?,
            },
        };

        let rule = FieldRule::new(constraint);
        Ok(match self.fullname {
            Some(full_name) => rule.with_full_name(full_name),
            None => rule,
        })
    }
}

fn bound<T>(
    field: &str,
    key: &str,
    value: Option<&Value>,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<Option<T>> {
    value
        .map(|v| {
            convert(v).ok_or_else(|| {
                LogReaderError::field_configuration(field, format!("invalid {} bound {}", key, v))
            })
        })
        .transpose()
}

fn timestamp_bound(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_epoch_or_calendar(s),
        _ => None,
    }
}

fn number_values(field: &str, value: &Value) -> Result<Vec<f64>> {
    as_array(field, value)?
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                LogReaderError::field_configuration(field, format!("value {} is not a number", v))
            })
        })
        .collect()
}

fn text_values(field: &str, value: &Value) -> Result<Vec<String>> {
    as_array(field, value)?
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                LogReaderError::field_configuration(field, format!("value {} is not a string", v))
            })
        })
        .collect()
}

fn int_values(field: &str, value: &Value) -> Result<BTreeMap<i64, Option<String>>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_i64().map(|n| (n, None)).ok_or_else(|| {
                    LogReaderError::field_configuration(
                        field,
                        format!("value {} is not an integer", v),
                    )
                })
            })
            .collect(),
        Value::Object(labels) => labels
            .iter()
            .map(|(key, label)| {
                let n = key.trim().parse::<i64>().map_err(|_| {
                    LogReaderError::field_configuration(
                        field,
                        format!("value key '{}' is not an integer", key),
                    )
                })?;
                let label = label.as_str().ok_or_else(|| {
                    LogReaderError::field_configuration(
                        field,
                        format!("label for value {} must be a string", n),
                    )
                })?;
                Ok((n, Some(label.to_string())))
            })
            .collect(),
        other => Err(LogReaderError::field_configuration(
            field,
            format!("values must be an array or an object, got {}", other),
        )),
    }
}

fn as_array<'a>(field: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| {
        LogReaderError::field_configuration(
            field,
            format!("values must be an array, got {}", value),
        )
    })
}

impl Schema {
    /// Builds a schema from an already-parsed JSON object.
    ///
    /// # Errors
    /// Returns a configuration error if `value` is not an object or any rule
    /// is invalid.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            LogReaderError::configuration("schema must be a JSON object of field rules")
        })?;

        let fields = object
            .iter()
            .map(|(name, spec)| {
                let spec: FieldSpec = serde_json::from_value(spec.clone())
                    .map_err(|e| LogReaderError::field_configuration(name, e))?;
                Ok((name.clone(), spec.into_rule(name)?))
            })
            .collect::<Result<Vec<(String, FieldRule)>>>()?;

        Self::new(fields)
    }

    /// Parses a schema from JSON text.
    ///
    /// # Errors
    /// Returns a serialization error for malformed JSON and a configuration
    /// error for invalid rules.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| LogReaderError::serialization("Failed to parse schema JSON", e))?;
        Self::from_json_value(&value)
    }

    /// Loads a schema file.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be read, otherwise as
    /// [`Schema::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LogReaderError::io(format!("Failed to read schema '{}'", path.display()), e)
        })?;
        let schema = Self::from_json_str(&content)?;
        tracing::debug!(
            "Loaded schema with {} fields from {}",
            schema.len(),
            path.display()
        );
        Ok(schema)
    }
}
