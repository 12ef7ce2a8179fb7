//! Field rule definitions.
//!
//! A rule is a closed tagged union: each field type carries exactly the
//! bounds it supports, so a text length bound on a timestamp field cannot
//! be expressed at all.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pattern::PatternMatcher;

/// Field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Epoch seconds or a `YYYY-MM-DD HH:MM:SS` string
    Timestamp,
    /// Integer or floating-point number
    Number,
    /// String matching a prefix-anchored regular expression
    Pattern,
    /// Free text with optional length bounds
    Text,
    /// Integer, usually restricted to an enumerated set
    EnumeratedInt,
}

impl FieldType {
    /// Returns the type name for messages
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Timestamp => "timestamp",
            FieldType::Number => "number",
            FieldType::Pattern => "pattern",
            FieldType::Text => "text",
            FieldType::EnumeratedInt => "int",
        }
    }

    /// Resolves a schema-file type tag, including its aliases.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "timestamp" | "datetime" => Some(FieldType::Timestamp),
            "number" | "float" => Some(FieldType::Number),
            "pattern" | "regex" => Some(FieldType::Pattern),
            "text" | "str" | "string" => Some(FieldType::Text),
            "int" | "enum" | "enumerated_int" => Some(FieldType::EnumeratedInt),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Type-specific constraints of a field.
///
/// Absent bounds mean "no constraint of that kind". Numeric and temporal
/// bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Timestamp bounds in epoch seconds
    Timestamp {
        /// Earliest accepted instant
        min: Option<i64>,
        /// Latest accepted instant
        max: Option<i64>,
    },
    /// Floating-point bounds and allowed values
    Number {
        /// Smallest accepted value
        min: Option<f64>,
        /// Largest accepted value
        max: Option<f64>,
        /// Closed set of accepted values
        values: Option<Vec<f64>>,
    },
    /// Prefix-anchored pattern
    Pattern {
        /// Compiled pattern
        matcher: PatternMatcher,
    },
    /// Text length bounds (in characters) and allowed values
    Text {
        /// Minimum length
        min_len: Option<usize>,
        /// Maximum length
        max_len: Option<usize>,
        /// Closed set of accepted strings
        values: Option<Vec<String>>,
    },
    /// Integer bounds and enumerated values with optional labels
    EnumeratedInt {
        /// Smallest accepted value
        min: Option<i64>,
        /// Largest accepted value
        max: Option<i64>,
        /// Accepted values, each with an optional label
        values: Option<BTreeMap<i64, Option<String>>>,
    },
}

impl Constraint {
    /// Returns the type tag of this constraint
    pub fn field_type(&self) -> FieldType {
        match self {
            Constraint::Timestamp { .. } => FieldType::Timestamp,
            Constraint::Number { .. } => FieldType::Number,
            Constraint::Pattern { .. } => FieldType::Pattern,
            Constraint::Text { .. } => FieldType::Text,
            Constraint::EnumeratedInt { .. } => FieldType::EnumeratedInt,
        }
    }
}

/// Constraints for a single schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    constraint: Constraint,
    full_name: Option<String>,
}

impl FieldRule {
    /// Creates a rule from an explicit constraint.
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            full_name: None,
        }
    }

    /// Timestamp rule with optional bounds in epoch seconds.
    pub fn timestamp(min: Option<i64>, max: Option<i64>) -> Self {
        Self::new(Constraint::Timestamp { min, max })
    }

    /// Number rule with optional bounds.
    pub fn number(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(Constraint::Number {
            min,
            max,
            values: None,
        })
    }

    /// Number rule restricted to a closed set of values.
    pub fn number_values(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(Constraint::Number {
            min: None,
            max: None,
            values: Some(values.into_iter().collect()),
        })
    }

    /// Pattern rule.
    ///
    /// # Errors
    /// Returns an invalid pattern error if `pattern` does not compile.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Self::new(Constraint::Pattern {
            matcher: PatternMatcher::new(pattern)?,
        }))
    }

    /// Text rule with optional length bounds.
    pub fn text(min_len: Option<usize>, max_len: Option<usize>) -> Self {
        Self::new(Constraint::Text {
            min_len,
            max_len,
            values: None,
        })
    }

    /// Text rule restricted to a closed set of strings.
    pub fn text_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Constraint::Text {
            min_len: None,
            max_len: None,
            values: Some(values.into_iter().map(Into::into).collect()),
        })
    }

    /// Integer rule with optional bounds and no enumeration.
    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        Self::new(Constraint::EnumeratedInt {
            min,
            max,
            values: None,
        })
    }

    /// Enumerated integer rule with a label for each value.
    pub fn enumerated<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self::new(Constraint::EnumeratedInt {
            min: None,
            max: None,
            values: Some(
                values
                    .into_iter()
                    .map(|(value, label)| (value, Some(label.into())))
                    .collect(),
            ),
        })
    }

    /// Builder method to set the descriptive name used in diagnostics.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Returns the constraint
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Returns the type tag
    pub fn field_type(&self) -> FieldType {
        self.constraint.field_type()
    }

    /// Returns the descriptive name, if one was given
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// Label of an enumerated integer value, if the rule defines one.
    pub fn label_for(&self, value: i64) -> Option<&str> {
        match &self.constraint {
            Constraint::EnumeratedInt {
                values: Some(values),
                ..
            } => values.get(&value).and_then(|label| label.as_deref()),
            _ => None,
        }
    }

    /// Checks the rule itself for contradictions (not a record).
    pub fn validate_structure(&self) -> std::result::Result<(), String> {
        match &self.constraint {
            Constraint::Timestamp { min, max } => check_order(*min, *max, "min", "max"),
            Constraint::Number { min, max, values } => {
                for (label, bound) in [("min", min), ("max", max)] {
                    if let Some(bound) = bound
                        && !bound.is_finite()
                    {
                        return Err(format!("{} must be a finite number, got {}", label, bound));
                    }
                }
                if let Some(values) = values {
                    if values.is_empty() {
                        return Err("values must not be empty".into());
                    }
                    if values.iter().any(|v| !v.is_finite()) {
                        return Err("values must be finite numbers".into());
                    }
                }
                match (min, max) {
                    (Some(lo), Some(hi)) if lo > hi => {
                        Err(format!("min {} is greater than max {}", lo, hi))
                    }
                    _ => Ok(()),
                }
            }
            Constraint::Pattern { .. } => Ok(()),
            Constraint::Text {
                min_len,
                max_len,
                values,
            } => {
                if values.as_ref().is_some_and(Vec::is_empty) {
                    return Err("values must not be empty".into());
                }
                check_order(*min_len, *max_len, "min_len", "max_len")
            }
            Constraint::EnumeratedInt { min, max, values } => {
                if values.as_ref().is_some_and(BTreeMap::is_empty) {
                    return Err("values must not be empty".into());
                }
                check_order(*min, *max, "min", "max")
            }
        }
    }
}

fn check_order<T: PartialOrd + fmt::Display>(
    lower: Option<T>,
    upper: Option<T>,
    lower_name: &str,
    upper_name: &str,
) -> std::result::Result<(), String> {
    match (lower, upper) {
        (Some(lo), Some(hi)) if lo > hi => Err(format!(
            "{} {} is greater than {} {}",
            lower_name, lo, upper_name, hi
        )),
        _ => Ok(()),
    }
}
