//! Row validation against a [`Schema`].
//!
//! Validation short-circuits: the field set is checked first (extra keys,
//! then missing keys), then each field in schema order, and the first failure
//! becomes the record's [`Rejection`]. A rejection is an ordinary outcome,
//! never an error.
//!
//! # Example
//! ```rust
//! use logreader_core::schema::{FieldRule, Schema};
//! use logreader_core::validator::validate;
//! use serde_json::json;
//!
//! # fn example() -> logreader_core::Result<()> {
//! let schema = Schema::builder()
//!     .field("dp", FieldRule::enumerated([(1, "MALICIOUS"), (2, "CLEAN")]))
//!     .build()?;
//!
//! let record = json!({"dp": 7}).as_object().cloned().unwrap_or_default();
//! let outcome = validate(&record, Some(&schema));
//! assert!(!outcome.is_accepted());
//! assert_eq!(
//!     outcome.reason().as_deref(),
//!     Some(r#"dp value "7" expected to be one of [1 (MALICIOUS), 2 (CLEAN)]"#)
//! );
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::pattern::PatternMatcher;
use crate::record::RawRecord;
use crate::schema::{Constraint, FieldRule, Schema};
use crate::timestamp::{coerce_epoch_seconds, format_epoch, whole_f64_to_i64};

/// The constraint a field value broke.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldViolation {
    /// Pattern and text fields require a string
    NotAString,
    /// The pattern did not match at the start of the value
    PatternMismatch,
    /// The value could not be read as a finite number
    NotANumber,
    /// The value could not be read as an integer
    NotAnInteger,
    /// The value could not be read as a timestamp
    NotATimestamp,
    /// The value is outside the allowed set
    NotAllowed {
        /// Rendered allowed values, labelled where the rule has labels
        allowed: Vec<String>,
    },
    /// Numeric value below the minimum
    BelowMinimum {
        /// Rendered minimum
        min: String,
    },
    /// Numeric value above the maximum
    AboveMaximum {
        /// Rendered maximum
        max: String,
    },
    /// Text shorter than the minimum length
    TooShort {
        /// Minimum length in characters
        min_len: usize,
    },
    /// Text longer than the maximum length
    TooLong {
        /// Maximum length in characters
        max_len: usize,
    },
    /// Timestamp before the earliest accepted instant
    TooEarly {
        /// Rendered earliest instant
        min: String,
    },
    /// Timestamp after the latest accepted instant
    TooLate {
        /// Rendered latest instant
        max: String,
    },
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAString => write!(f, "must be a string"),
            Self::PatternMismatch => write!(f, "does not match expected pattern"),
            Self::NotANumber => write!(f, "is not a number"),
            Self::NotAnInteger => write!(f, "is not an integer"),
            Self::NotATimestamp => {
                write!(f, "is not epoch seconds or a \"YYYY-MM-DD HH:MM:SS\" timestamp")
            }
            Self::NotAllowed { allowed } => {
                write!(f, "expected to be one of [{}]", allowed.join(", "))
            }
            Self::BelowMinimum { min } => write!(f, "must be at least {}", min),
            Self::AboveMaximum { max } => write!(f, "must be at most {}", max),
            Self::TooShort { min_len } => {
                write!(f, "must be at least {} characters long", min_len)
            }
            Self::TooLong { max_len } => write!(f, "must be at most {} characters long", max_len),
            Self::TooEarly { min } => write!(f, "must be at or after {}", min),
            Self::TooLate { max } => write!(f, "must be at or before {}", max),
        }
    }
}

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// The record has fields the schema does not declare
    ExtraKeys {
        /// Undeclared field names, in record order
        keys: Vec<String>,
    },
    /// The record lacks fields the schema declares
    MissingKeys {
        /// Missing field names, in schema order
        keys: Vec<String>,
    },
    /// A field value broke its rule
    Field {
        /// Field name
        field: String,
        /// Descriptive name from the rule, if any
        full_name: Option<String>,
        /// Rendered raw value
        value: String,
        /// The broken constraint
        violation: FieldViolation,
    },
    /// The line could not be parsed as a record
    Malformed {
        /// Parser message
        message: String,
    },
}

impl Rejection {
    /// Name of the field at fault, for field-level rejections
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtraKeys { keys } => write!(f, "extra keys found: {}", keys.join(", ")),
            Self::MissingKeys { keys } => write!(f, "not all keys found: {}", keys.join(", ")),
            Self::Field {
                field,
                full_name: Some(full_name),
                value,
                violation,
            } => write!(f, "{} ({}) value \"{}\" {}", field, full_name, value, violation),
            Self::Field {
                field,
                full_name: None,
                value,
                violation,
            } => write!(f, "{} value \"{}\" {}", field, value, violation),
            Self::Malformed { message } => write!(f, "malformed record: {}", message),
        }
    }
}

/// Accept/reject decision for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    rejection: Option<Rejection>,
}

impl ValidationOutcome {
    /// An accepted outcome
    pub fn accepted() -> Self {
        Self { rejection: None }
    }

    /// A rejected outcome
    pub fn rejected(rejection: Rejection) -> Self {
        Self {
            rejection: Some(rejection),
        }
    }

    /// Returns true if the record conforms
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }

    /// Returns the rejection, if any
    pub fn rejection(&self) -> Option<&Rejection> {
        self.rejection.as_ref()
    }

    /// Consumes the outcome, returning the rejection
    pub fn into_rejection(self) -> Option<Rejection> {
        self.rejection
    }

    /// Single-sentence rejection reason
    pub fn reason(&self) -> Option<String> {
        self.rejection.as_ref().map(ToString::to_string)
    }
}

/// Validates one record. `None` accepts every record.
pub fn validate(record: &RawRecord, schema: Option<&Schema>) -> ValidationOutcome {
    match schema {
        Some(schema) => schema.validate_record(record),
        None => ValidationOutcome::accepted(),
    }
}

impl Schema {
    /// Validates one record against this schema.
    pub fn validate_record(&self, record: &RawRecord) -> ValidationOutcome {
        let extra: Vec<String> = record
            .keys()
            .filter(|key| !self.contains(key))
            .cloned()
            .collect();
        if !extra.is_empty() {
            return ValidationOutcome::rejected(Rejection::ExtraKeys { keys: extra });
        }

        let missing: Vec<String> = self
            .field_names()
            .filter(|name| !record.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return ValidationOutcome::rejected(Rejection::MissingKeys { keys: missing });
        }

        for (name, rule) in self.iter() {
            let Some(value) = record.get(name) else {
                continue;
            };
            if let Err(violation) = check_value(rule.constraint(), value) {
                return ValidationOutcome::rejected(field_rejection(name, rule, value, violation));
            }
        }

        ValidationOutcome::accepted()
    }
}

fn field_rejection(
    name: &str,
    rule: &FieldRule,
    value: &Value,
    violation: FieldViolation,
) -> Rejection {
    Rejection::Field {
        field: name.to_string(),
        full_name: rule.full_name().map(str::to_string),
        value: render_value(value),
        violation,
    }
}

/// Strings are shown as-is, everything else as JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

type Check = std::result::Result<(), FieldViolation>;

fn check_value(constraint: &Constraint, value: &Value) -> Check {
    match constraint {
        Constraint::Timestamp { min, max } => check_timestamp(value, *min, *max),
        Constraint::Number { min, max, values } => {
            check_number(value, *min, *max, values.as_deref())
        }
        Constraint::Pattern { matcher } => check_pattern(value, matcher),
        Constraint::Text {
            min_len,
            max_len,
            values,
        } => check_text(value, *min_len, *max_len, values.as_deref()),
        Constraint::EnumeratedInt { min, max, values } => {
            check_integer(value, *min, *max, values.as_ref())
        }
    }
}

fn check_pattern(value: &Value, matcher: &PatternMatcher) -> Check {
    let text = value.as_str().ok_or(FieldViolation::NotAString)?;
    if matcher.matches(text) {
        Ok(())
    } else {
        Err(FieldViolation::PatternMismatch)
    }
}

#[allow(clippy::float_cmp)]
fn check_number(
    value: &Value,
    min: Option<f64>,
    max: Option<f64>,
    values: Option<&[f64]>,
) -> Check {
    let number = coerce_number(value).ok_or(FieldViolation::NotANumber)?;

    if let Some(values) = values
        && !values.iter().any(|allowed| *allowed == number)
    {
        return Err(FieldViolation::NotAllowed {
            allowed: values.iter().map(ToString::to_string).collect(),
        });
    }
    if let Some(min) = min
        && number < min
    {
        return Err(FieldViolation::BelowMinimum {
            min: min.to_string(),
        });
    }
    if let Some(max) = max
        && number > max
    {
        return Err(FieldViolation::AboveMaximum {
            max: max.to_string(),
        });
    }
    Ok(())
}

fn check_integer(
    value: &Value,
    min: Option<i64>,
    max: Option<i64>,
    values: Option<&BTreeMap<i64, Option<String>>>,
) -> Check {
    let number = coerce_integer(value).ok_or(FieldViolation::NotAnInteger)?;

    if let Some(values) = values
        && !values.contains_key(&number)
    {
        return Err(FieldViolation::NotAllowed {
            allowed: values
                .iter()
                .map(|(value, label)| match label {
                    Some(label) => format!("{} ({})", value, label),
                    None => value.to_string(),
                })
                .collect(),
        });
    }
    if let Some(min) = min
        && number < min
    {
        return Err(FieldViolation::BelowMinimum {
            min: min.to_string(),
        });
    }
    if let Some(max) = max
        && number > max
    {
        return Err(FieldViolation::AboveMaximum {
            max: max.to_string(),
        });
    }
    Ok(())
}

fn check_text(
    value: &Value,
    min_len: Option<usize>,
    max_len: Option<usize>,
    values: Option<&[String]>,
) -> Check {
    let text = value.as_str().ok_or(FieldViolation::NotAString)?;

    if let Some(values) = values
        && !values.iter().any(|allowed| allowed == text)
    {
        return Err(FieldViolation::NotAllowed {
            allowed: values.to_vec(),
        });
    }

    let length = text.chars().count();
    if let Some(min_len) = min_len
        && length < min_len
    {
        return Err(FieldViolation::TooShort { min_len });
    }
    if let Some(max_len) = max_len
        && length > max_len
    {
        return Err(FieldViolation::TooLong { max_len });
    }
    Ok(())
}

fn check_timestamp(value: &Value, min: Option<i64>, max: Option<i64>) -> Check {
    let seconds = coerce_epoch_seconds(value).ok_or(FieldViolation::NotATimestamp)?;

    if let Some(min) = min
        && seconds < min
    {
        return Err(FieldViolation::TooEarly {
            min: format_epoch(min),
        });
    }
    if let Some(max) = max
        && seconds > max
    {
        return Err(FieldViolation::TooLate {
            max: format_epoch(max),
        });
    }
    Ok(())
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .and_then(whole_f64_to_i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_log_schema;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn single(rule: FieldRule) -> Schema {
        Schema::new([("f", rule)]).unwrap()
    }

    fn reason_for(schema: &Schema, value: Value) -> Option<String> {
        schema.validate_record(&record(json!({ "f": value }))).reason()
    }

    fn valid_log_record() -> Value {
        json!({
            "ts": 1558518530,
            "pt": 0.42,
            "si": "f2e1d8a4-6c39-4b1e-9a7d-0c3b5e2f1a90",
            "uu": "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d",
            "bg": "77f1e0a2-1b2c-4d3e-8f90-a1b2c3d4e5f6",
            "sha": "ab".repeat(32),
            "nm": "report.pdf",
            "ph": "/home/user/docs/report.pdf",
            "dp": 2
        })
    }

    #[test]
    fn test_no_schema_accepts_everything() {
        let outcome = validate(&record(json!({"anything": [1, 2]})), None);
        assert!(outcome.is_accepted());
        assert_eq!(outcome.reason(), None);
    }

    #[test]
    fn test_default_schema_accepts_valid_record() {
        let schema = default_log_schema().unwrap();
        let outcome = validate(&record(valid_log_record()), Some(&schema));
        assert!(outcome.is_accepted(), "{:?}", outcome.reason());
    }

    #[test]
    fn test_extra_keys_rejected() {
        let schema = default_log_schema().unwrap();
        let mut fields = record(valid_log_record());
        fields.insert("zz".into(), json!("surplus"));

        let outcome = schema.validate_record(&fields);
        assert_eq!(outcome.reason().as_deref(), Some("extra keys found: zz"));
    }

    #[test]
    fn test_missing_keys_rejected() {
        let schema = default_log_schema().unwrap();
        let mut fields = record(valid_log_record());
        fields.remove("dp");
        fields.remove("si");

        let outcome = schema.validate_record(&fields);
        assert_eq!(outcome.reason().as_deref(), Some("not all keys found: si, dp"));
        assert!(matches!(
            outcome.rejection(),
            Some(Rejection::MissingKeys { .. })
        ));
    }

    #[test]
    fn test_extra_keys_checked_before_missing() {
        let schema = default_log_schema().unwrap();
        let mut fields = record(valid_log_record());
        fields.remove("dp");
        fields.insert("disposition".into(), json!(2));

        let reason = schema.validate_record(&fields).reason().unwrap();
        assert!(reason.starts_with("extra keys found"), "{}", reason);
    }

    #[test]
    fn test_first_failing_field_in_schema_order() {
        let schema = default_log_schema().unwrap();
        let mut fields = record(valid_log_record());
        fields.insert("dp".into(), json!(9));
        fields.insert("pt".into(), json!(-1.5));

        let outcome = schema.validate_record(&fields);
        assert_eq!(outcome.rejection().and_then(Rejection::field), Some("pt"));
        assert_eq!(
            outcome.reason().as_deref(),
            Some(r#"pt (processing time) value "-1.5" must be at least 0"#)
        );
    }

    #[test]
    fn test_pattern_is_prefix_anchored() {
        let schema = single(FieldRule::pattern("^abc").unwrap());
        assert_eq!(reason_for(&schema, json!("abcXYZ")), None);
        assert_eq!(
            reason_for(&schema, json!("xabc")).as_deref(),
            Some(r#"f value "xabc" does not match expected pattern"#)
        );
        assert_eq!(
            reason_for(&schema, json!(123)).as_deref(),
            Some(r#"f value "123" must be a string"#)
        );
    }

    #[test]
    fn test_number_bounds_are_inclusive() {
        let schema = single(FieldRule::number(Some(0.0), Some(10.0)));
        assert_eq!(reason_for(&schema, json!(0.0)), None);
        assert_eq!(reason_for(&schema, json!(10)), None);
        assert_eq!(reason_for(&schema, json!("2.5")), None);
        assert_eq!(
            reason_for(&schema, json!(-1)).as_deref(),
            Some(r#"f value "-1" must be at least 0"#)
        );
        assert_eq!(
            reason_for(&schema, json!(11)).as_deref(),
            Some(r#"f value "11" must be at most 10"#)
        );
    }

    #[test]
    fn test_number_coercion_failures() {
        let schema = single(FieldRule::number(None, None));
        for bad in [json!("fast"), json!("NaN"), json!("inf"), json!(null), json!(true)] {
            let reason = reason_for(&schema, bad.clone()).unwrap();
            assert!(reason.ends_with("is not a number"), "{} -> {}", bad, reason);
        }
    }

    #[test]
    fn test_number_allowed_values() {
        let schema = single(FieldRule::number_values([0.5, 1.5]));
        assert_eq!(reason_for(&schema, json!(1.5)), None);
        assert_eq!(
            reason_for(&schema, json!(2)).as_deref(),
            Some(r#"f value "2" expected to be one of [0.5, 1.5]"#)
        );
    }

    #[test]
    fn test_disposition_values() {
        let schema = single(FieldRule::enumerated([
            (1, "MALICIOUS"),
            (2, "CLEAN"),
            (3, "UNKNOWN"),
        ]));
        for ok in [json!(1), json!(2), json!(3), json!("3"), json!(2.0)] {
            assert_eq!(reason_for(&schema, ok.clone()), None, "{}", ok);
        }
        assert_eq!(
            reason_for(&schema, json!(4)).as_deref(),
            Some(r#"f value "4" expected to be one of [1 (MALICIOUS), 2 (CLEAN), 3 (UNKNOWN)]"#)
        );
        assert_eq!(
            reason_for(&schema, json!(0)).as_deref(),
            Some(r#"f value "0" expected to be one of [1 (MALICIOUS), 2 (CLEAN), 3 (UNKNOWN)]"#)
        );
        assert_eq!(
            reason_for(&schema, json!(2.5)).as_deref(),
            Some(r#"f value "2.5" is not an integer"#)
        );
        assert_eq!(
            reason_for(&schema, json!("two")).as_deref(),
            Some(r#"f value "two" is not an integer"#)
        );
    }

    #[test]
    fn test_unlabelled_integer_values() {
        let schema = single(FieldRule::new(Constraint::EnumeratedInt {
            min: None,
            max: None,
            values: Some(BTreeMap::from([(5, None), (1, Some("ONE".to_string()))])),
        }));
        assert_eq!(
            reason_for(&schema, json!(2)).as_deref(),
            Some(r#"f value "2" expected to be one of [1 (ONE), 5]"#)
        );
    }

    #[test]
    fn test_integer_bounds() {
        let schema = single(FieldRule::integer(Some(-10), Some(10)));
        assert_eq!(reason_for(&schema, json!(-10)), None);
        assert_eq!(reason_for(&schema, json!(10)), None);
        assert!(reason_for(&schema, json!(-11)).unwrap().ends_with("must be at least -10"));
        assert!(reason_for(&schema, json!(11)).unwrap().ends_with("must be at most 10"));
    }

    #[test]
    fn test_text_rules() {
        let schema = single(FieldRule::text(Some(2), Some(4)));
        assert_eq!(reason_for(&schema, json!("abcd")), None);
        assert_eq!(reason_for(&schema, json!("éé")), None);
        assert_eq!(
            reason_for(&schema, json!("a")).as_deref(),
            Some(r#"f value "a" must be at least 2 characters long"#)
        );
        assert_eq!(
            reason_for(&schema, json!("abcde")).as_deref(),
            Some(r#"f value "abcde" must be at most 4 characters long"#)
        );
        assert_eq!(
            reason_for(&schema, json!(["a", "b"])).as_deref(),
            Some(r#"f value "["a","b"]" must be a string"#)
        );

        let schema = single(FieldRule::text_values(["a", "b", "c"]));
        assert_eq!(reason_for(&schema, json!("b")), None);
        assert_eq!(
            reason_for(&schema, json!("d")).as_deref(),
            Some(r#"f value "d" expected to be one of [a, b, c]"#)
        );
    }

    #[test]
    fn test_empty_name_rejected_by_default_schema() {
        let schema = default_log_schema().unwrap();
        let mut fields = record(valid_log_record());
        fields.insert("nm".into(), json!(""));
        assert_eq!(
            schema.validate_record(&fields).reason().as_deref(),
            Some(r#"nm (file name) value "" must be at least 1 characters long"#)
        );
    }

    #[test]
    fn test_timestamp_encodings() {
        let schema = single(FieldRule::timestamp(Some(0), None));
        assert_eq!(reason_for(&schema, json!(1558518530)), None);
        assert_eq!(reason_for(&schema, json!("1558518530")), None);
        assert_eq!(reason_for(&schema, json!("2019-05-22 10:30:23")), None);
        assert_eq!(
            reason_for(&schema, json!("May 22 2019")).as_deref(),
            Some(r#"f value "May 22 2019" is not epoch seconds or a "YYYY-MM-DD HH:MM:SS" timestamp"#)
        );
        assert!(reason_for(&schema, json!("2019-05-22T10:30:23")).is_some());
        assert!(reason_for(&schema, json!(" 2019-05-22 10:30:23 ")).is_some());
    }

    #[test]
    fn test_timestamp_bounds() {
        let schema = single(FieldRule::timestamp(Some(1000), Some(1558521023)));
        assert_eq!(reason_for(&schema, json!(1000)), None);
        assert_eq!(reason_for(&schema, json!("2019-05-22 10:30:23")), None);
        assert_eq!(
            reason_for(&schema, json!(999)).as_deref(),
            Some(r#"f value "999" must be at or after 1970-01-01 00:16:40"#)
        );
        assert_eq!(
            reason_for(&schema, json!("2019-05-22 10:30:24")).as_deref(),
            Some(r#"f value "2019-05-22 10:30:24" must be at or before 2019-05-22 10:30:23"#)
        );
    }

    #[test]
    fn test_rejection_carries_full_name() {
        let schema = default_log_schema().unwrap();
        let mut fields = record(valid_log_record());
        fields.insert("dp".into(), json!(7));

        let Some(Rejection::Field {
            full_name, violation, ..
        }) = schema.validate_record(&fields).into_rejection()
        else {
            panic!("expected field rejection");
        };
        assert_eq!(full_name.as_deref(), Some("Disposition"));
        assert!(matches!(violation, FieldViolation::NotAllowed { .. }));
    }

    #[test]
    fn test_rejection_sentence_names_full_name() {
        let schema = default_log_schema().unwrap();
        let mut fields = record(valid_log_record());
        fields.insert("si".into(), json!("not-a-uuid"));
        assert_eq!(
            schema.validate_record(&fields).reason().as_deref(),
            Some(r#"si (Session ID) value "not-a-uuid" does not match expected pattern"#)
        );

        fields = record(valid_log_record());
        fields.insert("dp".into(), json!(7));
        assert_eq!(
            schema.validate_record(&fields).reason().as_deref(),
            Some(
                r#"dp (Disposition) value "7" expected to be one of [1 (MALICIOUS), 2 (CLEAN), 3 (UNKNOWN)]"#
            )
        );
    }

    #[test]
    fn test_malformed_rejection_display() {
        let rejection = Rejection::Malformed {
            message: "expected value at line 1 column 1".into(),
        };
        assert_eq!(
            rejection.to_string(),
            "malformed record: expected value at line 1 column 1"
        );
        assert_eq!(rejection.field(), None);
    }
}
