//! Raw and accepted log records.
//!
//! Each input line holds one JSON object. Lines are parsed as data only.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// One parsed input line: field name to untyped value.
pub type RawRecord = Map<String, Value>;

/// Why a line could not be turned into a [`RawRecord`].
#[derive(Debug, Error)]
pub enum RecordParseError {
    /// The line is not valid JSON
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    /// The line is valid JSON but not an object
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Parses one line into a record.
///
/// # Errors
/// Returns [`RecordParseError`] if the line is not a JSON object.
pub fn parse_record(line: &str) -> Result<RawRecord, RecordParseError> {
    match serde_json::from_str::<Value>(line)? {
        Value::Object(fields) => Ok(fields),
        Value::Array(_) => Err(RecordParseError::NotAnObject("an array")),
        Value::String(_) => Err(RecordParseError::NotAnObject("a string")),
        Value::Number(_) => Err(RecordParseError::NotAnObject("a number")),
        Value::Bool(_) => Err(RecordParseError::NotAnObject("a boolean")),
        Value::Null => Err(RecordParseError::NotAnObject("null")),
    }
}

/// Lowercased text after the last `.` of a file name.
///
/// Returns an empty string when the name has no dot.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
        .unwrap_or_default()
}

/// A record that passed validation, with its derived extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedRecord {
    /// 1-based line number in the source file
    pub line: usize,
    /// Parsed field values
    pub fields: RawRecord,
    /// Lowercased extension of the filename field
    pub extension: String,
}

impl AcceptedRecord {
    /// Wraps an accepted record, deriving the extension from `filename_field`.
    ///
    /// A missing or non-string filename field yields an empty extension.
    pub fn new(line: usize, fields: RawRecord, filename_field: &str) -> Self {
        let extension = fields
            .get(filename_field)
            .and_then(Value::as_str)
            .map(file_extension)
            .unwrap_or_default();
        Self {
            line,
            fields,
            extension,
        }
    }

    /// Returns the raw value of a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}
