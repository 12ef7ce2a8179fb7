//! Analyzer configuration.
//!
//! Controls which field supplies the file name and how lines that are not
//! JSON objects are treated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field used to derive the file extension unless configured otherwise.
pub const DEFAULT_FILENAME_FIELD: &str = "nm";

/// What to do with a line that cannot be parsed as a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Count the line as rejected and keep going
    #[default]
    Reject,
    /// Fail the whole run on the first malformed line
    Abort,
}

/// Record stream processing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Field holding the file name of each record
    pub filename_field: String,
    /// Handling of unparseable lines
    pub malformed_lines: MalformedLinePolicy,
    /// Emit a warning for each rejected line
    pub log_rejections: bool,
}

/// Validation errors for analyzer configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("filename_field must not be empty")]
    EmptyFilenameField,
    #[error("filename_field '{0}' is not declared by the schema")]
    UnknownFilenameField(String),
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            filename_field: DEFAULT_FILENAME_FIELD.to_string(),
            malformed_lines: MalformedLinePolicy::default(),
            log_rejections: true,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new analyzer config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the filename field.
    pub fn with_filename_field(mut self, field: impl Into<String>) -> Self {
        self.filename_field = field.into();
        self
    }

    /// Builder method to set the malformed-line policy.
    pub fn with_malformed_lines(mut self, policy: MalformedLinePolicy) -> Self {
        self.malformed_lines = policy;
        self
    }

    /// Builder method to enable/disable per-line rejection warnings.
    pub fn with_log_rejections(mut self, enabled: bool) -> Self {
        self.log_rejections = enabled;
        self
    }

    /// Validates the configuration on its own.
    ///
    /// Whether the filename field exists in a schema is checked by the
    /// analyzer, which knows the schema.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.filename_field.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFilenameField);
        }
        Ok(())
    }
}
