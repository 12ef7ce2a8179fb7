//! Fatal error types for logreader operations.
//!
//! These errors mean the schema, configuration, or environment is broken.
//! A record that merely fails its schema is never an error here: it is a
//! [`Rejection`](crate::validator::Rejection) carried by a
//! [`ValidationOutcome`](crate::validator::ValidationOutcome).

use thiserror::Error;

/// Main error type for logreader operations.
#[derive(Debug, Error)]
pub enum LogReaderError {
    /// Schema or analyzer configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A field pattern is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed as a record and the run was configured to abort
    #[error("Malformed record on line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with `LogReaderError`
pub type Result<T> = std::result::Result<T, LogReaderError>;

impl LogReaderError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a configuration error scoped to one schema field
    pub fn field_configuration(field: &str, message: impl std::fmt::Display) -> Self {
        Self::Configuration {
            message: format!("field '{}': {}", field, message),
        }
    }

    /// Creates an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a malformed record error for a 1-based line number
    pub fn malformed_record(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            message: message.into(),
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Returns true for errors caused by a bad schema or configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::InvalidPattern { .. }
        )
    }
}
