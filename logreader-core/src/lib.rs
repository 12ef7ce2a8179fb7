//! Schema-driven validation of JSON log records.
//!
//! This crate reads log files holding one JSON object per line, checks each
//! record against a per-field [`Schema`], and counts the accepted records by
//! the extension of their file name field.
//!
//! # Guarantees
//! - Lines are parsed as data only, never evaluated
//! - A record failing its schema is a [`Rejection`], never an error
//! - Schemas are validated when built and immutable afterwards
//!
//! # Example
//! ```rust,no_run
//! use logreader_core::{AggregateReport, LogAnalyzer};
//! use std::path::Path;
//!
//! # fn example() -> logreader_core::Result<()> {
//! let analyzer = LogAnalyzer::with_default_schema()?;
//! let run = analyzer.read_and_validate(Path::new("scan.log"))?;
//! println!("{}", AggregateReport::new(&run));
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod log_file;
pub mod logging;
pub mod pattern;
pub mod processor;
pub mod record;
pub mod report;
pub mod schema;
pub mod timestamp;
pub mod validator;

// Re-export commonly used types
pub use aggregate::ExtensionCounts;
pub use config::{
    AnalyzerConfig, ConfigValidationError, DEFAULT_FILENAME_FIELD, MalformedLinePolicy,
};
pub use error::{LogReaderError, Result};
pub use log_file::LogFile;
pub use logging::init_logging;
pub use pattern::PatternMatcher;
pub use processor::{LineRejection, LogAnalyzer, ValidationRun};
pub use record::{AcceptedRecord, RawRecord};
pub use report::{AggregateReport, RunSummary};
pub use schema::{Constraint, FieldRule, FieldType, Schema, default_log_schema};
pub use validator::{FieldViolation, Rejection, ValidationOutcome, validate};
