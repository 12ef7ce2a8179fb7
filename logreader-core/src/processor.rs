//! Record stream processing.
//!
//! [`LogAnalyzer`] reads a log file, validates each non-blank line against
//! its schema and collects the outcome in a [`ValidationRun`]. A failing line
//! is recorded and skipped; only I/O failures, and malformed lines under
//! [`MalformedLinePolicy::Abort`], end a run early.
//!
//! # Example
//!
//! ```rust,no_run
//! use logreader_core::LogAnalyzer;
//! use std::path::Path;
//!
//! # fn example() -> logreader_core::Result<()> {
//! let analyzer = LogAnalyzer::with_default_schema()?;
//! let run = analyzer.read_and_validate(Path::new("scan.log"))?;
//!
//! println!("{} valid records", run.accepted_count());
//! for (extension, count) in run.extension_counts().iter() {
//!     println!("{extension}: {count}");
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::Utf8Error;
use std::path::Path;

use serde::Serialize;

use crate::aggregate::ExtensionCounts;
use crate::config::{AnalyzerConfig, ConfigValidationError, MalformedLinePolicy};
use crate::error::{LogReaderError, Result};
use crate::log_file::LogFile;
use crate::record::{AcceptedRecord, parse_record};
use crate::report::RunSummary;
use crate::schema::{Schema, default_log_schema};
use crate::validator::{Rejection, validate};

/// A rejected line and the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRejection {
    /// 1-based line number
    pub line: usize,
    /// First failure found on the line
    pub rejection: Rejection,
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} has failed with {}", self.line, self.rejection)
    }
}

/// Result of validating one log file.
///
/// Each run starts empty; runs are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationRun {
    accepted: Vec<AcceptedRecord>,
    rejections: Vec<LineRejection>,
}

impl ValidationRun {
    /// Accepted records in line order
    pub fn accepted(&self) -> &[AcceptedRecord] {
        &self.accepted
    }

    /// Consumes the run, returning the accepted records
    pub fn into_accepted(self) -> Vec<AcceptedRecord> {
        self.accepted
    }

    /// Number of accepted records
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Number of rejected lines
    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }

    /// Number of non-blank lines looked at
    pub fn considered_count(&self) -> usize {
        self.accepted_count().saturating_add(self.rejected_count())
    }

    /// Rejected lines in line order
    pub fn rejections(&self) -> &[LineRejection] {
        &self.rejections
    }

    /// Counts accepted records by extension
    pub fn extension_counts(&self) -> ExtensionCounts {
        ExtensionCounts::from_records(&self.accepted)
    }

    /// Headline numbers of the run
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            considered: self.considered_count(),
            accepted: self.accepted_count(),
            rejected: self.rejected_count(),
        }
    }
}

/// Validates log files against a schema.
#[derive(Debug, Clone)]
pub struct LogAnalyzer {
    schema: Option<Schema>,
    config: AnalyzerConfig,
}

impl LogAnalyzer {
    /// Creates an analyzer. `None` accepts every well-formed record.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid or names a
    /// filename field that `schema` does not declare.
    pub fn new(schema: Option<Schema>, config: AnalyzerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| LogReaderError::configuration(e.to_string()))?;

        if let Some(schema) = &schema
            && !schema.contains(&config.filename_field)
        {
            return Err(LogReaderError::configuration(
                ConfigValidationError::UnknownFilenameField(config.filename_field).to_string(),
            ));
        }

        Ok(Self { schema, config })
    }

    /// Creates an analyzer with the default log schema and configuration.
    ///
    /// # Errors
    /// Only fails if the built-in schema cannot be built.
    pub fn with_default_schema() -> Result<Self> {
        Self::new(Some(default_log_schema()?), AnalyzerConfig::default())
    }

    /// Returns the schema, if any
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Reads `path` and validates every line.
    ///
    /// A line that is not valid UTF-8 is treated as a malformed line.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be read, or a malformed record
    /// error under [`MalformedLinePolicy::Abort`].
    pub fn read_and_validate(&self, path: &Path) -> Result<ValidationRun> {
        let log = LogFile::new(path);
        let lines = log.read_lines()?;
        if let Ok(size) = log.size() {
            tracing::debug!("Validating {} ({} bytes)", path.display(), size);
        }
        self.validate_decoded(lines)
    }

    /// Validates lines already in memory.
    ///
    /// Line numbers are 1-based positions in `lines`, blank lines included.
    ///
    /// # Errors
    /// Returns a malformed record error under [`MalformedLinePolicy::Abort`].
    pub fn validate_lines<I, S>(&self, lines: I) -> Result<ValidationRun>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.validate_decoded(lines.into_iter().map(Ok))
    }

    fn validate_decoded<I, S>(&self, lines: I) -> Result<ValidationRun>
    where
        I: IntoIterator<Item = std::result::Result<S, Utf8Error>>,
        S: AsRef<str>,
    {
        let mut run = ValidationRun::default();

        for (index, line) in lines.into_iter().enumerate() {
            let number = index.saturating_add(1);
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.malformed(&mut run, number, format!("line is not valid UTF-8: {}", e))?;
                    continue;
                }
            };
            let text = line.as_ref();
            if text.trim().is_empty() {
                continue;
            }

            let fields = match parse_record(text) {
                Ok(fields) => fields,
                Err(e) => {
                    self.malformed(&mut run, number, e.to_string())?;
                    continue;
                }
            };

            match validate(&fields, self.schema.as_ref()).into_rejection() {
                None => run.accepted.push(AcceptedRecord::new(
                    number,
                    fields,
                    &self.config.filename_field,
                )),
                Some(rejection) => self.reject(&mut run, number, rejection),
            }
        }

        tracing::info!(
            "Validated {} records: {} accepted, {} rejected",
            run.considered_count(),
            run.accepted_count(),
            run.rejected_count()
        );
        Ok(run)
    }

    /// Applies the malformed-line policy to one line.
    fn malformed(&self, run: &mut ValidationRun, line: usize, message: String) -> Result<()> {
        match self.config.malformed_lines {
            MalformedLinePolicy::Abort => Err(LogReaderError::malformed_record(line, message)),
            MalformedLinePolicy::Reject => {
                self.reject(run, line, Rejection::Malformed { message });
                Ok(())
            }
        }
    }

    fn reject(&self, run: &mut ValidationRun, line: usize, rejection: Rejection) {
        let rejected = LineRejection { line, rejection };
        if self.config.log_rejections {
            tracing::warn!("{}", rejected);
        }
        run.rejections.push(rejected);
    }
}
