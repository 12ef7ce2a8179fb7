//! Aggregate report rendering.
//!
//! The [`Display`](fmt::Display) form is a console table of extension counts
//! with a total row, followed by the run summary. [`AggregateReport::to_json`]
//! renders the same data for machines.

use std::fmt;

use serde::Serialize;

use crate::aggregate::ExtensionCounts;
use crate::error::{LogReaderError, Result};
use crate::processor::ValidationRun;

/// Label used for records whose file name has no extension.
const NO_EXTENSION: &str = "(none)";

/// Headline numbers of a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Non-blank lines looked at
    pub considered: usize,
    /// Records that passed validation
    pub accepted: usize,
    /// Lines that failed
    pub rejected: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Considered {} records: {} accepted, {} rejected",
            self.considered, self.accepted, self.rejected
        )
    }
}

/// Extension counts of a run together with its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    /// Log file the run read, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Headline numbers
    pub summary: RunSummary,
    /// Accepted records per extension
    pub extensions: ExtensionCounts,
}

impl AggregateReport {
    /// Builds the report for a run.
    pub fn new(run: &ValidationRun) -> Self {
        Self {
            source: None,
            summary: run.summary(),
            extensions: run.extension_counts(),
        }
    }

    /// Builder method to name the source file.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// Returns a serialization error if the report cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LogReaderError::serialization("Failed to encode report", e))
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const EXTENSION_HEADER: &str = "Extension";
        const COUNT_HEADER: &str = "Count";
        const TOTAL_LABEL: &str = "Total";

        let label_width = self
            .extensions
            .iter()
            .map(|(extension, _)| display_extension(extension).chars().count())
            .chain([EXTENSION_HEADER.len(), TOTAL_LABEL.len()])
            .max()
            .unwrap_or(EXTENSION_HEADER.len());
        let count_width = COUNT_HEADER
            .len()
            .max(self.extensions.total().to_string().len());
        let rule = format!("{} {}", "-".repeat(label_width), "-".repeat(count_width));

        if let Some(source) = &self.source {
            writeln!(f, "File types in {}", source)?;
            writeln!(f)?;
        }
        writeln!(
            f,
            "{:<label_width$} {:>count_width$}",
            EXTENSION_HEADER, COUNT_HEADER
        )?;
        writeln!(f, "{}", rule)?;
        for (extension, count) in self.extensions.iter() {
            writeln!(
                f,
                "{:<label_width$} {:>count_width$}",
                display_extension(extension),
                count
            )?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<label_width$} {:>count_width$}",
            TOTAL_LABEL,
            self.extensions.total()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.summary)
    }
}

fn display_extension(extension: &str) -> &str {
    if extension.is_empty() {
        NO_EXTENSION
    } else {
        extension
    }
}
