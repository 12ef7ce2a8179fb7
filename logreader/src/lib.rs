//! Library module for the logreader binary.
//!
//! Exposes the CLI definition and the report pipeline so both can be tested
//! without spawning a process. The binary itself lives in main.rs.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, ValueEnum};
use logreader_core::{
    AggregateReport, AnalyzerConfig, DEFAULT_FILENAME_FIELD, LogAnalyzer, MalformedLinePolicy,
    Schema, ValidationRun, default_log_schema,
};

/// CLI argument structure
#[derive(Parser, Debug)]
#[command(name = "logreader")]
#[command(about = "Validate JSON log records and count file types")]
#[command(version)]
#[command(long_about = "
logreader - Schema-driven log file validation

Reads a log file with one JSON object per line, validates every record
against a field schema and prints how many valid records refer to each
file extension.

EXAMPLES:
  logreader -l scan.log
  logreader -l scan.log --schema fields.json --format json
  logreader -l scan.log --strict --show-rejections
")]
pub struct Cli {
    /// Verbosity flags
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Log file to analyze
    #[arg(short, long, value_name = "FILE", help = "The path to the log file")]
    pub logfile: PathBuf,

    /// Schema file replacing the default schema
    #[arg(short, long, value_name = "FILE", conflicts_with = "no_schema")]
    pub schema: Option<PathBuf>,

    /// Accept every well-formed record
    #[arg(long, help = "Skip validation and accept every well-formed record")]
    pub no_schema: bool,

    /// Abort on the first malformed line
    #[arg(long, help = "Fail on the first line that is not a JSON object")]
    pub strict: bool,

    /// Field holding the file name
    #[arg(long, value_name = "FIELD", default_value = DEFAULT_FILENAME_FIELD)]
    pub filename_field: String,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List rejected lines after the report
    #[arg(long, help = "List each rejected line and the reason it failed")]
    pub show_rejections: bool,
}

/// Flags shared by every invocation
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    pub quiet: bool,
}

/// Available report formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Console table
    Text,
    /// JSON structured output
    Json,
}

impl Cli {
    /// Maps the flags onto an analyzer configuration.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let policy = if self.strict {
            MalformedLinePolicy::Abort
        } else {
            MalformedLinePolicy::Reject
        };
        AnalyzerConfig::new()
            .with_filename_field(self.filename_field.clone())
            .with_malformed_lines(policy)
            .with_log_rejections(!self.show_rejections)
    }

    /// Resolves the schema the flags ask for.
    ///
    /// # Errors
    /// Returns an error if the schema file cannot be read or is invalid.
    pub fn load_schema(&self) -> anyhow::Result<Option<Schema>> {
        if self.no_schema {
            return Ok(None);
        }
        let schema = match &self.schema {
            Some(path) => Schema::from_path(path)
                .with_context(|| format!("Failed to load schema {}", path.display()))?,
            None => default_log_schema()?,
        };
        Ok(Some(schema))
    }
}

/// Validates the log file named by `cli` and writes the report to `out`.
///
/// # Errors
/// Returns an error for unreadable inputs, invalid schemas, malformed lines
/// in strict mode, and failed writes.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = cli.analyzer_config();
    tracing::debug!("Analyzer configuration: {:?}", config);
    let analyzer = LogAnalyzer::new(cli.load_schema()?, config)?;
    let validation = analyzer
        .read_and_validate(&cli.logfile)
        .with_context(|| format!("Failed to analyze {}", cli.logfile.display()))?;

    let report =
        AggregateReport::new(&validation).with_source(cli.logfile.display().to_string());

    match cli.format {
        OutputFormat::Text => write_text(out, &report, &validation, cli.show_rejections)?,
        OutputFormat::Json => write_json(out, &report, &validation, cli.show_rejections)?,
    }
    Ok(())
}

fn write_text(
    out: &mut impl Write,
    report: &AggregateReport,
    validation: &ValidationRun,
    show_rejections: bool,
) -> anyhow::Result<()> {
    writeln!(out, "{}", report)?;
    if show_rejections && !validation.rejections().is_empty() {
        writeln!(out)?;
        writeln!(out, "Rejected lines:")?;
        for rejection in validation.rejections() {
            writeln!(out, "  {}", rejection)?;
        }
    }
    Ok(())
}

fn write_json(
    out: &mut impl Write,
    report: &AggregateReport,
    validation: &ValidationRun,
    show_rejections: bool,
) -> anyhow::Result<()> {
    if show_rejections {
        let mut value = serde_json::to_value(report)?;
        value["rejections"] = serde_json::to_value(validation.rejections())?;
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        writeln!(out, "{}", report.to_json()?)?;
    }
    Ok(())
}
