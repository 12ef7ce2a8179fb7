//! CLI argument parsing and report output tests.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use clap::Parser;
use logreader::{Cli, OutputFormat, run};
use logreader_core::MalformedLinePolicy;
use tempfile::TempDir;

const VALID_LINE: &str = r#"{"ts": 1558518530, "pt": 0.5, "si": "2c1d0a7e-9b3f-4c21-8e6a-5f4d3c2b1a09", "uu": "b7e5f6a1-0c2d-4e3f-9a8b-7c6d5e4f3a21", "bg": "e1d2c3b4-a596-4877-b8c9-d0e1f2a3b4c5", "sha": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08", "nm": "report.PDF", "ph": "/srv/uploads/report.PDF", "dp": 2}"#;
const INVALID_LINE: &str = r#"{"ts": 1558518530, "pt": 0.5, "si": "2c1d0a7e-9b3f-4c21-8e6a-5f4d3c2b1a09", "uu": "b7e5f6a1-0c2d-4e3f-9a8b-7c6d5e4f3a21", "bg": "e1d2c3b4-a596-4877-b8c9-d0e1f2a3b4c5", "sha": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08", "nm": "setup.exe", "ph": "/srv/uploads/setup.exe", "dp": 7}"#;

fn write_log(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("scan.log");
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn run_to_string(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args)?;
    let mut out = Vec::new();
    run(&cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["logreader", "-l", "scan.log"]).unwrap();

    assert_eq!(cli.logfile, Path::new("scan.log"));
    assert_eq!(cli.schema, None);
    assert!(!cli.no_schema);
    assert!(!cli.strict);
    assert_eq!(cli.filename_field, "nm");
    assert_eq!(cli.format, OutputFormat::Text);
    assert_eq!(cli.global.verbose, 0);
    assert!(!cli.global.quiet);

    let config = cli.analyzer_config();
    assert_eq!(config.malformed_lines, MalformedLinePolicy::Reject);
    assert!(config.log_rejections);
}

#[test]
fn test_cli_all_flags() {
    let cli = Cli::try_parse_from([
        "logreader",
        "--logfile",
        "scan.log",
        "--schema",
        "fields.json",
        "--strict",
        "--filename-field",
        "file",
        "--format",
        "json",
        "--show-rejections",
        "-vv",
    ])
    .unwrap();

    assert_eq!(cli.schema.as_deref(), Some(Path::new("fields.json")));
    assert_eq!(cli.format, OutputFormat::Json);
    assert_eq!(cli.global.verbose, 2);

    let config = cli.analyzer_config();
    assert_eq!(config.filename_field, "file");
    assert_eq!(config.malformed_lines, MalformedLinePolicy::Abort);
    assert!(!config.log_rejections);
}

#[test]
fn test_cli_requires_logfile() {
    assert!(Cli::try_parse_from(["logreader"]).is_err());
}

#[test]
fn test_cli_schema_conflicts_with_no_schema() {
    let result = Cli::try_parse_from([
        "logreader",
        "-l",
        "scan.log",
        "--schema",
        "fields.json",
        "--no-schema",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["logreader", "-l", "scan.log", "-f", "xml"]).is_err());
}

#[test]
fn test_text_report_file() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &format!("{}\n\n{}\n{}\n", VALID_LINE, INVALID_LINE, VALID_LINE),
    );

    let output = run_to_string(&["logreader", "-l", log.as_str(), "--show-rejections"]).unwrap();

    assert!(output.contains("pdf           2"), "{}", output);
    assert!(output.contains("Considered 3 records: 2 accepted, 1 rejected"));
    assert!(output.contains(
        r#"line 3 has failed with dp (Disposition) value "7" expected to be one of [1 (MALICIOUS), 2 (CLEAN), 3 (UNKNOWN)]"#
    ));
}

#[test]
fn test_json_report_file() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(&temp_dir, &format!("{}\n{}\n", VALID_LINE, INVALID_LINE));

    let output = run_to_string(&["logreader", "-l", log.as_str(), "-f", "json", "--show-rejections"])
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["summary"]["accepted"], 1);
    assert_eq!(value["extensions"]["counts"]["pdf"], 1);
    assert_eq!(value["rejections"][0]["line"], 2);
    assert_eq!(value["rejections"][0]["rejection"]["field"], "dp");
}

#[test]
fn test_no_schema_accepts_everything() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(&temp_dir, "{\"nm\": \"a.zip\"}\n{\"x\": 1}\n");

    let output = run_to_string(&["logreader", "-l", log.as_str(), "--no-schema", "-f", "json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["summary"]["accepted"], 2);
}

#[test]
fn test_strict_mode_fails_on_malformed_line() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(&temp_dir, &format!("{}\nnot json\n", VALID_LINE));

    assert!(run_to_string(&["logreader", "-l", log.as_str()]).is_ok());
    let err = run_to_string(&["logreader", "-l", log.as_str(), "--strict"]).unwrap_err();
    assert!(format!("{:#}", err).contains("line 2"));
}

#[test]
fn test_custom_schema_file() {
    let temp_dir = TempDir::new().unwrap();
    let schema = temp_dir.path().join("fields.json");
    fs::write(&schema, r#"{"file": {"type": "text"}}"#).unwrap();
    let log = write_log(&temp_dir, "{\"file\": \"a.MD\"}\n");

    let output = run_to_string(&[
        "logreader",
        "-l",
        log.as_str(),
        "-s",
        schema.to_str().unwrap(),
        "--filename-field",
        "file",
    ])
    .unwrap();
    assert!(output.contains("md "), "{}", output);
}

#[test]
fn test_missing_logfile_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.log").display().to_string();
    assert!(run_to_string(&["logreader", "-l", missing.as_str()]).is_err());
}

#[test]
fn test_invalid_schema_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let schema = temp_dir.path().join("fields.json");
    fs::write(&schema, r#"{"file": {"type": "list"}}"#).unwrap();
    let log = write_log(&temp_dir, "{\"file\": \"a.MD\"}\n");

    let err = run_to_string(&["logreader", "-l", log.as_str(), "-s", schema.to_str().unwrap()])
        .unwrap_err();
    assert!(format!("{:#}", err).contains("unrecognized value type"));
}
