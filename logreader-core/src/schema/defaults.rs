//! The built-in schema for file-scan log records.
//!
//! Each record describes one scanned file:
//! `ts` timestamp, `pt` processing time, `si`/`uu`/`bg` session, user and
//! business UUIDs, `sha` sha256 of the file, `nm` file name, `ph` path, and
//! `dp` disposition.

use super::{FieldRule, Schema};
use crate::error::Result;

/// Eight-four-four-four-twelve hex groups, either case.
pub const UUID_PATTERN: &str =
    "^([0-9a-fA-F]{8})-([0-9a-fA-F]{4})-([0-9a-fA-F]{4})-([0-9a-fA-F]{4})-([0-9a-fA-F]{12})";

/// Sixty-four hex characters.
pub const SHA256_PATTERN: &str = "^([0-9a-fA-F]{64})";

/// One or more `/segment` groups of word characters or dots.
pub const PATH_PATTERN: &str = r"^(/[\w.]+)+";

/// Disposition codes accepted in `dp`.
pub const DISPOSITION_VALUES: [(i64, &str); 3] = [(1, "MALICIOUS"), (2, "CLEAN"), (3, "UNKNOWN")];

/// Builds the default nine-field log schema.
///
/// # Errors
/// Only fails if one of the built-in patterns does not compile.
pub fn default_log_schema() -> Result<Schema> {
    Schema::builder()
        .field("ts", FieldRule::timestamp(Some(0), None).with_full_name("timestamp"))
        .field(
            "pt",
            FieldRule::number(Some(0.0), None).with_full_name("processing time"),
        )
        .field("si", FieldRule::pattern(UUID_PATTERN)?.with_full_name("Session ID"))
        .field("uu", FieldRule::pattern(UUID_PATTERN)?.with_full_name("User UUID"))
        .field("bg", FieldRule::pattern(UUID_PATTERN)?.with_full_name("Business UUID"))
        .field(
            "sha",
            FieldRule::pattern(SHA256_PATTERN)?.with_full_name("sha256 of the file"),
        )
        .field("nm", FieldRule::text(Some(1), None).with_full_name("file name"))
        .field("ph", FieldRule::pattern(PATH_PATTERN)?.with_full_name("Path to file"))
        .field(
            "dp",
            FieldRule::enumerated(DISPOSITION_VALUES).with_full_name("Disposition"),
        )
        .build()
}
