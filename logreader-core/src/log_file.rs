//! Log file access.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::Utf8Error;

use crate::error::{LogReaderError, Result};
use crate::record::file_extension;

/// One line of a log file, or the reason it could not be decoded.
pub type LogLine = std::result::Result<String, Utf8Error>;

/// A log file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    /// Wraps a path; nothing is read until asked.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, if it is valid UTF-8
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    /// Lowercased extension of the file name, empty if none
    pub fn extension(&self) -> String {
        self.file_name().map(file_extension).unwrap_or_default()
    }

    /// Size in bytes.
    ///
    /// # Errors
    /// Returns an I/O error if the file metadata cannot be read.
    pub fn size(&self) -> Result<u64> {
        fs::metadata(&self.path)
            .map(|metadata| metadata.len())
            .map_err(|e| self.io_error("Failed to stat", e))
    }

    /// Reads the whole file as lines, without `\n` or `\r\n` terminators.
    ///
    /// Each line is decoded on its own, so a line that is not UTF-8 comes
    /// back as an `Err` entry and the remaining lines are still returned.
    ///
    /// # Errors
    /// Returns an I/O error if the file is missing or unreadable.
    pub fn read_lines(&self) -> Result<Vec<LogLine>> {
        let content =
            fs::read(&self.path).map_err(|e| self.io_error("Failed to read log file", e))?;
        let lines = split_lines(&content);
        tracing::debug!("Read {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }

    fn io_error(&self, action: &str, source: std::io::Error) -> LogReaderError {
        LogReaderError::io(format!("{} '{}'", action, self.path.display()), source)
    }
}

/// Splits raw bytes into lines and decodes each one.
///
/// A trailing terminator does not produce an empty last line.
fn split_lines(content: &[u8]) -> Vec<LogLine> {
    if content.is_empty() {
        return Vec::new();
    }
    let content = content.strip_suffix(b"\n").unwrap_or(content);
    content
        .split(|byte| *byte == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            std::str::from_utf8(line).map(str::to_string)
        })
        .collect()
}
