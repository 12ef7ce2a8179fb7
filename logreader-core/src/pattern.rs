//! Prefix-anchored regular expression matching for `pattern` fields.
//!
//! A pattern only has to match starting at the first character of the
//! candidate. Whatever follows the matched span is ignored, so `^abc`
//! matches `abcXYZ` and a UUID pattern matches a UUID with a suffix.

use regex::Regex;

use crate::error::{LogReaderError, Result};

/// A compiled field pattern.
///
/// Compilation happens once, when the schema is built; an invalid pattern
/// is reported then and never while validating records.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    source: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Compiles `pattern` with matching anchored at the start of the candidate.
    ///
    /// # Errors
    /// Returns [`LogReaderError::InvalidPattern`] if `pattern` is not a valid
    /// regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{})", pattern);
        let regex = Regex::new(&anchored)
            .map_err(|e| LogReaderError::invalid_pattern(pattern, e))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns true if the pattern matches at position 0 of `candidate`.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The pattern as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for PatternMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// One-shot form of [`PatternMatcher::matches`].
///
/// # Errors
/// Returns [`LogReaderError::InvalidPattern`] if `pattern` does not compile.
pub fn matches(pattern: &str, candidate: &str) -> Result<bool> {
    Ok(PatternMatcher::new(pattern)?.matches(candidate))
}
