//! Counting accepted records by file extension.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::AcceptedRecord;

/// Per-extension record counts plus a grand total.
///
/// Extensions iterate in sorted order. Records without an extension are
/// counted under the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionCounts {
    counts: BTreeMap<String, u64>,
    total: u64,
}

impl ExtensionCounts {
    /// Counts `records` by extension.
    pub fn from_records(records: &[AcceptedRecord]) -> Self {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut total: u64 = 0;
        for record in records {
            let count = counts.entry(record.extension.clone()).or_default();
            *count = count.saturating_add(1);
            total = total.saturating_add(1);
        }
        Self { counts, total }
    }

    /// Count for one extension, zero if absent
    pub fn get(&self, extension: &str) -> u64 {
        self.counts.get(extension).copied().unwrap_or(0)
    }

    /// Iterates `(extension, count)` in extension order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts
            .iter()
            .map(|(extension, count)| (extension.as_str(), *count))
    }

    /// Number of records counted
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct extensions
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if nothing was counted
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
