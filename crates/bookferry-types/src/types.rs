//! Shared data types for transfer operations

use serde::{Deserialize, Serialize};

/// The kind of book an item directory holds
///
/// The book type selects which content-format list applies and which
/// destination roots receive the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookType {
    /// Electronic book (pdf, epub, ...)
    Ebook,
    /// Audio book (mp3, wav, ...)
    Audio,
}

impl BookType {
    /// Short lowercase name, used in logs and destination selection
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ebook => "ebook",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for BookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of processing a single item directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The item was ingested into the permanent destination
    Ingested,
    /// New or changed files were propagated; carries the file count
    Updated(u64),
    /// The item was already ingested and nothing has changed since
    UpToDate,
    /// The item is not yet ready for ingest, or was not an item directory
    Skipped,
}

/// Batch-level counters reported after a transfer run
///
/// A batch never aborts on the first error; failed items are counted here
/// and logged, and the remaining items are still processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSummary {
    /// Item directories examined
    pub processed: u64,
    /// Items ingested for the first time
    pub ingested: u64,
    /// Items that had files propagated by an update pass
    pub updated: u64,
    /// Items skipped (not ready, or already up to date)
    pub skipped: u64,
    /// Items that failed with an error
    pub failed: u64,
}

impl TransferSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &Self) {
        self.processed += other.processed;
        self.ingested += other.ingested;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Record one item outcome
    pub fn record(&mut self, outcome: TransferOutcome) {
        self.processed += 1;
        match outcome {
            TransferOutcome::Ingested => self.ingested += 1,
            TransferOutcome::Updated(_) => self.updated += 1,
            TransferOutcome::UpToDate | TransferOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Record one failed item
    pub fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_type_display() {
        assert_eq!(BookType::Ebook.to_string(), "ebook");
        assert_eq!(BookType::Audio.to_string(), "audio");
    }

    #[test]
    fn test_record_outcomes() {
        let mut summary = TransferSummary::new();
        summary.record(TransferOutcome::Ingested);
        summary.record(TransferOutcome::Updated(3));
        summary.record(TransferOutcome::UpToDate);
        summary.record(TransferOutcome::Skipped);
        summary.record_failure();

        assert_eq!(summary.processed, 5);
        assert_eq!(summary.ingested, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 1);
    }
}
