//! Core type system and error handling for Bookferry
//!
//! This crate provides the foundational types shared across the Bookferry
//! workspace:
//!
//! - **Error handling**: the workspace-wide [`Error`] enum and [`Result`] alias
//! - **Book types**: the [`BookType`] discriminator for ebook and audio sets
//! - **Transfer results**: per-item [`TransferOutcome`] and batch-level
//!   [`TransferSummary`] counters
//! - **Suffix helpers**: filename suffix matching used by scanning, routing
//!   and statistics
//!
//! # Examples
//!
//! ```rust
//! use bookferry_types::{BookType, TransferSummary};
//!
//! let mut summary = TransferSummary::new();
//! summary.processed = 3;
//! summary.ingested = 1;
//! assert_eq!(BookType::Ebook.as_str(), "ebook");
//! assert_eq!(summary.processed, 3);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod suffix;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use suffix::{has_suffix, matches_any_format, matches_any_suffix};
pub use types::{BookType, TransferOutcome, TransferSummary};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_creation() {
        let summary = TransferSummary::new();
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_summary_merge() {
        let mut a = TransferSummary::new();
        a.processed = 5;
        a.ingested = 2;
        a.failed = 1;

        let mut b = TransferSummary::new();
        b.processed = 3;
        b.updated = 2;
        b.skipped = 1;

        a.merge(&b);
        assert_eq!(a.processed, 8);
        assert_eq!(a.ingested, 2);
        assert_eq!(a.updated, 2);
        assert_eq!(a.skipped, 1);
        assert_eq!(a.failed, 1);
    }

    #[test]
    fn test_error_kind() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ErrorKind::Io);

        let meta = Error::metadata("book.meta.json", "not a JSON document");
        assert_eq!(meta.kind(), ErrorKind::Metadata);
        assert!(!meta.is_recoverable());
    }
}
