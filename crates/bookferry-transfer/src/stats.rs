//! Source directory statistics
//!
//! Gives operators a quick census of a source root before (or instead of)
//! running a transfer: how many items there are and how many carry content
//! files, metadata documents, both or neither.

use crate::scan;
use bookferry_types::suffix::{matches_any_format, matches_any_suffix};
use bookferry_types::{Error, Result};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Counts over the item directories of one source root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStatistics {
    /// Item directories found
    pub total_items: u64,
    /// Items with at least one content file and a metadata document
    pub with_both: u64,
    /// Items with content files but no metadata document
    pub content_only: u64,
    /// Items with a metadata document but no content files
    pub metadata_only: u64,
    /// Items with neither
    pub empty: u64,
    /// Content files across all items
    pub content_files: u64,
}

impl DirectoryStatistics {
    /// Walk one source root and count its items
    ///
    /// Non-directory entries directly under the root are ignored, matching
    /// the transfer engine's view of what an item is.
    pub async fn calculate(
        base_dir: &Path,
        content_formats: &[String],
        metadata_suffixes: &[String],
    ) -> Result<Self> {
        let mut entries = fs::read_dir(base_dir).await.map_err(|e| Error::Io {
            message: format!("Failed to read directory '{}': {}", base_dir.display(), e),
        })?;

        let mut stats = Self::default();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::Io {
            message: format!(
                "Failed to iterate directory '{}': {}",
                base_dir.display(),
                e
            ),
        })? {
            let item_dir = entry.path();
            if !item_dir.is_dir() {
                continue;
            }
            stats.total_items += 1;

            let files = scan::list_files(&item_dir).await?;
            let content = files
                .iter()
                .filter(|f| matches_any_format(f, content_formats))
                .count() as u64;
            let has_metadata = files
                .iter()
                .any(|f| matches_any_suffix(f, metadata_suffixes));

            stats.content_files += content;
            match (content > 0, has_metadata) {
                (true, true) => stats.with_both += 1,
                (true, false) => stats.content_only += 1,
                (false, true) => stats.metadata_only += 1,
                (false, false) => stats.empty += 1,
            }
        }

        debug!(
            "Scanned {}: {} items, {} content files",
            base_dir.display(),
            stats.total_items,
            stats.content_files
        );
        Ok(stats)
    }
}
