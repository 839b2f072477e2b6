//! Item directory scanning
//!
//! An item directory is flat: its direct children are the files the transfer
//! engine classifies by suffix. The registry file is bookkeeping, not payload,
//! and is excluded from every listing.

use bookferry_registry::REGISTRY_FILE_NAME;
use bookferry_types::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

/// List the regular files directly inside an item directory
///
/// The registry file is excluded. The result is sorted by path so that
/// logging and copy order are deterministic.
pub async fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| Error::Io {
        message: format!("Failed to read directory '{}': {}", dir.display(), e),
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::Io {
        message: format!("Failed to iterate directory '{}': {}", dir.display(), e),
    })? {
        let path = entry.path();
        if entry.file_name() == REGISTRY_FILE_NAME {
            continue;
        }
        let file_type = entry.file_type().await.map_err(|e| Error::Io {
            message: format!("Failed to stat '{}': {}", path.display(), e),
        })?;
        if file_type.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Last-modified timestamp of a file
pub async fn modified_time(path: &Path) -> Result<DateTime<Utc>> {
    let metadata = fs::metadata(path).await.map_err(|e| Error::Io {
        message: format!("Failed to read metadata for '{}': {}", path.display(), e),
    })?;
    let modified = metadata.modified().map_err(|e| Error::Io {
        message: format!(
            "Failed to read modification time for '{}': {}",
            path.display(),
            e
        ),
    })?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Whether a file was modified strictly after the given instant
pub async fn modified_after(path: &Path, since: DateTime<Utc>) -> Result<bool> {
    Ok(modified_time(path).await? > since)
}
