//! Persisted per-item transfer registry for Bookferry
//!
//! Each item directory owns exactly one registry file,
//! [`REGISTRY_FILE_NAME`], recording when the item was ingested, when it was
//! last updated, and a checksum+timestamp fingerprint for every content file
//! that has been copied to a destination.
//!
//! The on-disk document is JSON and forward compatible: a legacy registry
//! written before file-level tracking existed (ingest date only) loads as
//! "zero fingerprints", never as an error. Mutations are tracked with a
//! dirty flag; [`TransferRegistry::save`] only touches the disk when
//! something actually changed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bookferry_registry::TransferRegistry;
//! use chrono::Utc;
//!
//! # async fn example() -> bookferry_types::Result<()> {
//! let mut registry = TransferRegistry::load("books/ebook/b001").await?;
//! if registry.ingest_date().is_none() {
//!     registry.set_ingest_date(Utc::now());
//!     registry.save().await?;
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use bookferry_types::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

pub mod checksum;

pub use checksum::hash_file;

/// Name of the registry file inside each item directory
pub const REGISTRY_FILE_NAME: &str = "transfer_registry.json";

/// Fingerprint of one content file as last observed by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// BLAKE3 checksum of the file content, lowercase hex
    pub checksum: String,
    /// Last-modified timestamp of the file when it was fingerprinted
    pub modified: DateTime<Utc>,
}

/// On-disk registry document
///
/// Every field carries a serde default so documents written by older
/// schemas keep loading; an absent field means "never set".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryDocument {
    /// When the item completed its one-time ingest
    #[serde(default)]
    ingest_date: Option<DateTime<Utc>>,
    /// When the item last had files propagated by an update pass
    #[serde(default)]
    update_date: Option<DateTime<Utc>>,
    /// Fingerprints keyed by file name
    #[serde(default)]
    file_entries: HashMap<String, FileEntry>,
}

/// Persisted per-item record of ingest/update history and file fingerprints
///
/// The registry is exclusively owned by its item directory. It is loaded on
/// construction and written back only through an explicit [`save`].
///
/// [`save`]: TransferRegistry::save
#[derive(Debug)]
pub struct TransferRegistry {
    registry_file: PathBuf,
    document: RegistryDocument,
    dirty: bool,
}

impl TransferRegistry {
    /// Load the registry for an item directory, or start fresh if none exists
    pub async fn load<P: AsRef<Path>>(item_dir: P) -> Result<Self> {
        let registry_file = item_dir.as_ref().join(REGISTRY_FILE_NAME);

        let document = if registry_file.exists() {
            let data = fs::read(&registry_file).await.map_err(|e| Error::Io {
                message: format!(
                    "Failed to read registry file '{}': {}",
                    registry_file.display(),
                    e
                ),
            })?;
            serde_json::from_slice(&data).map_err(|e| {
                Error::registry(format!(
                    "Failed to parse registry file '{}': {}",
                    registry_file.display(),
                    e
                ))
            })?
        } else {
            debug!(
                "No registry file at {}, starting fresh",
                registry_file.display()
            );
            RegistryDocument::default()
        };

        Ok(Self {
            registry_file,
            document,
            dirty: false,
        })
    }

    /// Write the registry back to disk if it has been mutated
    pub async fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let data = serde_json::to_vec_pretty(&self.document)
            .map_err(|e| Error::registry(format!("Failed to serialize registry: {}", e)))?;

        fs::write(&self.registry_file, data)
            .await
            .map_err(|e| Error::Io {
                message: format!(
                    "Failed to write registry file '{}': {}",
                    self.registry_file.display(),
                    e
                ),
            })?;

        self.dirty = false;
        debug!(
            "Saved registry to {} with {} file entries",
            self.registry_file.display(),
            self.document.file_entries.len()
        );
        Ok(())
    }

    /// Path of the registry file on disk
    pub fn registry_file(&self) -> &Path {
        &self.registry_file
    }

    /// The ingest timestamp, if the item has ever completed ingest
    pub fn ingest_date(&self) -> Option<DateTime<Utc>> {
        self.document.ingest_date
    }

    /// Stamp the ingest timestamp
    pub fn set_ingest_date(&mut self, date: DateTime<Utc>) {
        self.document.ingest_date = Some(date);
        self.dirty = true;
    }

    /// The latest update timestamp, if any update pass has run
    pub fn update_date(&self) -> Option<DateTime<Utc>> {
        self.document.update_date
    }

    /// Stamp the latest update timestamp
    pub fn set_update_date(&mut self, date: DateTime<Utc>) {
        self.document.update_date = Some(date);
        self.dirty = true;
    }

    /// Reference timestamp for change detection: the latest update date,
    /// falling back to the ingest date
    pub fn latest_update_date(&self) -> Option<DateTime<Utc>> {
        self.document.update_date.or(self.document.ingest_date)
    }

    /// Whether the registry holds a fingerprint for this file
    pub fn has_file_entry<P: AsRef<Path>>(&self, file: P) -> bool {
        match entry_key(file.as_ref()) {
            Some(key) => self.document.file_entries.contains_key(&key),
            None => false,
        }
    }

    /// Verify a file against its stored fingerprint
    ///
    /// Recomputes the file's checksum and compares it with the stored entry.
    /// Returns `false` when no entry exists or the checksums differ.
    pub async fn verify_file<P: AsRef<Path>>(&self, file: P) -> Result<bool> {
        let file = file.as_ref();
        let Some(key) = entry_key(file) else {
            return Ok(false);
        };
        let Some(entry) = self.document.file_entries.get(&key) else {
            return Ok(false);
        };

        let current = checksum::hash_file(file).await?;
        Ok(current == entry.checksum)
    }

    /// Upsert the fingerprint for one file from its current on-disk state
    pub async fn set_checksum_and_date<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let Some(key) = entry_key(file) else {
            warn!("Cannot fingerprint a path without a file name: {}", file.display());
            return Ok(());
        };

        let checksum = checksum::hash_file(file).await?;
        let metadata = fs::metadata(file).await.map_err(|e| Error::Io {
            message: format!("Failed to read metadata for '{}': {}", file.display(), e),
        })?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        self.document
            .file_entries
            .insert(key, FileEntry { checksum, modified });
        self.dirty = true;
        Ok(())
    }

    /// Batch upsert fingerprints for a set of files
    pub async fn update_file_entries<P: AsRef<Path>>(&mut self, files: &[P]) -> Result<()> {
        for file in files {
            self.set_checksum_and_date(file).await?;
        }
        Ok(())
    }

    /// Number of fingerprinted files
    pub fn file_entry_count(&self) -> usize {
        self.document.file_entries.len()
    }
}

/// Registry entries are keyed by file name, not full path, since the
/// registry lives inside the directory it describes.
fn entry_key(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
