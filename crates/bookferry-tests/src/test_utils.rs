//! Shared fixtures for Bookferry integration tests

use bookferry_config::Config;
use bookferry_registry::REGISTRY_FILE_NAME;
use chrono::Utc;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build a configuration whose source and destination roots all live under
/// one temporary directory
pub fn temp_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.ebook_source_dir = root.join("source/ebook");
    config.audio_source_dir = root.join("source/audio");
    config.transfer.ebook_ingest_dir = root.join("ingest/ebook");
    config.transfer.audio_ingest_dir = root.join("ingest/audio");
    config.transfer.update_ebook_content_dir = root.join("update/ebook/content");
    config.transfer.update_audio_content_dir = root.join("update/audio/content");
    config.transfer.update_ebook_metadata_dir = root.join("update/ebook/metadata");
    config.transfer.update_audio_metadata_dir = root.join("update/audio/metadata");
    fs::create_dir_all(&config.ebook_source_dir).unwrap();
    fs::create_dir_all(&config.audio_source_dir).unwrap();
    config
}

/// Builder for an item directory under a source root
pub struct ItemBuilder {
    dir: PathBuf,
}

impl ItemBuilder {
    /// Create the item directory under the given source root
    pub fn new(source_root: &Path, id: &str) -> Self {
        let dir = source_root.join(id);
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    /// Path of the item directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a file into the item directory
    pub fn file(self, name: &str, content: &[u8]) -> Self {
        fs::write(self.dir.join(name), content).unwrap();
        self
    }

    /// Write a metadata document with a publication date
    pub fn metadata(self, name: &str, publication_date: &str) -> Self {
        let doc = format!(r#"{{"publication_date": "{publication_date}"}}"#);
        fs::write(self.dir.join(name), doc).unwrap();
        self
    }

    /// Write a legacy registry document carrying only an ingest date
    pub fn legacy_registry(self, ingest_date: &str) -> Self {
        let doc = format!(r#"{{"ingest_date": "{ingest_date}"}}"#);
        fs::write(self.dir.join(REGISTRY_FILE_NAME), doc).unwrap();
        self
    }

    /// Shift the modification time of one of the item's files, in seconds
    /// relative to now
    pub fn mtime(self, name: &str, seconds_from_now: i64) -> Self {
        let target = FileTime::from_unix_time(Utc::now().timestamp() + seconds_from_now, 0);
        filetime::set_file_mtime(self.dir.join(name), target).unwrap();
        self
    }

    /// Finish building and return the item directory path
    pub fn build(self) -> PathBuf {
        self.dir
    }
}

/// Create a temporary root directory for one test
pub fn temp_root() -> TempDir {
    TempDir::new().unwrap()
}
