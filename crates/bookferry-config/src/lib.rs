//! Configuration management for Bookferry
//!
//! This crate provides the typed configuration consumed by the transfer
//! orchestrator, with support for YAML, TOML and JSON files, sensible
//! defaults for every field, and validation.
//!
//! All fields carry serde defaults so a configuration file written for an
//! older schema keeps loading under a newer one.
//!
//! # Examples
//!
//! ```rust
//! use bookferry_config::Config;
//!
//! let config = Config::default();
//! assert!(config.transfer.retain_create_ms < 0); // disabled by default
//! assert!(config.ebook_formats.contains(&"pdf".to_string()));
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Threshold value meaning "this retention check is disabled"
pub const RETAIN_DISABLED: i64 = -1;

/// Main configuration structure for Bookferry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory holding one subdirectory per ebook item
    #[serde(default = "default_ebook_source_dir")]
    pub ebook_source_dir: PathBuf,
    /// Root directory holding one subdirectory per audio item
    #[serde(default = "default_audio_source_dir")]
    pub audio_source_dir: PathBuf,
    /// Recognized ebook content-file suffixes (without leading dot)
    #[serde(default = "default_ebook_formats")]
    pub ebook_formats: Vec<String>,
    /// Recognized audio content-file suffixes (without leading dot)
    #[serde(default = "default_audio_formats")]
    pub audio_formats: Vec<String>,
    /// Bounded per-item concurrency for the batch driver
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Transfer policy and destinations
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ebook_source_dir: default_ebook_source_dir(),
            audio_source_dir: default_audio_source_dir(),
            ebook_formats: default_ebook_formats(),
            audio_formats: default_audio_formats(),
            workers: default_workers(),
            logging: LoggingConfig::default(),
            transfer: TransferConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// Rejects values that would make a transfer run meaningless: empty
    /// destination paths, a zero worker count, or a negative-only format
    /// setup where no file could ever be classified as content.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::invalid_value(
                "workers",
                "worker count must be at least 1",
            ));
        }
        if self.ebook_formats.is_empty() && self.audio_formats.is_empty() {
            return Err(ConfigError::validation(
                "at least one content format must be configured",
            ));
        }
        for (key, path) in [
            ("transfer.ebook_ingest_dir", &self.transfer.ebook_ingest_dir),
            ("transfer.audio_ingest_dir", &self.transfer.audio_ingest_dir),
            (
                "transfer.update_ebook_content_dir",
                &self.transfer.update_ebook_content_dir,
            ),
            (
                "transfer.update_audio_content_dir",
                &self.transfer.update_audio_content_dir,
            ),
            (
                "transfer.update_ebook_metadata_dir",
                &self.transfer.update_ebook_metadata_dir,
            ),
            (
                "transfer.update_audio_metadata_dir",
                &self.transfer.update_audio_metadata_dir,
            ),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::missing_required(key));
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when no CLI flag overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Transfer policy: readiness gating, retention thresholds and destinations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Content suffixes that must all be present before an item may be
    /// ingested (without leading dot)
    #[serde(default = "default_required_formats")]
    pub required_formats: Vec<String>,
    /// Minimum age since file creation, in milliseconds; negative disables
    #[serde(default = "default_retain_disabled")]
    pub retain_create_ms: i64,
    /// Minimum age since file modification, in milliseconds; negative disables
    #[serde(default = "default_retain_disabled")]
    pub retain_modify_ms: i64,
    /// Minimum age since the publication date extracted from the metadata
    /// document, in milliseconds; negative disables
    #[serde(default = "default_retain_disabled")]
    pub retain_publication_ms: i64,
    /// Permanent destination for ingested ebook items
    #[serde(default = "default_ebook_ingest_dir")]
    pub ebook_ingest_dir: PathBuf,
    /// Permanent destination for ingested audio items
    #[serde(default = "default_audio_ingest_dir")]
    pub audio_ingest_dir: PathBuf,
    /// Destination root for updated ebook content files
    #[serde(default = "default_update_ebook_content_dir")]
    pub update_ebook_content_dir: PathBuf,
    /// Destination root for updated audio content files
    #[serde(default = "default_update_audio_content_dir")]
    pub update_audio_content_dir: PathBuf,
    /// Destination root for updated ebook metadata files
    #[serde(default = "default_update_ebook_metadata_dir")]
    pub update_ebook_metadata_dir: PathBuf,
    /// Destination root for updated audio metadata files
    #[serde(default = "default_update_audio_metadata_dir")]
    pub update_audio_metadata_dir: PathBuf,
    /// Dotted suffixes routed to the metadata update destination
    #[serde(default = "default_metadata_suffixes")]
    pub metadata_suffixes: Vec<String>,
    /// Dotted suffixes routed alongside content to the content update
    /// destination (characterization output)
    #[serde(default = "default_characterization_suffixes")]
    pub characterization_suffixes: Vec<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            required_formats: default_required_formats(),
            retain_create_ms: default_retain_disabled(),
            retain_modify_ms: default_retain_disabled(),
            retain_publication_ms: default_retain_disabled(),
            ebook_ingest_dir: default_ebook_ingest_dir(),
            audio_ingest_dir: default_audio_ingest_dir(),
            update_ebook_content_dir: default_update_ebook_content_dir(),
            update_audio_content_dir: default_update_audio_content_dir(),
            update_ebook_metadata_dir: default_update_ebook_metadata_dir(),
            update_audio_metadata_dir: default_update_audio_metadata_dir(),
            metadata_suffixes: default_metadata_suffixes(),
            characterization_suffixes: default_characterization_suffixes(),
        }
    }
}

// Default value functions for serde defaults

fn default_ebook_source_dir() -> PathBuf {
    PathBuf::from("books/ebook")
}

fn default_audio_source_dir() -> PathBuf {
    PathBuf::from("books/audio")
}

fn default_ebook_formats() -> Vec<String> {
    vec!["pdf".to_string(), "epub".to_string()]
}

fn default_audio_formats() -> Vec<String> {
    vec!["mp3".to_string()]
}

fn default_workers() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_required_formats() -> Vec<String> {
    vec!["pdf".to_string()]
}

fn default_retain_disabled() -> i64 {
    RETAIN_DISABLED
}

fn default_ebook_ingest_dir() -> PathBuf {
    PathBuf::from("transfer/ingest/ebook")
}

fn default_audio_ingest_dir() -> PathBuf {
    PathBuf::from("transfer/ingest/audio")
}

fn default_update_ebook_content_dir() -> PathBuf {
    PathBuf::from("transfer/update/ebook/content")
}

fn default_update_audio_content_dir() -> PathBuf {
    PathBuf::from("transfer/update/audio/content")
}

fn default_update_ebook_metadata_dir() -> PathBuf {
    PathBuf::from("transfer/update/ebook/metadata")
}

fn default_update_audio_metadata_dir() -> PathBuf {
    PathBuf::from("transfer/update/audio/metadata")
}

fn default_metadata_suffixes() -> Vec<String> {
    vec![".meta.json".to_string()]
}

fn default_characterization_suffixes() -> Vec<String> {
    vec![".characterization.json".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_destination_rejected() {
        let mut config = Config::default();
        config.transfer.ebook_ingest_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_older_schema_loads() {
        // A document written before file-routing suffixes existed must still
        // load, with defaults filling in the absent fields.
        let legacy = r#"{"ebook_formats": ["pdf"], "audio_formats": []}"#;
        let config: Config = serde_json::from_str(legacy).unwrap();
        assert_eq!(config.transfer.metadata_suffixes, vec![".meta.json"]);
        assert_eq!(config.workers, 4);
    }
}
