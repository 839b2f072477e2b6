//! Configuration error type
//!
//! Configuration problems are fatal for the run: a transfer pass with a
//! half-loaded policy could ingest items it should have held back. The
//! variants therefore distinguish where loading went wrong (reading,
//! parsing, validating) so the operator can tell a broken file from a
//! broken value.

use bookferry_types::Error as BookferryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, validating or writing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("I/O error reading config file '{path}': {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file was read but is not valid YAML/TOML/JSON for this schema
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser diagnostics
        message: String,
    },

    /// The configuration parsed but its values are not usable together
    #[error("Configuration validation failed: {message}")]
    Validation {
        /// What the validator rejected
        message: String,
    },

    /// A setting without a default was left empty
    #[error("Missing required configuration: {key}")]
    MissingRequired {
        /// The empty key
        key: String,
    },

    /// A setting is present but out of range or malformed
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// The offending key
        key: String,
        /// Why the value was rejected
        message: String,
    },

    /// The configuration could not be serialized for writing
    #[error("Serialization error: {message}")]
    Serialization {
        /// Serializer diagnostics
        message: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Validation failure with a free-form reason
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// A required key that was left empty
    pub fn missing_required<S: Into<String>>(key: S) -> Self {
        Self::MissingRequired { key: key.into() }
    }

    /// A key whose value was rejected, with the reason
    pub fn invalid_value<S: Into<String>>(key: S, message: S) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<ConfigError> for BookferryError {
    fn from(error: ConfigError) -> Self {
        Self::config(error.to_string())
    }
}
