//! Error types and handling for Bookferry
//!
//! The error taxonomy distinguishes expected not-ready conditions (which are
//! surfaced as booleans, never through this type), malformed input (fatal for
//! the affected item) and I/O failures (recoverable at the batch level).

use std::path::PathBuf;

/// Main error type for Bookferry operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Metadata document exists but is not in the expected structured format
    #[error("Malformed metadata document '{path}': {message}")]
    Metadata {
        /// Path to the metadata document
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Registry could not be read or written
    #[error("Registry error: {message}")]
    Registry {
        /// Error message describing the registry issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Malformed metadata document errors
    Metadata,
    /// Registry persistence errors
    Registry,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::FileNotFound { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::Metadata { .. } => ErrorKind::Metadata,
            Self::Registry { .. } => ErrorKind::Registry,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Check if this error is recoverable at the batch level
    ///
    /// Recoverable errors abort the current item only; the batch driver logs
    /// them and continues with the next item. Malformed metadata and
    /// configuration problems indicate corrupt input rather than a transient
    /// condition.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { .. } | Self::FileNotFound { .. } | Self::Registry { .. } => true,
            Self::Config { .. } | Self::Metadata { .. } => false,
            Self::Other { .. } => true,
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new malformed-metadata error
    pub fn metadata<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new registry error
    pub fn registry<S: Into<String>>(message: S) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
