//! Error types for QuickXorHash
//!
//! The hash engine itself is total and never fails. Everything here comes from
//! the surfaces around it: reading byte sources, parsing digests, manifests
//! and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for QuickXorHash operations
#[derive(Error, Debug)]
pub enum QuickXorError {
    /// I/O error while reading a byte source
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File or directory not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Digest text could not be decoded
    #[error("Invalid QuickXorHash digest: {0}")]
    InvalidDigest(String),

    /// Hash verification failed
    #[error("Integrity check failed for '{path}': expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Manifest parsing/writing error
    #[error("Manifest error: {0}")]
    ManifestError(String),

    /// Thread pool error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// A tree could not be walked completely
    #[error("Scan of '{root}' incomplete: {count} unreadable entries (first: {first})")]
    ScanIncomplete {
        root: PathBuf,
        count: usize,
        first: String,
    },
}

impl QuickXorError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an integrity mismatch error
    pub fn integrity_mismatch(
        path: impl Into<PathBuf>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::IntegrityMismatch {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

/// Result type alias for QuickXorHash operations
pub type Result<T> = std::result::Result<T, QuickXorError>;

impl From<std::io::Error> for QuickXorError {
    fn from(err: std::io::Error) -> Self {
        QuickXorError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for QuickXorError {
    fn from(err: serde_json::Error) -> Self {
        QuickXorError::ManifestError(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| QuickXorError::io(path, e))
    }
}
