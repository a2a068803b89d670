//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a string map.
    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Namespace is empty or escapes the store root.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    /// No platform configuration directory could be resolved.
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}
