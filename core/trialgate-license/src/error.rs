//! Error types for the licensing engine.

use thiserror::Error;
use trialgate_store::StoreError;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// No outbound network access, or the key authority could not be reached.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The key authority answered with a non-success status.
    #[error("key authority returned HTTP {0}")]
    AuthorityStatus(u16),

    /// The candidate key is not in the remote key set.
    #[error("invalid license key")]
    InvalidKey,

    /// The persistent store could not be read or written.
    #[error("storage unreadable: {0}")]
    StorageUnreadable(#[from] StoreError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LicenseError {
    /// Returns true for failures that the validator and probe swallow and
    /// report as "not valid" / "unavailable".
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_) | Self::AuthorityStatus(_))
    }
}

impl From<reqwest::Error> for LicenseError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::AuthorityStatus(status.as_u16()),
            None => Self::NetworkUnavailable(e.to_string()),
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
