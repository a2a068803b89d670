//! Candidate key validation against the remote key set.

use crate::authority::KeyAuthority;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of checking one candidate key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The key is in the current remote set.
    Valid,
    /// The key is empty or not in the remote set.
    Invalid,
    /// The remote set could not be fetched.
    Unreachable(String),
}

impl Validation {
    /// Returns true only for [`Validation::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Checks candidate keys. Fails closed: any fetch failure is "not valid".
pub struct LicenseValidator {
    authority: Arc<dyn KeyAuthority>,
}

impl LicenseValidator {
    /// Creates a validator backed by `authority`.
    pub fn new(authority: Arc<dyn KeyAuthority>) -> Self {
        Self { authority }
    }

    /// Checks `candidate` with one fresh fetch. Empty candidates are rejected
    /// without touching the network.
    pub async fn check(&self, candidate: &str) -> Validation {
        if candidate.trim().is_empty() {
            debug!("Rejecting empty license key");
            return Validation::Invalid;
        }

        match self.authority.fetch_keys().await {
            Ok(keys) if keys.contains(candidate) => Validation::Valid,
            Ok(_) => Validation::Invalid,
            Err(e) => {
                warn!("License key check failed closed: {}", e);
                Validation::Unreachable(e.to_string())
            }
        }
    }

    /// Returns true iff `candidate` is in the freshly fetched key set.
    pub async fn is_valid(&self, candidate: &str) -> bool {
        self.check(candidate).await.is_valid()
    }
}
