//! Remote key authority: the network source of currently valid keys.
//!
//! The authority serves plain text, one key per line. Blank lines are ignored
//! and every line is trimmed before comparison. The set is rebuilt on every
//! fetch and never cached.

use crate::config::ActivationConfig;
use crate::error::{LicenseError, LicenseResult};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use tracing::debug;

/// The keys published by the authority at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteKeySet {
    keys: HashSet<String>,
}

impl RemoteKeySet {
    /// Builds a key set from newline-delimited text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let keys = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { keys }
    }

    /// Returns true if the trimmed candidate exactly matches a published key.
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.keys.contains(candidate.trim())
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the authority published no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Source of the authoritative key list.
#[async_trait]
pub trait KeyAuthority: Send + Sync {
    /// Fetches the current key set. Exactly one request per call.
    async fn fetch_keys(&self) -> LicenseResult<RemoteKeySet>;
}

/// Fetches the key list with a single HTTP GET.
pub struct HttpKeyAuthority {
    url: String,
    client: Client,
}

impl HttpKeyAuthority {
    /// Creates an authority for `config.key_authority_url`, bounded by
    /// `config.fetch_timeout_ms`.
    pub fn new(config: &ActivationConfig) -> LicenseResult<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| LicenseError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: config.key_authority_url.clone(),
            client,
        })
    }

    /// Returns the URL the key list is fetched from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl KeyAuthority for HttpKeyAuthority {
    async fn fetch_keys(&self) -> LicenseResult<RemoteKeySet> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LicenseError::AuthorityStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let keys = RemoteKeySet::parse(&body);
        debug!("Fetched {} license keys from {}", keys.len(), self.url);
        Ok(keys)
    }
}
