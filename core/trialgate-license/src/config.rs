//! Activation configuration.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Default trial length in days.
pub const DEFAULT_TRIAL_DAYS: u32 = 30;

/// Longest accepted trial, in days (100 years).
pub const MAX_TRIAL_DAYS: u32 = 36_500;

/// Default connectivity probe timeout (3 seconds).
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;

/// Default key-list fetch timeout (5 seconds).
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;

/// Store key holding the activated license key.
pub const LICENSE_KEY_ENTRY: &str = "LicenseKey";

/// Store key holding the first-launch timestamp.
pub const FIRST_LAUNCH_ENTRY: &str = "FirstLaunch";

/// Everything the activation engine needs, passed in at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// URL of the newline-delimited key list.
    pub key_authority_url: String,
    /// Namespace used for every store read and write.
    pub store_namespace: String,
    /// Length of the trial window in days.
    pub trial_duration_days: u32,
    /// Upper bound for the connectivity probe.
    pub connectivity_probe_timeout_ms: u64,
    /// Address the connectivity probe connects to.
    pub connectivity_probe_addr: SocketAddr,
    /// Upper bound for one key-list fetch.
    pub fetch_timeout_ms: u64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            key_authority_url: "https://licenses.example.com/license-keys.txt".to_string(),
            store_namespace: "YourCompany/DemoApp".to_string(),
            trial_duration_days: DEFAULT_TRIAL_DAYS,
            connectivity_probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            connectivity_probe_addr: SocketAddr::from(([8, 8, 8, 8], 53)),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl ActivationConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> LicenseResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive an activation.
    pub fn validate(&self) -> LicenseResult<()> {
        if !self.key_authority_url.starts_with("http://")
            && !self.key_authority_url.starts_with("https://")
        {
            return Err(LicenseError::Config(format!(
                "key_authority_url must be http(s): {}",
                self.key_authority_url
            )));
        }
        if self.store_namespace.trim().is_empty() {
            return Err(LicenseError::Config("store_namespace is empty".to_string()));
        }
        if self.trial_duration_days > MAX_TRIAL_DAYS {
            return Err(LicenseError::Config(format!(
                "trial_duration_days must be at most {MAX_TRIAL_DAYS}: {}",
                self.trial_duration_days
            )));
        }
        if self.connectivity_probe_timeout_ms == 0 || self.fetch_timeout_ms == 0 {
            return Err(LicenseError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Trial length as a chrono duration.
    #[must_use]
    pub fn trial_duration(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.trial_duration_days))
    }

    /// Connectivity probe timeout.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity_probe_timeout_ms)
    }

    /// Key-list fetch timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
