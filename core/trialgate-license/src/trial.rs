//! Trial window tracking.
//!
//! The first launch is recorded once as an RFC 3339 timestamp under
//! [`FIRST_LAUNCH_ENTRY`]; every later check derives expiry from it. A value
//! that cannot be parsed is treated as "not expired".

use crate::clock::Clock;
use crate::config::{ActivationConfig, FIRST_LAUNCH_ENTRY};
use crate::error::LicenseResult;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use trialgate_store::PersistentStore;

/// Naive layouts accepted when a stored value is not RFC 3339.
const LEGACY_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

/// Where the trial window currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    /// No first launch has been recorded yet.
    NotStarted,
    /// The trial is running.
    Active {
        /// Whole days left before expiry.
        days_remaining: u32,
    },
    /// The trial window has passed.
    Expired,
    /// A first-launch value exists but cannot be parsed.
    Unreadable,
}

impl TrialStatus {
    /// Returns true if the app may run without a license.
    #[must_use]
    pub fn allows_use(&self) -> bool {
        !matches!(self, Self::Expired)
    }
}

/// Computes first-launch and expiry decisions from persisted state.
pub struct TrialClock {
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
    duration: chrono::Duration,
}

impl TrialClock {
    /// Creates a trial clock over `store` using the namespace and trial length
    /// from `config`.
    pub fn new(
        store: Arc<dyn PersistentStore>,
        clock: Arc<dyn Clock>,
        config: &ActivationConfig,
    ) -> Self {
        Self {
            store,
            clock,
            namespace: config.store_namespace.clone(),
            duration: config.trial_duration(),
        }
    }

    fn raw_first_launch(&self) -> LicenseResult<Option<String>> {
        Ok(self.store.get(&self.namespace, FIRST_LAUNCH_ENTRY)?)
    }

    /// Returns true iff no first-launch value exists in the store.
    pub fn is_first_launch(&self) -> LicenseResult<bool> {
        Ok(self.raw_first_launch()?.is_none())
    }

    /// Records the current time as the first launch.
    ///
    /// Does nothing if a value is already stored, so the first timestamp is
    /// never overwritten.
    pub fn record_first_launch(&self) -> LicenseResult<()> {
        if self.raw_first_launch()?.is_some() {
            debug!("First launch already recorded");
            return Ok(());
        }
        let now = self.clock.now();
        let value = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.store.set(&self.namespace, FIRST_LAUNCH_ENTRY, &value)?;
        info!("Recorded first launch at {}", value);
        Ok(())
    }

    /// Returns the parsed first-launch time, or `None` if absent or unparsable.
    pub fn first_launch(&self) -> LicenseResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.raw_first_launch()? else {
            return Ok(None);
        };
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            warn!("Ignoring unparsable first-launch value {:?}", raw);
        }
        Ok(parsed)
    }

    /// Returns true iff a first launch is recorded and the current time is past
    /// `first_launch + trial duration`.
    pub fn is_trial_expired(&self) -> LicenseResult<bool> {
        Ok(match self.first_launch()? {
            // Past chrono's range the trial never ends.
            Some(first) => first
                .checked_add_signed(self.duration)
                .is_some_and(|expires_at| self.clock.now() > expires_at),
            None => false,
        })
    }

    /// Returns the current trial status without modifying anything.
    pub fn status(&self) -> LicenseResult<TrialStatus> {
        let Some(raw) = self.raw_first_launch()? else {
            return Ok(TrialStatus::NotStarted);
        };
        let Some(first) = parse_timestamp(&raw) else {
            return Ok(TrialStatus::Unreadable);
        };
        let Some(expires_at) = first.checked_add_signed(self.duration) else {
            return Ok(TrialStatus::Active {
                days_remaining: u32::MAX,
            });
        };
        let now = self.clock.now();
        if now > expires_at {
            return Ok(TrialStatus::Expired);
        }
        let days_remaining =
            u32::try_from((expires_at - now).num_days().max(0)).unwrap_or(u32::MAX);
        Ok(TrialStatus::Active { days_remaining })
    }
}

/// Parses a stored first-launch value.
///
/// RFC 3339 is the written format; the naive layouts are read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    LEGACY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
