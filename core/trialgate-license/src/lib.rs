//! License and trial activation for trialgate.
//!
//! Gates application startup: the app may launch when a stored license key is
//! still published by the key authority, or while the trial window is open.
//! Otherwise the user is prompted for a key until a valid one is entered or
//! the prompt is cancelled.
//!
//! # Components
//!
//! - **TrialClock**: records the first launch and decides trial expiry
//! - **KeyAuthority**: fetches the newline-delimited list of valid keys
//! - **LicenseValidator**: checks a candidate against a fresh fetch (fails closed)
//! - **ConnectivityProbe**: bounded reachability check before prompting
//! - **ActivationController**: the startup state machine tying them together
//!
//! # Design Principles
//!
//! - **No network when not needed**: a running trial with no stored key only
//!   touches the network to offer the optional prompt
//! - **Fail closed**: fetch and probe failures read as "invalid" / "unavailable"
//! - **Explicit configuration**: URL, namespace and timeouts come from
//!   [`ActivationConfig`], never from process-wide constants

mod authority;
mod clock;
mod config;
mod controller;
mod error;
mod notice;
mod probe;
mod trial;
mod validator;

pub use authority::{HttpKeyAuthority, KeyAuthority, RemoteKeySet};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{
    ActivationConfig, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_TRIAL_DAYS,
    FIRST_LAUNCH_ENTRY, LICENSE_KEY_ENTRY, MAX_TRIAL_DAYS,
};
pub use controller::{
    ActivationController, ActivationReason, ActivationState, Decision, DenialReason,
    LicenseSummary, PromptMode,
};
pub use error::{LicenseError, LicenseResult};
pub use notice::{ActivationUi, Notice};
pub use probe::{ConnectivityProbe, TcpProbe};
pub use trial::{parse_timestamp, TrialClock, TrialStatus};
pub use validator::{LicenseValidator, Validation};
