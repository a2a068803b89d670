//! Startup gating: the activation state machine.
//!
//! ```text
//! CheckingStoredKey ──valid──────────────────────────────▶ Activated
//!        │ missing / invalid
//!        ▼
//! CheckingTrial ──(records first launch)──▶ Prompting{mandatory if expired}
//!        ▲                                      │ no connectivity / cancel
//!        │                                      ├──▶ Denied (mandatory)
//!        │                                      ├──▶ Activated (optional)
//!        │                                      ▼ key entered
//!        │                               ValidatingInput ──valid──▶ Activated
//!        └──────────── invalid: notice, back to Prompting ◀──┘
//! ```
//!
//! When the trial is still running, a cancelled or blocked prompt still
//! activates (reason [`ActivationReason::TrialNag`]); once the trial has
//! expired the same outcome denies.

use crate::authority::{HttpKeyAuthority, KeyAuthority};
use crate::clock::{Clock, SystemClock};
use crate::config::{ActivationConfig, LICENSE_KEY_ENTRY};
use crate::error::LicenseResult;
use crate::notice::{ActivationUi, Notice};
use crate::probe::{ConnectivityProbe, TcpProbe};
use crate::trial::{TrialClock, TrialStatus};
use crate::validator::{LicenseValidator, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use trialgate_store::PersistentStore;

/// Whether the user must supply a key to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Trial expired: no key means no launch.
    Mandatory,
    /// Trial running: the prompt is a reminder only.
    Optional,
}

/// Why the application was allowed to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationReason {
    /// A previously stored key is still in the remote set.
    StoredKey,
    /// The user entered a valid key during this launch.
    NewKey,
    /// The trial is running and the user did not activate.
    TrialNag,
}

/// Why the application was not allowed to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The user cancelled the mandatory prompt.
    Cancelled,
    /// The mandatory prompt could not run without connectivity.
    NoConnectivity,
    /// An unexpected error stopped the startup check.
    Error(String),
}

/// Final gating decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Launch the main application.
    Activated(ActivationReason),
    /// Exit without launching.
    Denied(DenialReason),
}

impl Decision {
    /// Returns true if the main application may launch.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated(_))
    }
}

/// A state of the activation state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationState {
    /// Reading and re-validating the stored key.
    CheckingStoredKey,
    /// Recording the first launch and deciding whether a key is mandatory.
    CheckingTrial,
    /// Waiting on the connectivity check and the key prompt.
    Prompting {
        /// Whether a key is required to continue.
        mode: PromptMode,
    },
    /// Checking a key the user just entered.
    ValidatingInput {
        /// Mode to return to if the key is rejected.
        mode: PromptMode,
        /// The entered key.
        key: String,
    },
    /// Terminal: launch.
    Activated(ActivationReason),
    /// Terminal: exit.
    Denied(DenialReason),
}

impl ActivationState {
    /// Returns the decision if this state is terminal.
    #[must_use]
    pub fn decision(&self) -> Option<Decision> {
        match self {
            Self::Activated(reason) => Some(Decision::Activated(*reason)),
            Self::Denied(reason) => Some(Decision::Denied(reason.clone())),
            _ => None,
        }
    }

    /// Returns true for [`Self::Activated`] and [`Self::Denied`].
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Activated(_) | Self::Denied(_))
    }

    /// Short name for logs; never includes the entered key.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckingStoredKey => "checking_stored_key",
            Self::CheckingTrial => "checking_trial",
            Self::Prompting { .. } => "prompting",
            Self::ValidatingInput { .. } => "validating_input",
            Self::Activated(_) => "activated",
            Self::Denied(_) => "denied",
        }
    }

    fn unresolved(mode: PromptMode) -> Self {
        match mode {
            PromptMode::Mandatory => Self::Denied(DenialReason::Cancelled),
            PromptMode::Optional => Self::Activated(ActivationReason::TrialNag),
        }
    }
}

/// Read-only view of the persisted license state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseSummary {
    /// Trial window status.
    pub trial: TrialStatus,
    /// Whether a license key has been stored.
    pub has_stored_key: bool,
}

/// Orchestrates stored-key, trial, connectivity and validation checks into
/// one startup decision.
pub struct ActivationController {
    namespace: String,
    store: Arc<dyn PersistentStore>,
    trial: TrialClock,
    validator: LicenseValidator,
    probe: Arc<dyn ConnectivityProbe>,
}

impl ActivationController {
    /// Creates a controller from explicit collaborators.
    pub fn new(
        config: &ActivationConfig,
        store: Arc<dyn PersistentStore>,
        authority: Arc<dyn KeyAuthority>,
        probe: Arc<dyn ConnectivityProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            namespace: config.store_namespace.clone(),
            trial: TrialClock::new(Arc::clone(&store), clock, config),
            store,
            validator: LicenseValidator::new(authority),
            probe,
        }
    }

    /// Creates a controller with the HTTP authority, TCP probe and system
    /// clock described by `config`.
    pub fn from_config(
        config: &ActivationConfig,
        store: Arc<dyn PersistentStore>,
    ) -> LicenseResult<Self> {
        config.validate()?;
        let authority = Arc::new(HttpKeyAuthority::new(config)?);
        let probe = Arc::new(TcpProbe::from_config(config));
        Ok(Self::new(config, store, authority, probe, Arc::new(SystemClock)))
    }

    /// Returns the trial clock.
    #[must_use]
    pub fn trial(&self) -> &TrialClock {
        &self.trial
    }

    /// Returns the stored license key, if any.
    pub fn stored_key(&self) -> LicenseResult<Option<String>> {
        Ok(self.store.get(&self.namespace, LICENSE_KEY_ENTRY)?)
    }

    /// Summarizes persisted state without network access.
    pub fn summary(&self) -> LicenseResult<LicenseSummary> {
        Ok(LicenseSummary {
            trial: self.trial.status()?,
            has_stored_key: self.stored_key()?.is_some(),
        })
    }

    /// Validates `key` once and stores it if valid. No prompt, no probe.
    pub async fn activate(&self, key: &str) -> LicenseResult<Validation> {
        let validation = self.validator.check(key).await;
        if validation.is_valid() {
            self.store_key(key)?;
        }
        Ok(validation)
    }

    fn store_key(&self, key: &str) -> LicenseResult<()> {
        self.store.set(&self.namespace, LICENSE_KEY_ENTRY, key.trim())?;
        info!("License key activated and stored");
        Ok(())
    }

    /// Performs one transition. Terminal states map to themselves.
    pub async fn step(
        &self,
        state: ActivationState,
        ui: &dyn ActivationUi,
    ) -> LicenseResult<ActivationState> {
        let next = match state {
            ActivationState::CheckingStoredKey => match self.stored_key()? {
                Some(key) => {
                    if self.validator.is_valid(&key).await {
                        ActivationState::Activated(ActivationReason::StoredKey)
                    } else {
                        warn!("Stored license key is no longer valid");
                        ActivationState::CheckingTrial
                    }
                }
                None => ActivationState::CheckingTrial,
            },

            ActivationState::CheckingTrial => {
                if self.trial.is_first_launch()? {
                    self.trial.record_first_launch()?;
                }
                if self.trial.is_trial_expired()? {
                    info!("Trial expired, license key required");
                    ui.notify(Notice::TrialExpired).await;
                    ActivationState::Prompting {
                        mode: PromptMode::Mandatory,
                    }
                } else {
                    ActivationState::Prompting {
                        mode: PromptMode::Optional,
                    }
                }
            }

            ActivationState::Prompting { mode } => {
                if !self.probe.is_available().await {
                    ui.notify(Notice::ConnectivityRequired).await;
                    match mode {
                        PromptMode::Mandatory => {
                            ActivationState::Denied(DenialReason::NoConnectivity)
                        }
                        PromptMode::Optional => ActivationState::unresolved(mode),
                    }
                } else {
                    match ui.prompt_for_key().await {
                        Some(key) => ActivationState::ValidatingInput { mode, key },
                        None => {
                            debug!("Key prompt cancelled ({:?})", mode);
                            ActivationState::unresolved(mode)
                        }
                    }
                }
            }

            ActivationState::ValidatingInput { mode, key } => {
                if self.validator.is_valid(&key).await {
                    self.store_key(&key)?;
                    ActivationState::Activated(ActivationReason::NewKey)
                } else {
                    ui.notify(Notice::InvalidKey).await;
                    ActivationState::Prompting { mode }
                }
            }

            terminal @ (ActivationState::Activated(_) | ActivationState::Denied(_)) => terminal,
        };
        Ok(next)
    }

    /// Runs the state machine to a decision. Storage failures propagate.
    pub async fn run(&self, ui: &dyn ActivationUi) -> LicenseResult<Decision> {
        let mut state = ActivationState::CheckingStoredKey;
        loop {
            if let Some(decision) = state.decision() {
                info!("Activation decision: {:?}", decision);
                return Ok(decision);
            }
            debug!("Activation state: {}", state.name());
            state = self.step(state, ui).await?;
        }
    }

    /// Runs the state machine, converting any error into a single
    /// [`Notice::Unexpected`] and a denial.
    pub async fn gate(&self, ui: &dyn ActivationUi) -> Decision {
        match self.run(ui).await {
            Ok(decision) => decision,
            Err(e) => {
                error!("Activation check failed: {}", e);
                let message = e.to_string();
                ui.notify(Notice::Unexpected(message.clone())).await;
                Decision::Denied(DenialReason::Error(message))
            }
        }
    }
}
