//! User-facing collaborator: the key prompt and modal notices.

use async_trait::async_trait;
use std::fmt;

/// A message shown to the user during activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The trial window has passed and a key is now mandatory.
    TrialExpired,
    /// The connectivity pre-check failed.
    ConnectivityRequired,
    /// The entered key is not in the remote key set.
    InvalidKey,
    /// Catch-all for anything unexpected during startup.
    Unexpected(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrialExpired => {
                f.write_str("Trial period has expired. Please enter a license key to continue.")
            }
            Self::ConnectivityRequired => {
                f.write_str("An internet connection is required to activate the application.")
            }
            Self::InvalidKey => f.write_str("Invalid license key."),
            Self::Unexpected(msg) => write!(f, "An error occurred: {msg}"),
        }
    }
}

/// The interactive side of activation, supplied by the host application.
#[async_trait]
pub trait ActivationUi: Send + Sync {
    /// Asks the user for a license key. `None` means the user cancelled.
    async fn prompt_for_key(&self) -> Option<String>;

    /// Shows a modal notice and returns once the user has seen it.
    async fn notify(&self, notice: Notice);
}
