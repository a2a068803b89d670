//! Shared pieces of the trialgate launcher: terminal UI, config loading and
//! launching the gated program.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use trialgate_license::{ActivationConfig, ActivationController, ActivationUi, Notice};
use trialgate_store::{FileStore, PersistentStore};

type SharedReader = Arc<Mutex<Box<dyn BufRead + Send>>>;
type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Key prompt and notices on a line-oriented terminal.
///
/// An empty line or end of input cancels the prompt.
pub struct TerminalUi {
    input: SharedReader,
    output: SharedWriter,
}

impl TerminalUi {
    /// Creates a UI over arbitrary reader/writer pairs.
    pub fn new(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input: Arc::new(Mutex::new(input)),
            output: Arc::new(Mutex::new(output)),
        }
    }

    /// Creates a UI reading stdin and writing stderr.
    pub fn stdio() -> Self {
        Self::new(
            Box::new(std::io::BufReader::new(std::io::stdin())),
            Box::new(std::io::stderr()),
        )
    }

    fn read_key(input: &SharedReader, output: &SharedWriter) -> std::io::Result<Option<String>> {
        {
            let mut out = output.lock().unwrap_or_else(|e| e.into_inner());
            write!(out, "Enter license key (empty to cancel): ")?;
            out.flush()?;
        }
        let mut line = String::new();
        let read = input
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        let key = line.trim();
        Ok((!key.is_empty()).then(|| key.to_string()))
    }
}

#[async_trait]
impl ActivationUi for TerminalUi {
    async fn prompt_for_key(&self) -> Option<String> {
        let input = Arc::clone(&self.input);
        let output = Arc::clone(&self.output);
        let read = tokio::task::spawn_blocking(move || Self::read_key(&input, &output)).await;
        match read {
            Ok(Ok(key)) => key,
            Ok(Err(e)) => {
                warn!("Failed to read license key: {}", e);
                None
            }
            Err(e) => {
                warn!("Key prompt task failed: {}", e);
                None
            }
        }
    }

    async fn notify(&self, notice: Notice) {
        let mut out = self.output.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{notice}").and_then(|()| out.flush()) {
            warn!("Failed to show notice {:?}: {}", notice, e);
        }
    }
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `key_authority_url`.
    pub authority_url: Option<String>,
    /// Replaces `store_namespace`.
    pub namespace: Option<String>,
    /// Replaces `trial_duration_days`.
    pub trial_days: Option<u32>,
}

/// Loads the activation config from `path` (or defaults) and applies
/// `overrides`.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ActivationConfig> {
    let mut config = match path {
        Some(path) => {
            info!("Loading config from {:?}", path);
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            ActivationConfig::from_json(&json).context("Failed to parse config file")?
        }
        None => ActivationConfig::default(),
    };

    if let Some(url) = &overrides.authority_url {
        config.key_authority_url.clone_from(url);
    }
    if let Some(namespace) = &overrides.namespace {
        config.store_namespace.clone_from(namespace);
    }
    if let Some(days) = overrides.trial_days {
        config.trial_duration_days = days;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Opens the file store at `store_dir`, or under the platform config directory.
pub fn open_store(store_dir: Option<PathBuf>) -> Result<Arc<dyn PersistentStore>> {
    let store = match store_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::open_default().context("Failed to locate license store")?,
    };
    info!("License store at {:?}", store.root());
    Ok(Arc::new(store))
}

/// Builds a controller wired to the HTTP authority and TCP probe.
pub fn build_controller(
    config: &ActivationConfig,
    store: Arc<dyn PersistentStore>,
) -> Result<ActivationController> {
    ActivationController::from_config(config, store).context("Failed to set up activation")
}

/// Runs the gated program and forwards its exit code.
pub fn launch(program: &[String]) -> Result<ExitCode> {
    let Some((cmd, args)) = program.split_first() else {
        return Ok(ExitCode::SUCCESS);
    };
    info!("Launching {}", cmd);
    let status = Command::new(cmd)
        .args(args)
        .status()
        .with_context(|| format!("Failed to launch {cmd}"))?;
    Ok(match status.code() {
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}
