//! trialgate launcher
//!
//! Runs the license/trial check and, when activation succeeds, launches the
//! gated program.
//!
//! Usage:
//!   trialgate run -- ./my-app --flag
//!   trialgate status
//!   trialgate activate ABC123
//!
//! Denied startups exit with code 1 without launching anything.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;
use trialgate_launcher::{build_controller, launch, load_config, open_store, ConfigOverrides, TerminalUi};
use trialgate_license::{ActivationUi, Decision, Notice, TrialStatus, Validation};

#[derive(Parser, Debug)]
#[command(name = "trialgate")]
#[command(about = "Gate a program behind a license key or trial window")]
struct Args {
    /// Path to a JSON activation config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding persisted license state
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// URL of the newline-delimited license key list
    #[arg(long)]
    authority_url: Option<String>,

    /// Store namespace (e.g. "YourCompany/DemoApp")
    #[arg(long)]
    namespace: Option<String>,

    /// Trial length in days
    #[arg(long)]
    trial_days: Option<u32>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the startup check, then launch the given program
    Run {
        /// Program and arguments to launch once activated
        #[arg(last = true)]
        program: Vec<String>,
    },
    /// Show trial and license state without touching the network
    Status,
    /// Validate and store a license key without prompting
    Activate {
        /// The license key
        key: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let ui = TerminalUi::stdio();
    match run(args, &ui).await {
        Ok(code) => code,
        Err(e) => {
            ui.notify(Notice::Unexpected(format!("{e:#}"))).await;
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, ui: &TerminalUi) -> Result<ExitCode> {
    let overrides = ConfigOverrides {
        authority_url: args.authority_url,
        namespace: args.namespace,
        trial_days: args.trial_days,
    };
    let config = load_config(args.config.as_deref(), &overrides)?;
    debug!("Activation config: {:?}", config);
    let controller = build_controller(&config, open_store(args.store_dir)?)?;

    match args.command.unwrap_or(Cmd::Run { program: Vec::new() }) {
        Cmd::Run { program } => match controller.gate(ui).await {
            Decision::Activated(_) => launch(&program),
            Decision::Denied(_) => Ok(ExitCode::FAILURE),
        },
        Cmd::Status => {
            let summary = controller.summary()?;
            let trial = match summary.trial {
                TrialStatus::NotStarted => "not started".to_string(),
                TrialStatus::Active { days_remaining } => {
                    format!("active, {days_remaining} days remaining")
                }
                TrialStatus::Expired => "expired".to_string(),
                TrialStatus::Unreadable => "unreadable first-launch value".to_string(),
            };
            println!("Trial:   {trial}");
            println!(
                "License: {}",
                if summary.has_stored_key { "key stored" } else { "no key stored" }
            );
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Activate { key } => match controller.activate(&key).await? {
            Validation::Valid => {
                println!("License activated.");
                Ok(ExitCode::SUCCESS)
            }
            Validation::Invalid => {
                ui.notify(Notice::InvalidKey).await;
                Ok(ExitCode::FAILURE)
            }
            Validation::Unreachable(_) => {
                ui.notify(Notice::ConnectivityRequired).await;
                Ok(ExitCode::FAILURE)
            }
        },
    }
}
