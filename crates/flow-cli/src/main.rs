//! flowsync CLI
//!
//! Synchronises designtime artifacts of an integration tenant with a git
//! working tree, and creates, updates and deploys single artifacts.

mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use clap::Parser;
use colored::Colorize;

use flow_core::CancelToken;

use cli::{Cli, Commands, UpdateTarget};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.debug) {
        eprintln!("{}: failed to initialise logging: {e}", "warning".yellow());
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::warn!("Interrupt received, finishing running work");
        handler_token.cancel();
    }) {
        tracing::warn!(error = %e, "Failed to install interrupt handler");
    }

    let file = settings::load_config_file(cli.config.as_deref())?;
    let client = settings::api_client(&cli.connection, &file.tenant)?;

    match &cli.command {
        Commands::Sync(args) => commands::run_sync(client, args, &file, cancel),
        Commands::Update { target } => match target {
            UpdateTarget::Artifact(args) => commands::run_update_artifact(client, args, &file),
            UpdateTarget::Package(args) => commands::run_update_package(client, args),
        },
        Commands::Deploy(args) => commands::run_deploy(client, args, cancel),
    }
}
