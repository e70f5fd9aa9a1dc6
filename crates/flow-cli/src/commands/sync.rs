//! `sync` command

use colored::Colorize;

use flow_api::ApiClient;
use flow_core::{Action, CancelToken, ConfigFile, SyncEngine};

use crate::cli::SyncArgs;
use crate::error::Result;
use crate::settings;

pub fn run_sync(client: ApiClient, args: &SyncArgs, file: &ConfigFile, cancel: CancelToken) -> Result<()> {
    let config = settings::sync_config(args, file)?;
    println!(
        "{} Syncing package {} ({})...",
        "=>".blue().bold(),
        config.package_id.cyan(),
        config.direction
    );

    let engine = SyncEngine::new(client, config)?.with_cancel_token(cancel);
    let report = engine.run()?;

    if report.skipped_read_only {
        println!(
            "{} Package is read-only, nothing was synced.",
            "SKIPPED".yellow().bold()
        );
        return Ok(());
    }

    for outcome in &report.outcomes {
        let label = match outcome.action {
            Action::Created | Action::Updated | Action::Written => outcome.action.to_string().green(),
            Action::Unchanged => outcome.action.to_string().dimmed(),
            Action::SkippedDraft => outcome.action.to_string().yellow(),
        };
        println!("   {} {} ({})", label, outcome.id, outcome.kind);
    }
    if report.package_details_written {
        println!("   {} package details", "written".green());
    }
    if let Some(commit) = &report.commit {
        println!("   {} commit {}", "created".green(), commit.hash);
    }
    println!("{} {}", "OK".green().bold(), report.summary());
    Ok(())
}
