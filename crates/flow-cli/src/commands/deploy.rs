//! `deploy` command

use std::time::Duration;

use colored::Colorize;

use flow_api::ApiClient;
use flow_core::{CancelToken, DeployOptions};

use crate::cli::DeployArgs;
use crate::commands::update::parse_kind;
use crate::error::{CliError, Result};

pub fn run_deploy(client: ApiClient, args: &DeployArgs, cancel: CancelToken) -> Result<()> {
    let kind = parse_kind(&args.artifact_type)?;
    let ids: Vec<String> = args
        .artifact_ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(CliError::user("no artifact ids given"));
    }
    let options = DeployOptions {
        delay: Duration::from_secs(args.delay_length),
        max_checks: args.max_check_limit,
    };

    println!(
        "{} Deploying {} {} artifact(s)...",
        "=>".blue().bold(),
        ids.len(),
        kind
    );
    let started = flow_core::deploy_artifacts(&client, kind, &ids, &options, &cancel)?;
    for status in &started {
        println!(
            "   {} {} version {}",
            status.status.green(),
            status.id,
            status.version
        );
    }
    println!("{} All artifacts started.", "OK".green().bold());
    Ok(())
}
