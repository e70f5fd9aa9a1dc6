//! `update artifact` and `update package` commands

use colored::Colorize;

use flow_api::ApiClient;
use flow_content::ArtifactKind;
use flow_core::{Action, ArtifactUpload, ConfigFile, PackageChange};
use flow_fs::NormalizedPath;

use crate::cli::{UpdateArtifactArgs, UpdatePackageArgs};
use crate::error::{CliError, Result};
use crate::settings;

pub(crate) fn parse_kind(value: &str) -> Result<ArtifactKind> {
    value.parse().map_err(|_| {
        CliError::user(format!(
            "invalid artifact type '{value}', allowed values are Integration, MessageMapping, ScriptCollection, ValueMapping"
        ))
    })
}

pub fn run_update_artifact(client: ApiClient, args: &UpdateArtifactArgs, file: &ConfigFile) -> Result<()> {
    let upload = ArtifactUpload {
        id: args.artifact_id.clone(),
        name: args
            .artifact_name
            .clone()
            .unwrap_or_else(|| args.artifact_id.clone()),
        kind: parse_kind(&args.artifact_type)?,
        package_id: args.package_id.clone(),
        dir: NormalizedPath::new(&args.dir_artifact),
    };
    let work_dir = args
        .dir_work
        .clone()
        .or_else(|| file.sync.dir_work.clone())
        .map(NormalizedPath::new)
        .unwrap_or_else(settings::default_work_dir);

    println!(
        "{} Updating {} {} in package {}...",
        "=>".blue().bold(),
        upload.kind,
        upload.id.cyan(),
        upload.package_id.cyan()
    );
    let action = flow_core::update_artifact(&client, &upload, &work_dir)?;
    match action {
        Action::Unchanged => println!("{} No changes, artifact left as is.", "OK".green().bold()),
        other => println!("{} Artifact {}.", "OK".green().bold(), other),
    }
    Ok(())
}

pub fn run_update_package(client: ApiClient, args: &UpdatePackageArgs) -> Result<()> {
    let path = NormalizedPath::new(&args.package_file);
    println!("{} Updating package from {}...", "=>".blue().bold(), path);
    let change = flow_core::update_package(&client, &path)?;
    let verb = match change {
        PackageChange::Created => "created",
        PackageChange::Updated => "updated",
    };
    println!("{} Package {}.", "OK".green().bold(), verb);
    Ok(())
}
