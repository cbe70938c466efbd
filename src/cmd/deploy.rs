// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `deploy` command.
//!
//! ```text
//! token --> validate --> FileSet (--generate, then --file) --> Deployer
//!                                                                 |
//!                                                  outcome (text | --json)
//! ```

use anyhow::Context;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::auth::{require_valid, resolve_credential};
use crate::cli::deploy::DeployArgs;
use crate::config::Config;
use crate::deploy::{DeployRequest, Deployer, DeploymentOutcome, FileSet};
use crate::error::Result;
use crate::github::{GitHubClient, RepoSlug};
use crate::net::ProgressDisplay;
use crate::scaffold::scaffold;

/// Parses one `DEST=SRC` argument.
///
/// # Errors
///
/// Returns an error if there is no `=` or either side is empty.
pub fn parse_file_arg(arg: &str) -> Result<(&str, &str)> {
    let (dest, src) = arg
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected DEST=SRC, got '{arg}'"))?;
    let (dest, src) = (dest.trim(), src.trim());
    if dest.is_empty() || src.is_empty() {
        anyhow::bail!("expected DEST=SRC, got '{arg}'");
    }
    Ok((dest, src))
}

/// Collects the file set: generated files first, explicit `--file` entries on top.
///
/// # Errors
///
/// Returns an error if scaffolding fails, a source file cannot be read, or a
/// destination path is invalid.
pub async fn build_file_set(generate: Option<&Path>, file_args: &[String]) -> Result<FileSet> {
    let mut files = FileSet::new();

    if let Some(dir) = generate {
        let dir = dir.to_path_buf();
        let generated = tokio::task::spawn_blocking(move || scaffold(&dir)).await??;
        files.merge(generated.files);
    }

    for arg in file_args {
        let (dest, src) = parse_file_arg(arg)?;
        let content = tokio::fs::read(src)
            .await
            .with_context(|| format!("failed to read {src}"))?;
        files.insert(dest, content)?;
    }

    Ok(files)
}

fn print_outcome(outcome: &DeploymentOutcome) {
    let verb = match (outcome.success(), outcome.dry_run()) {
        (true, true) => "Prepared (dry run)",
        (true, false) => "Deployed",
        (false, _) => "Failed",
    };
    println!(
        "{verb}: {} -> {}",
        outcome.source_location(),
        outcome.destination_location()
    );
    if !outcome.files_written().is_empty() {
        println!("  written: {}", outcome.files_written().join(", "));
    }
    if !outcome.files_skipped().is_empty() {
        println!("  skipped: {}", outcome.files_skipped().join(", "));
    }
    if let Some(sha) = outcome.commit_sha() {
        println!("  commit:  {sha}");
    }
    if let Some(url) = outcome.resulting_url() {
        println!("  next:    {url}");
    }
    if let (Some(step), Some(detail)) = (outcome.failed_step(), outcome.error_detail()) {
        println!("  error:   [{step}] {detail}");
    }
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if the token is missing or rejected, the inputs are
/// invalid, or the deployment fails.
pub async fn run_deploy_command(
    args: &DeployArgs,
    config: &Config,
    dry: bool,
    cancel: CancellationToken,
) -> Result<()> {
    let credential = resolve_credential(&args.token)?;
    let client = GitHubClient::new(&config.github)?;
    require_valid(&client, &credential).await?;

    let files = build_file_set(args.generate.as_deref(), &args.files).await?;
    let repo = match &args.repo {
        Some(repo) => repo.clone(),
        None => RepoSlug::parse_url(&args.source)?.repo().to_string(),
    };

    let request = DeployRequest::builder()
        .with_source_url(args.source.as_str())
        .maybe_with_source_branch(args.branch.clone())
        .with_destination_owner(args.owner.as_str())
        .with_destination_repo(repo)
        .with_destination_branch(
            args.target_branch
                .clone()
                .unwrap_or_else(|| config.deploy.default_branch.clone()),
        )
        .with_create_if_missing(!args.no_create)
        .with_overwrite_existing(args.overwrite)
        .with_files(files)
        .with_commit_message(
            args.message
                .clone()
                .unwrap_or_else(|| config.deploy.commit_message.clone()),
        )
        .with_dry_run(dry)
        .build();
    info!(
        files = request.files().len(),
        dry_run = dry,
        "deployment request prepared"
    );

    let progress = if args.json {
        ProgressDisplay::Silent
    } else {
        ProgressDisplay::Bar
    };
    let deployer =
        Deployer::new(client, credential, config.deploy.clone()).with_progress(progress);
    let outcome = deployer.deploy_with_cancellation(&request, cancel).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if outcome.success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "deployment failed: {}",
            outcome.error_detail().unwrap_or("unknown error")
        ))
    }
}
