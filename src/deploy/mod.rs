// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deployment orchestration.
//!
//! ```text
//! DeployRequest
//!      |
//!      v
//!  Validate ----> Fetch -----------> CheckDestination --(missing)--> CreateRepository
//!  (locations)   (tarball into        GET /repos/{o}/{r}              POST user|org repos
//!                 ScratchWorkspace)        |                          poll default branch
//!                 <= fetch_timeout         v                                |
//!                                     Materialize <-------------------------'
//!                                     (FileSet -> tree/)
//!                                          |
//!                          dry run / unchanged source --> done
//!                                          |
//!                                          v
//!                                     Publish (<= publish_timeout)
//!                                     blobs -> tree -> commit -> ref
//!                                          |
//!                                          v
//!                                   DeploymentOutcome
//! ```
//!
//! The workspace is dropped (and removed) on every exit path, including
//! timeouts and cancellation.

pub mod fetch;
pub mod gate;
pub mod materialize;
pub mod outcome;
pub mod publish;
pub mod request;
pub mod workspace;


use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::types::DeployConfig;
use crate::error::{DeployError, DeployResult, DeployStep};
use crate::github::{Credential, GitHubClient, RemoteLocation};
use crate::net::ProgressDisplay;

pub use fetch::{FetchOptions, FetchedSource, fetch_source};
pub use materialize::MaterializeReport;
pub use outcome::DeploymentOutcome;
pub use publish::{PublishOptions, PublishReceipt, Publisher};
pub use request::{DeployRequest, FileSet};
pub use workspace::ScratchWorkspace;

use outcome::{OutcomeParts, onboarding_link};

/// Why a bounded step stopped early.
#[derive(Debug, Clone, Copy)]
enum Halt {
    Cancelled,
    TimedOut(Duration),
}

impl Halt {
    const fn at(self, step: DeployStep) -> DeployError {
        match self {
            Self::Cancelled => DeployError::Cancelled { step },
            Self::TimedOut(budget) => DeployError::Timeout {
                step,
                seconds: budget.as_secs(),
            },
        }
    }
}

/// Runs `fut` until it completes, `cancel` fires, or `budget` elapses.
async fn bounded<F: Future>(
    cancel: &CancellationToken,
    budget: Option<Duration>,
    fut: F,
) -> Result<F::Output, Halt> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Halt::Cancelled),
        out = async move {
            match budget {
                Some(budget) => tokio::time::timeout(budget, fut)
                    .await
                    .map_err(|_| Halt::TimedOut(budget)),
                None => Ok(fut.await),
            }
        } => out,
    }
}

/// State of an attempt, kept outside the step futures so it survives their
/// cancellation.
#[derive(Debug)]
struct Progress {
    step: DeployStep,
    source: Option<RemoteLocation>,
    report: MaterializeReport,
    commit_sha: Option<String>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            step: DeployStep::Validate,
            source: None,
            report: MaterializeReport::default(),
            commit_sha: None,
        }
    }
}

fn same_location(a: &RemoteLocation, b: &RemoteLocation) -> bool {
    a.owner().eq_ignore_ascii_case(b.owner())
        && a.repo().eq_ignore_ascii_case(b.repo())
        && a.reference() == b.reference()
}

/// Sequences fetch, gate, materialize and publish for deployment requests.
#[derive(Debug, Clone)]
pub struct Deployer {
    client: GitHubClient,
    credential: Credential,
    config: DeployConfig,
    progress: ProgressDisplay,
    scratch_parent: Option<PathBuf>,
}

impl Deployer {
    #[must_use]
    pub fn new(client: GitHubClient, credential: Credential, config: DeployConfig) -> Self {
        Self {
            client,
            credential,
            config,
            progress: ProgressDisplay::Silent,
            scratch_parent: None,
        }
    }

    /// Download progress display (silent by default).
    #[must_use]
    pub const fn with_progress(mut self, progress: ProgressDisplay) -> Self {
        self.progress = progress;
        self
    }

    /// Create scratch workspaces under `parent` instead of the system temp dir.
    #[must_use]
    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }

    /// Runs one deployment attempt to completion.
    pub async fn deploy(&self, request: &DeployRequest) -> DeploymentOutcome {
        self.deploy_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Runs one deployment attempt, stopping with `Cancelled` once `cancel`
    /// fires.
    #[instrument(
        name = "deploy",
        skip_all,
        fields(
            owner = request.destination_owner(),
            repo = request.destination_repo(),
            branch = request.destination_branch()
        )
    )]
    pub async fn deploy_with_cancellation(
        &self,
        request: &DeployRequest,
        cancel: CancellationToken,
    ) -> DeploymentOutcome {
        let mut progress = Progress::default();
        let result = self.run(request, &cancel, &mut progress).await;

        let (files_written, files_skipped) = progress.report.into_parts();
        let parts = OutcomeParts {
            dry_run: request.dry_run(),
            source_location: progress
                .source
                .as_ref()
                .map_or_else(|| request.source_url().to_string(), ToString::to_string),
            destination_location: format!(
                "{}/{}@{}",
                request.destination_owner(),
                request.destination_repo(),
                request.destination_branch()
            ),
            files_written,
            files_skipped,
            commit_sha: progress.commit_sha,
        };

        match result {
            Ok(()) => {
                let url = (!request.dry_run()).then(|| {
                    onboarding_link(
                        &self.config.onboarding_url,
                        request.destination_owner(),
                        request.destination_repo(),
                    )
                });
                info!(
                    written = parts.files_written.len(),
                    skipped = parts.files_skipped.len(),
                    commit = parts.commit_sha.as_deref().unwrap_or("-"),
                    "deployment finished"
                );
                DeploymentOutcome::succeeded(parts, url)
            }
            Err(e) => {
                error!(step = %e.step(), error = %e, "deployment failed");
                DeploymentOutcome::failed(parts, &e)
            }
        }
    }

    async fn run(
        &self,
        request: &DeployRequest,
        cancel: &CancellationToken,
        progress: &mut Progress,
    ) -> DeployResult<()> {
        progress.step = DeployStep::Validate;
        let destination = RemoteLocation::new(
            request.destination_owner(),
            request.destination_repo(),
            request.destination_branch(),
        )?;

        progress.step = DeployStep::Fetch;
        let fetch_options = FetchOptions {
            credential: Some(&self.credential),
            scratch_parent: self.scratch_parent.as_deref(),
            progress: self.progress,
        };
        let FetchedSource {
            workspace,
            location: source,
        } = bounded(
            cancel,
            Some(self.config.fetch_timeout()),
            fetch_source(
                &self.client,
                request.source_url(),
                request.source_branch(),
                fetch_options,
                cancel,
            ),
        )
        .await
        .map_err(|h| h.at(DeployStep::Fetch))??;
        progress.source = Some(source.clone());

        progress.step = DeployStep::CheckDestination;
        let exists = bounded(
            cancel,
            None,
            gate::destination_exists(&self.client, destination.slug(), &self.credential),
        )
        .await
        .map_err(|h| h.at(DeployStep::CheckDestination))??;

        // default branch of a repository created in this attempt
        let mut created: Option<String> = None;
        if !exists {
            if !request.create_if_missing() {
                return Err(DeployError::DestinationMissing(destination.slug().to_string()));
            }
            if request.dry_run() {
                info!(repo = %destination.slug(), "dry run: repository would be created");
            } else {
                progress.step = DeployStep::CreateRepository;
                created = Some(self.create_and_wait(&destination, cancel).await?);
            }
        }

        progress.step = DeployStep::Materialize;
        let applied = bounded(
            cancel,
            None,
            materialize::apply(
                workspace.tree(),
                request.files(),
                request.overwrite_existing(),
                &mut progress.report,
            ),
        )
        .await;
        applied.map_err(|h| h.at(DeployStep::Materialize))??;

        if request.dry_run() {
            info!(
                would_write = progress.report.written().len(),
                "dry run: stopping before publish"
            );
            return Ok(());
        }

        if progress.report.written().is_empty() && same_location(&source, &destination) {
            info!(destination = %destination, "nothing written and destination is the source, publish skipped");
            return Ok(());
        }

        let options = PublishOptions {
            allow_orphan: created.is_some(),
            upload_concurrency: self.config.upload_concurrency,
            default_branch: created.as_deref(),
        };
        let publisher = Publisher::new(&self.client, &self.credential);
        progress.step = DeployStep::ResolveBase;
        let published = bounded(
            cancel,
            Some(self.config.publish_timeout()),
            publisher.publish_tracked(
                workspace.tree(),
                &destination,
                request.commit_message(),
                options,
                &mut progress.step,
            ),
        )
        .await;
        let receipt = published.map_err(|h| h.at(progress.step))??;
        progress.commit_sha = Some(receipt.commit_sha);

        Ok(())
    }

    /// Creates the destination and waits for its initial commit; returns the
    /// new repository's default branch.
    async fn create_and_wait(
        &self,
        destination: &RemoteLocation,
        cancel: &CancellationToken,
    ) -> DeployResult<String> {
        let step = DeployStep::CreateRepository;
        let create_options = gate::CreateOptions {
            description: &self.config.repo_description,
            private: self.config.private_repos,
        };
        let info = bounded(
            cancel,
            None,
            gate::create_destination(
                &self.client,
                destination.slug(),
                &self.credential,
                create_options,
            ),
        )
        .await
        .map_err(|h| h.at(step))??;

        let visible = bounded(
            cancel,
            None,
            gate::wait_for_branch(
                &self.client,
                destination.slug(),
                &self.credential,
                &info.default_branch,
                self.config.creation_poll_interval(),
                self.config.creation_poll_timeout(),
            ),
        )
        .await
        .map_err(|h| h.at(step))?;
        if !visible {
            warn!(repo = %destination.slug(), "continuing without a visible base branch");
        }
        Ok(info.default_branch)
    }
}
