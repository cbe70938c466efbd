// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Destination existence check and on-demand creation.

use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::error::{DeployError, DeployResult};
use crate::github::types::{CreateRepoRequest, RepoInfo};
use crate::github::{Credential, GitHubClient, RepoSlug};

/// Settings for repositories created by the gate.
#[derive(Debug, Clone, Copy)]
pub struct CreateOptions<'a> {
    pub description: &'a str,
    pub private: bool,
}

/// Whether `slug` exists and is visible to `credential`.
///
/// # Errors
///
/// Any answer other than success or 404 is `DeployError::ExistenceCheckFailed`.
pub async fn destination_exists(
    client: &GitHubClient,
    slug: &RepoSlug,
    credential: &Credential,
) -> DeployResult<bool> {
    let found = client
        .repository(slug, Some(credential))
        .await
        .map_err(|e| DeployError::ExistenceCheckFailed(Box::new(e)))?;
    debug!(repo = %slug, exists = found.is_some(), "destination checked");
    Ok(found.is_some())
}

/// Creates `slug` with an initial commit, under the authenticated user when
/// the owner is that user and under the organization otherwise.
///
/// # Errors
///
/// Returns `DeployError::RepoCreationFailed` if the identity lookup or the
/// creation request fails.
pub async fn create_destination(
    client: &GitHubClient,
    slug: &RepoSlug,
    credential: &Credential,
    options: CreateOptions<'_>,
) -> DeployResult<RepoInfo> {
    let user = client
        .authenticated_user(credential)
        .await
        .map_err(|e| DeployError::RepoCreationFailed(Box::new(e)))?;

    let org = (!user.login.eq_ignore_ascii_case(slug.owner())).then(|| slug.owner());
    let request = CreateRepoRequest {
        name: slug.repo(),
        description: options.description,
        private: options.private,
        auto_init: true,
    };

    let created = client
        .create_repository(credential, org, &request)
        .await
        .map_err(|e| DeployError::RepoCreationFailed(Box::new(e)))?;
    info!(repo = %created.full_name, url = %created.html_url, "destination repository created");
    Ok(created)
}

/// Polls until `branch` is visible on `slug` or `timeout` elapses.
///
/// Returns whether the branch appeared. Lookup errors count as "not yet".
pub async fn wait_for_branch(
    client: &GitHubClient,
    slug: &RepoSlug,
    credential: &Credential,
    branch: &str,
    interval: Duration,
    timeout: Duration,
) -> bool {
    // an unrepresentable deadline means no deadline
    let deadline = Instant::now().checked_add(timeout);
    let mut attempts = 0_u32;
    loop {
        attempts += 1;
        match client.branch_head(credential, slug, branch).await {
            Ok(Some(sha)) => {
                debug!(repo = %slug, branch, sha, attempts, "branch visible");
                return true;
            }
            Ok(None) => {}
            Err(e) => debug!(repo = %slug, branch, error = %e, "branch probe failed"),
        }
        let past_deadline = deadline.is_some_and(|deadline| {
            Instant::now()
                .checked_add(interval)
                .is_none_or(|next| next > deadline)
        });
        if past_deadline {
            warn!(
                repo = %slug,
                branch,
                waited_secs = timeout.as_secs(),
                "branch of new repository not visible yet"
            );
            return false;
        }
        sleep(interval).await;
    }
}
