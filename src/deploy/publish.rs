// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit publisher.
//!
//! Publishes a working copy as one commit, creating objects in dependency
//! order:
//!
//! ```text
//! ResolveBase --> EnumerateFiles --> CreateBlobs --> CreateTree
//!   ref heads/{branch}   walk         POST blobs      POST trees
//!   | missing: default,  (sorted)     (bounded        (base_tree +
//!   |  main, master                    concurrency)    100644 blobs)
//!   v                                                      |
//! NoBaseBranch unless allow_orphan                         v
//!                       UpdateRef <------------------ CreateCommit
//!            PATCH force, else POST refs             parents: [base]?
//! ```
//!
//! Each transition either advances or stops with the error of that step.
//! Objects created before a failure are left behind.

use futures_util::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ApiError, DeployError, DeployResult, DeployStep};
use crate::github::types::{CommitRecord, TreeEntry};
use crate::github::{Credential, GitHubClient, RemoteLocation};
use crate::utility::fs::walk::{WalkOptions, relative_files};

/// Branches probed, in order, when the target branch does not exist yet.
pub const BASE_CANDIDATES: &[&str] = &["main", "master"];

/// Publisher knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOptions<'a> {
    /// Permit a parentless commit when no base branch exists (fresh repository).
    pub allow_orphan: bool,
    /// Blob uploads in flight at once.
    pub upload_concurrency: usize,
    /// Known default branch of the destination, probed right after the target.
    pub default_branch: Option<&'a str>,
}

impl Default for PublishOptions<'_> {
    fn default() -> Self {
        Self {
            allow_orphan: false,
            upload_concurrency: 1,
            default_branch: None,
        }
    }
}

/// What a successful publish produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub commit_sha: String,
    pub tree_sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_sha: Option<String>,
    pub files: usize,
    /// The branch ref was created rather than moved.
    pub ref_created: bool,
}

/// Commit and tree the new commit builds on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Base {
    commit: String,
    tree: String,
}

/// Drives the blob, tree, commit and ref calls for one destination.
#[derive(Debug, Clone, Copy)]
pub struct Publisher<'a> {
    client: &'a GitHubClient,
    credential: &'a Credential,
}

fn base_failed(e: ApiError) -> DeployError {
    DeployError::BaseLookupFailed(Box::new(e))
}

impl<'a> Publisher<'a> {
    #[must_use]
    pub const fn new(client: &'a GitHubClient, credential: &'a Credential) -> Self {
        Self { client, credential }
    }

    /// Publishes `root` as a new commit on `destination`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails; see [`DeployStep`].
    pub async fn publish(
        &self,
        root: &Path,
        destination: &RemoteLocation,
        message: &str,
        options: PublishOptions<'_>,
    ) -> DeployResult<PublishReceipt> {
        let mut step = DeployStep::ResolveBase;
        self.publish_tracked(root, destination, message, options, &mut step)
            .await
    }

    /// Like [`Self::publish`], recording the step in progress in `step` so a
    /// caller that abandons the future (timeout) can tell where it stopped.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails.
    pub async fn publish_tracked(
        &self,
        root: &Path,
        destination: &RemoteLocation,
        message: &str,
        options: PublishOptions<'_>,
        step: &mut DeployStep,
    ) -> DeployResult<PublishReceipt> {
        *step = DeployStep::ResolveBase;
        let base = self.resolve_base(destination, options.default_branch).await?;
        if base.is_none() && !options.allow_orphan {
            return Err(DeployError::NoBaseBranch(destination.reference().to_string()));
        }

        *step = DeployStep::EnumerateFiles;
        let paths = enumerate(root.to_path_buf()).await?;
        info!(
            destination = %destination,
            files = paths.len(),
            base = base.as_ref().map_or("none", |b| b.commit.as_str()),
            "publishing"
        );

        *step = DeployStep::CreateBlobs;
        let entries = self
            .create_blobs(root, destination, &paths, options.upload_concurrency)
            .await?;

        *step = DeployStep::CreateTree;
        let tree_sha = self
            .client
            .create_tree(
                self.credential,
                destination.slug(),
                base.as_ref().map(|b| b.tree.as_str()),
                &entries,
            )
            .await
            .map_err(|e| DeployError::TreeCreationFailed(Box::new(e)))?;
        debug!(tree = %tree_sha, "tree created");

        *step = DeployStep::CreateCommit;
        let parent_sha = base.map(|b| b.commit);
        let record = CommitRecord::new(message, tree_sha.as_str(), parent_sha.clone());
        let commit_sha = self
            .client
            .create_commit(self.credential, destination.slug(), &record)
            .await
            .map_err(|e| DeployError::CommitCreationFailed(Box::new(e)))?;
        debug!(commit = %commit_sha, "commit created");

        *step = DeployStep::UpdateRef;
        let ref_created = self.move_branch(destination, &commit_sha).await?;
        info!(destination = %destination, commit = %commit_sha, ref_created, "branch updated");

        Ok(PublishReceipt {
            commit_sha,
            tree_sha,
            parent_sha,
            files: entries.len(),
            ref_created,
        })
    }

    /// Target branch, else the first existing fallback: the known default
    /// branch, then [`BASE_CANDIDATES`]. Each branch is probed once.
    async fn resolve_base(
        &self,
        destination: &RemoteLocation,
        default_branch: Option<&str>,
    ) -> DeployResult<Option<Base>> {
        let target = destination.reference();
        let mut candidates = vec![target];
        for branch in default_branch.into_iter().chain(BASE_CANDIDATES.iter().copied()) {
            if !candidates.contains(&branch) {
                candidates.push(branch);
            }
        }

        for branch in candidates {
            let head = self
                .client
                .branch_head(self.credential, destination.slug(), branch)
                .await
                .map_err(base_failed)?;
            if let Some(commit) = head {
                let tree = self
                    .client
                    .commit_tree(self.credential, destination.slug(), &commit)
                    .await
                    .map_err(base_failed)?;
                debug!(branch, commit = %commit, tree = %tree, "base resolved");
                return Ok(Some(Base { commit, tree }));
            }
            debug!(branch, "branch not found");
        }

        warn!(destination = %destination, "no base branch found");
        Ok(None)
    }

    async fn create_blobs(
        &self,
        root: &Path,
        destination: &RemoteLocation,
        paths: &[String],
        concurrency: usize,
    ) -> DeployResult<Vec<TreeEntry>> {
        let uploads = paths.iter().map(|path| async move {
            let blob_failed = |cause: ApiError| DeployError::BlobCreationFailed {
                path: path.as_str().into(),
                cause: Box::new(cause),
            };
            let content = tokio::fs::read(root.join(path))
                .await
                .map_err(|e| blob_failed(ApiError::Io(e)))?;
            let sha = self
                .client
                .create_blob(self.credential, destination.slug(), &content)
                .await
                .map_err(blob_failed)?;
            debug!(path = %path, sha = %sha, bytes = content.len(), "blob created");
            Ok::<_, DeployError>(TreeEntry::file(path.as_str(), sha))
        });

        stream::iter(uploads)
            .buffered(concurrency.max(1))
            .try_collect()
            .await
    }

    /// Force-moves the branch, creating it when the update is refused.
    ///
    /// Returns whether the ref was created.
    async fn move_branch(&self, destination: &RemoteLocation, sha: &str) -> DeployResult<bool> {
        let slug = destination.slug();
        let branch = destination.reference();
        match self
            .client
            .update_ref(self.credential, slug, branch, sha)
            .await
        {
            Ok(()) => Ok(false),
            Err(update_err) => {
                debug!(branch, error = %update_err, "ref update refused, creating ref");
                self.client
                    .create_ref(self.credential, slug, branch, sha)
                    .await
                    .map_err(|e| DeployError::RefUpdateFailed(Box::new(e)))?;
                Ok(true)
            }
        }
    }
}

/// Sorted repository-relative paths of the files to publish.
async fn enumerate(root: PathBuf) -> DeployResult<Vec<String>> {
    tokio::task::spawn_blocking(move || relative_files(&root, &WalkOptions::for_workspace()))
        .await
        .map_err(|e| DeployError::EnumerationFailed(e.to_string()))?
        .map_err(|e| DeployError::EnumerationFailed(format!("{e:#}")))
}
