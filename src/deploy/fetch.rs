// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Source fetcher: tarball download and extraction, no VCS client involved.
//!
//! ```text
//! source URL --parse--> RepoSlug
//!     |
//!     v  (no branch given)
//! GET /repos/{o}/{r} -> default_branch   (lookup failure -> "main")
//!     |
//!     v
//! GET /repos/{o}/{r}/tarball/{ref} -> root/archive.tar.gz
//!     |
//!     v  spawn_blocking
//! gzip + tar, strip wrapper dir -> root/tree/
//! ```

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::workspace::ScratchWorkspace;
use crate::error::{ApiError, ApiResult, DeployError, DeployResult, DeployStep};
use crate::github::{Credential, GitHubClient, RemoteLocation, RepoSlug};
use crate::net::{Downloader, ProgressDisplay};

/// Branch assumed when the default-branch lookup fails.
pub const FALLBACK_BRANCH: &str = "main";

/// A materialized source checkout.
#[derive(Debug)]
pub struct FetchedSource {
    pub workspace: ScratchWorkspace,
    pub location: RemoteLocation,
}

/// Source fetch parameters.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions<'a> {
    pub credential: Option<&'a Credential>,
    pub scratch_parent: Option<&'a Path>,
    pub progress: ProgressDisplay,
}

fn from_api(err: ApiError) -> DeployError {
    match err {
        ApiError::Interrupted => DeployError::Cancelled {
            step: DeployStep::Fetch,
        },
        other => DeployError::fetch(other),
    }
}

/// Resolves the branch to fetch: the explicit one, else the default branch.
async fn resolve_branch(
    client: &GitHubClient,
    slug: &RepoSlug,
    branch: Option<&str>,
    credential: Option<&Credential>,
) -> String {
    if let Some(branch) = branch.map(str::trim).filter(|b| !b.is_empty()) {
        return branch.to_string();
    }
    match client.repository(slug, credential).await {
        Ok(Some(info)) => info.default_branch,
        Ok(None) => {
            warn!(repo = %slug, fallback = FALLBACK_BRANCH, "repository not visible, assuming default branch");
            FALLBACK_BRANCH.to_string()
        }
        Err(e) => {
            warn!(repo = %slug, error = %e, fallback = FALLBACK_BRANCH, "default branch lookup failed");
            FALLBACK_BRANCH.to_string()
        }
    }
}

/// Downloads `source_url` at `branch` into a fresh scratch workspace.
///
/// On failure the workspace is removed before the error is returned.
///
/// # Errors
///
/// - `DeployError::InvalidLocation` for an unrecognised URL or branch name
/// - `DeployError::FetchFailed` for download or extraction failures
/// - `DeployError::Cancelled` if `cancel` fires mid-transfer
pub async fn fetch_source(
    client: &GitHubClient,
    source_url: &str,
    branch: Option<&str>,
    options: FetchOptions<'_>,
    cancel: &CancellationToken,
) -> DeployResult<FetchedSource> {
    let slug = RepoSlug::parse_url(source_url)?;
    let branch = resolve_branch(client, &slug, branch, options.credential).await;
    let location = RemoteLocation::new(slug.owner(), slug.repo(), branch)?;

    let workspace =
        ScratchWorkspace::create(options.scratch_parent).map_err(DeployError::fetch)?;

    info!(source = %location, "downloading source archive");
    let bytes = Downloader::new()
        .client(client.http().clone())
        .url(client.tarball_url(location.slug(), location.reference()))
        .file(workspace.archive_path())
        .headers(GitHubClient::download_headers(options.credential))
        .cancel_token(cancel.clone())
        .progress(options.progress)
        .download()
        .await
        .map_err(from_api)?;
    debug!(bytes, "source archive downloaded");

    // The blocking task owns the workspace until it returns, so the directory
    // is never removed while entries are still being unpacked into it. The
    // guard stops extraction when this future is dropped by a timeout.
    let stop = cancel.child_token();
    let _stop_on_drop = stop.clone().drop_guard();
    let (workspace, extracted) = tokio::task::spawn_blocking(move || {
        let extracted = extract_tarball(&workspace.archive_path(), workspace.tree(), &stop);
        (workspace, extracted)
    })
    .await
    .map_err(|e| DeployError::fetch(ApiError::Archive(e.to_string())))?;
    let extracted = extracted.map_err(from_api)?;

    // the archive is not part of the working copy
    if let Err(e) = tokio::fs::remove_file(workspace.archive_path()).await {
        debug!(error = %e, "could not remove archive");
    }
    info!(source = %location, files = extracted, "source materialized");

    Ok(FetchedSource {
        workspace,
        location,
    })
}

/// Relative path of an archive entry below its wrapper directory.
///
/// `None` for the wrapper itself; an error for `..`, absolute or prefixed paths.
fn strip_wrapper(path: &Path) -> ApiResult<Option<PathBuf>> {
    let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));
    match components.next() {
        Some(Component::Normal(_)) => {}
        None => return Ok(None),
        Some(_) => {
            return Err(ApiError::Archive(format!(
                "unsafe entry path '{}'",
                path.display()
            )));
        }
    }

    let mut rel = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => rel.push(part),
            _ => {
                return Err(ApiError::Archive(format!(
                    "unsafe entry path '{}'",
                    path.display()
                )));
            }
        }
    }
    Ok((!rel.as_os_str().is_empty()).then_some(rel))
}

/// Extracts a gzip tarball into `dest`, dropping the single top-level wrapper
/// directory. Only regular files and directories are materialized.
///
/// Returns the number of files written. `stop` is checked before every entry.
///
/// # Errors
///
/// Returns `ApiError::Archive` for unsafe entry paths, `ApiError::Io` for
/// corrupt archives or write failures and `ApiError::Interrupted` once `stop`
/// is cancelled.
pub fn extract_tarball(archive: &Path, dest: &Path, stop: &CancellationToken) -> ApiResult<usize> {
    let file = File::open(archive)?;
    let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut files = 0;

    for entry in tarball.entries()? {
        if stop.is_cancelled() {
            debug!(files, "extraction interrupted");
            return Err(ApiError::Interrupted);
        }
        let mut entry = entry?;
        let kind = entry.header().entry_type();
        if !kind.is_file() && !kind.is_dir() {
            continue;
        }

        let path = entry.path()?.into_owned();
        let Some(rel) = strip_wrapper(&path)? else {
            continue;
        };
        let target = dest.join(&rel);

        if kind.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
        files += 1;
    }

    Ok(files)
}
