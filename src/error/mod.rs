// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                 DeployError (<= 40 bytes)
//!                       |
//!   +--------+----------+-----------+-----------+
//!   |        |          |           |           |
//!   v        v          v           v           v
//! Input    Fetch      Gate       Publish     Control
//! Invalid  Fetch      Exists?    Base/Blob   Timeout
//! Location Failed     Create     Tree/Commit Cancelled
//! Path                Missing    Ref
//!
//! Every network-facing variant carries a Box<ApiError>:
//!   ApiError  Http{status,url,message}, Transport, Decode, Io, Archive
//!
//! ConfigError  ReadError, ParseError, MissingKey, InvalidValue
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`DeployError`].
pub type DeployResult<T> = std::result::Result<T, DeployError>;

/// Result type using [`ApiError`].
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Step of a deployment attempt a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployStep {
    Validate,
    Fetch,
    CheckDestination,
    CreateRepository,
    Materialize,
    ResolveBase,
    EnumerateFiles,
    CreateBlobs,
    CreateTree,
    CreateCommit,
    UpdateRef,
}

impl DeployStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Fetch => "fetch",
            Self::CheckDestination => "check-destination",
            Self::CreateRepository => "create-repository",
            Self::Materialize => "materialize",
            Self::ResolveBase => "resolve-base",
            Self::EnumerateFiles => "enumerate-files",
            Self::CreateBlobs => "create-blobs",
            Self::CreateTree => "create-tree",
            Self::CreateCommit => "create-commit",
            Self::UpdateRef => "update-ref",
        }
    }
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one deployment attempt.
///
/// Each variant names the hosting-service call or local step that failed.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Source URL is not a recognised hosting-service shape, or an owner/repo
    /// identifier is not URL-safe.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// A file-set key is not a clean repository-relative path.
    #[error("invalid repository path '{0}'")]
    InvalidPath(String),

    /// Archive download or extraction failed.
    #[error("failed to fetch source: {0}")]
    FetchFailed(#[source] Box<ApiError>),

    /// The destination lookup failed for a reason other than "not found".
    #[error("failed to check destination repository: {0}")]
    ExistenceCheckFailed(#[source] Box<ApiError>),

    /// Destination does not exist and creation was not requested.
    #[error("destination repository {0} does not exist")]
    DestinationMissing(String),

    /// The creation endpoint rejected the request.
    #[error("failed to create repository: {0}")]
    RepoCreationFailed(#[source] Box<ApiError>),

    /// Writing a file into the workspace failed.
    #[error("failed to write '{path}': {source}")]
    MaterializeFailed {
        path: Box<str>,
        #[source]
        source: Box<std::io::Error>,
    },

    /// Branch or commit lookup on the destination failed.
    #[error("failed to resolve base commit: {0}")]
    BaseLookupFailed(#[source] Box<ApiError>),

    /// Neither the target branch nor `main`/`master` exists on the destination.
    #[error("branch '{0}' not found and no main/master branch to base it on")]
    NoBaseBranch(String),

    /// Enumerating the workspace failed.
    #[error("failed to enumerate workspace files: {0}")]
    EnumerationFailed(String),

    /// A blob upload failed.
    #[error("failed to create blob for '{path}': {cause}")]
    BlobCreationFailed { path: Box<str>, cause: Box<ApiError> },

    #[error("failed to create tree: {0}")]
    TreeCreationFailed(#[source] Box<ApiError>),

    #[error("failed to create commit: {0}")]
    CommitCreationFailed(#[source] Box<ApiError>),

    #[error("failed to update branch ref: {0}")]
    RefUpdateFailed(#[source] Box<ApiError>),

    /// The identity lookup rejected the credential.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// A step exceeded its time budget.
    #[error("{step} timed out after {seconds}s")]
    Timeout { step: DeployStep, seconds: u64 },

    /// The attempt was cancelled before completing.
    #[error("deployment cancelled during {step}")]
    Cancelled { step: DeployStep },
}

impl DeployError {
    /// The step this failure is attributed to.
    #[must_use]
    pub const fn step(&self) -> DeployStep {
        match self {
            Self::InvalidLocation(_) | Self::InvalidPath(_) | Self::InvalidCredential(_) => {
                DeployStep::Validate
            }
            Self::FetchFailed(_) => DeployStep::Fetch,
            Self::ExistenceCheckFailed(_) | Self::DestinationMissing(_) => {
                DeployStep::CheckDestination
            }
            Self::RepoCreationFailed(_) => DeployStep::CreateRepository,
            Self::MaterializeFailed { .. } => DeployStep::Materialize,
            Self::BaseLookupFailed(_) | Self::NoBaseBranch(_) => DeployStep::ResolveBase,
            Self::EnumerationFailed(_) => DeployStep::EnumerateFiles,
            Self::BlobCreationFailed { .. } => DeployStep::CreateBlobs,
            Self::TreeCreationFailed(_) => DeployStep::CreateTree,
            Self::CommitCreationFailed(_) => DeployStep::CreateCommit,
            Self::RefUpdateFailed(_) => DeployStep::UpdateRef,
            Self::Timeout { step, .. } | Self::Cancelled { step } => *step,
        }
    }

    /// Wraps an [`ApiError`] as a fetch failure.
    pub fn fetch(err: impl Into<ApiError>) -> Self {
        Self::FetchFailed(Box::new(err.into()))
    }
}

// --- Hosting API Errors ---

/// Errors talking to the hosting service or handling what it returned.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP response; `message` is the provider's own text.
    #[error("{method} {url} returned {status}: {message}")]
    Http {
        method: &'static str,
        status: u16,
        url: String,
        message: String,
    },

    /// Connection, TLS or body-streaming failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Local I/O while downloading, extracting or reading files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unsafe archive content.
    #[error("archive error: {0}")]
    Archive(String),

    /// The operation was interrupted.
    #[error("interrupted")]
    Interrupted,
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// 409 on a git data endpoint: the repository has no commits yet.
    #[must_use]
    pub const fn is_empty_repository(&self) -> bool {
        matches!(self.status(), Some(409))
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}
