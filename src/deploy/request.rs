// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deployment inputs.

use bon::Builder;
use std::collections::BTreeMap;

use crate::error::{DeployError, DeployResult};

/// Checks that `path` is a clean repository-relative path: forward slashes,
/// no leading slash, no empty, `.` or `..` segments.
///
/// # Errors
///
/// Returns `DeployError::InvalidPath` otherwise.
pub fn validate_path(path: &str) -> DeployResult<()> {
    let clean = !path.is_empty()
        && !path.contains('\\')
        && !path.contains('\0')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if clean {
        Ok(())
    } else {
        Err(DeployError::InvalidPath(path.to_string()))
    }
}

/// Files to place into the working copy, keyed by repository-relative path.
///
/// Iteration is sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: BTreeMap<String, Vec<u8>>,
}

impl FileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidPath` if `path` is not a clean relative path.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> DeployResult<()> {
        let path = path.into();
        validate_path(&path)?;
        self.entries.insert(path, content.into());
        Ok(())
    }

    /// Chaining form of [`Self::insert`].
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidPath` if `path` is not a clean relative path.
    pub fn with(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> DeployResult<Self> {
        self.insert(path, content)?;
        Ok(self)
    }

    /// Moves every entry of `other` into `self`; `other` wins on collisions.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_slice()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One deployment attempt: where to read from, where to publish, and what to add.
#[derive(Debug, Clone, Builder)]
pub struct DeployRequest {
    /// Browse, SSH or bare web URL of the source repository.
    #[builder(setters(name = with_source_url), into)]
    source_url: String,
    /// Source branch; the repository's default branch when unset.
    #[builder(setters(name = with_source_branch), into)]
    source_branch: Option<String>,
    #[builder(setters(name = with_destination_owner), into)]
    destination_owner: String,
    #[builder(setters(name = with_destination_repo), into)]
    destination_repo: String,
    #[builder(setters(name = with_destination_branch), into)]
    destination_branch: String,
    #[builder(setters(name = with_create_if_missing), default = true)]
    create_if_missing: bool,
    #[builder(setters(name = with_overwrite_existing), default = false)]
    overwrite_existing: bool,
    #[builder(setters(name = with_files), default)]
    files: FileSet,
    #[builder(setters(name = with_commit_message), into)]
    commit_message: String,
    /// Stop after the working copy is prepared; nothing is created remotely.
    #[builder(setters(name = with_dry_run), default = false)]
    dry_run: bool,
}

impl DeployRequest {
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    #[must_use]
    pub fn source_branch(&self) -> Option<&str> {
        self.source_branch.as_deref()
    }

    #[must_use]
    pub fn destination_owner(&self) -> &str {
        &self.destination_owner
    }

    #[must_use]
    pub fn destination_repo(&self) -> &str {
        &self.destination_repo
    }

    #[must_use]
    pub fn destination_branch(&self) -> &str {
        &self.destination_branch
    }

    #[must_use]
    pub const fn create_if_missing(&self) -> bool {
        self.create_if_missing
    }

    #[must_use]
    pub const fn overwrite_existing(&self) -> bool {
        self.overwrite_existing
    }

    #[must_use]
    pub const fn files(&self) -> &FileSet {
        &self.files
    }

    #[must_use]
    pub fn commit_message(&self) -> &str {
        &self.commit_message
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }
}
