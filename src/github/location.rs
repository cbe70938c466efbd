// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository locations and credentials.
//!
//! ```text
//! https://github.com/acme/widget(.git)(/tree/..)   browse
//! git@github.com:acme/widget(.git)                 ssh
//! ssh://git@github.com/acme/widget(.git)           ssh
//! github.com/acme/widget | www.github.com/...      bare web
//!            |
//!            v
//!      RepoSlug { owner, repo } --(+ ref)--> RemoteLocation
//! ```

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{DeployError, DeployResult};

fn url_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            // browse form, optionally with extra path (tree/blob views)
            r"^https?://(?:www\.)?github\.com/(?P<owner>[^/\s]+)/(?P<repo>[^/\s#?]+?)(?:\.git)?(?:/[^\s]*)?(?:[?#][^\s]*)?$",
            // ssh forms
            r"^(?:ssh://)?git@github\.com[:/](?P<owner>[^/\s]+)/(?P<repo>[^/\s]+?)(?:\.git)?/?$",
            // bare web form
            r"^(?:www\.)?github\.com/(?P<owner>[^/\s]+)/(?P<repo>[^/\s#?]+?)(?:\.git)?/?$",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// GitHub user/org names: alphanumerics and single inner hyphens, max 39.
fn is_valid_owner(owner: &str) -> bool {
    !owner.is_empty()
        && owner.len() <= 39
        && !owner.starts_with('-')
        && !owner.ends_with('-')
        && !owner.contains("--")
        && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_repo(repo: &str) -> bool {
    !repo.is_empty()
        && repo.len() <= 100
        && repo != "."
        && repo != ".."
        && repo
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Owner/name pair of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoSlug {
    owner: String,
    repo: String,
}

impl RepoSlug {
    /// Validates and builds a slug.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidLocation` if either part is empty or not
    /// URL-safe.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> DeployResult<Self> {
        let owner = owner.into();
        let repo = repo.into();
        if !is_valid_owner(&owner) {
            return Err(DeployError::InvalidLocation(format!(
                "'{owner}' is not a valid owner name"
            )));
        }
        if !is_valid_repo(&repo) {
            return Err(DeployError::InvalidLocation(format!(
                "'{repo}' is not a valid repository name"
            )));
        }
        Ok(Self { owner, repo })
    }

    /// Parses a hosting-service URL in browse, SSH or bare web form.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidLocation` for any other shape.
    pub fn parse_url(url: &str) -> DeployResult<Self> {
        let trimmed = url.trim();
        for pattern in url_patterns() {
            if let Some(caps) = pattern.captures(trimmed) {
                let owner = &caps["owner"];
                let repo = &caps["repo"];
                return Self::new(owner, repo).map_err(|_| {
                    DeployError::InvalidLocation(format!(
                        "'{trimmed}' does not name a valid repository"
                    ))
                });
            }
        }
        Err(DeployError::InvalidLocation(format!(
            "'{trimmed}' is not a GitHub repository URL"
        )))
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Attaches a branch or tag.
    #[must_use]
    pub fn at(self, reference: impl Into<String>) -> RemoteLocation {
        RemoteLocation {
            slug: self,
            reference: reference.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A branch or tag within a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteLocation {
    #[serde(flatten)]
    slug: RepoSlug,
    #[serde(rename = "ref")]
    reference: String,
}

impl RemoteLocation {
    /// # Errors
    ///
    /// Returns `DeployError::InvalidLocation` if owner, repo or ref is invalid.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        reference: impl Into<String>,
    ) -> DeployResult<Self> {
        let reference = reference.into();
        if !is_valid_ref(&reference) {
            return Err(DeployError::InvalidLocation(format!(
                "'{reference}' is not a valid branch name"
            )));
        }
        Ok(RepoSlug::new(owner, repo)?.at(reference))
    }

    #[must_use]
    pub const fn slug(&self) -> &RepoSlug {
        &self.slug
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        self.slug.owner()
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        self.slug.repo()
    }

    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.slug, self.reference)
    }
}

/// Branch names that can be placed in an API path unescaped.
fn is_valid_ref(reference: &str) -> bool {
    !reference.is_empty()
        && !reference.starts_with('/')
        && !reference.ends_with('/')
        && !reference.contains("..")
        && !reference.contains("//")
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
}

/// Bearer token for the hosting service.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([hidden])")
    }
}
