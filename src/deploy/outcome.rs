// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deployment result record.

use serde::Serialize;

use crate::error::{DeployError, DeployStep};

/// Immutable summary of one deployment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentOutcome {
    success: bool,
    dry_run: bool,
    source_location: String,
    destination_location: String,
    files_written: Vec<String>,
    files_skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resulting_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_step: Option<DeployStep>,
}

/// Everything known about an attempt when it ends.
#[derive(Debug, Clone, Default)]
pub(crate) struct OutcomeParts {
    pub dry_run: bool,
    pub source_location: String,
    pub destination_location: String,
    pub files_written: Vec<String>,
    pub files_skipped: Vec<String>,
    pub commit_sha: Option<String>,
}

impl DeploymentOutcome {
    pub(crate) fn succeeded(parts: OutcomeParts, resulting_url: Option<String>) -> Self {
        Self {
            success: true,
            dry_run: parts.dry_run,
            source_location: parts.source_location,
            destination_location: parts.destination_location,
            files_written: parts.files_written,
            files_skipped: parts.files_skipped,
            resulting_url,
            commit_sha: parts.commit_sha,
            error_detail: None,
            failed_step: None,
        }
    }

    pub(crate) fn failed(parts: OutcomeParts, error: &DeployError) -> Self {
        Self {
            success: false,
            dry_run: parts.dry_run,
            source_location: parts.source_location,
            destination_location: parts.destination_location,
            files_written: parts.files_written,
            files_skipped: parts.files_skipped,
            resulting_url: None,
            commit_sha: parts.commit_sha,
            error_detail: Some(error.to_string()),
            failed_step: Some(error.step()),
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// `owner/repo@branch` of the fetched source, or the raw URL if it never
    /// resolved.
    #[must_use]
    pub fn source_location(&self) -> &str {
        &self.source_location
    }

    #[must_use]
    pub fn destination_location(&self) -> &str {
        &self.destination_location
    }

    #[must_use]
    pub fn files_written(&self) -> &[String] {
        &self.files_written
    }

    #[must_use]
    pub fn files_skipped(&self) -> &[String] {
        &self.files_skipped
    }

    /// Onboarding link for the destination; set on successful publishes.
    #[must_use]
    pub fn resulting_url(&self) -> Option<&str> {
        self.resulting_url.as_deref()
    }

    /// Commit created on the destination; `None` when nothing was published.
    #[must_use]
    pub fn commit_sha(&self) -> Option<&str> {
        self.commit_sha.as_deref()
    }

    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    #[must_use]
    pub const fn failed_step(&self) -> Option<DeployStep> {
        self.failed_step
    }
}

/// `{onboarding}?owner={owner}&repo={repo}`
#[must_use]
pub fn onboarding_link(onboarding_url: &str, owner: &str, repo: &str) -> String {
    let separator = if onboarding_url.contains('?') { '&' } else { '?' };
    format!("{onboarding_url}{separator}owner={owner}&repo={repo}")
}
