// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! Config: GlobalConfig, GitHubConfig, DeployConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::{LogFormat, LogLevel};

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Format of the log file.
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
            log_format: LogFormat::Text,
        }
    }
}

/// Hosting-service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// REST API root, without trailing slash.
    pub api_base: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds (archive downloads are bounded by
    /// `deploy.fetch_timeout_secs` instead).
    pub request_timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            user_agent: format!("smithery-deploy/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Checks that `api_base` is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for anything else.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.api_base.starts_with("https://") || self.api_base.starts_with("http://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                section: "github".to_string(),
                key: "api_base".to_string(),
                message: format!("expected an http(s) URL, got '{}'", self.api_base),
            })
        }
    }
}

/// Deployment defaults and time budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Destination branch when none is given on the command line.
    pub default_branch: String,
    /// Commit message when none is given on the command line.
    pub commit_message: String,
    /// Description used when the destination repository is created.
    pub repo_description: String,
    /// Create destination repositories as private.
    pub private_repos: bool,
    /// Onboarding page the outcome links back to.
    pub onboarding_url: String,
    /// Ceiling for the source archive download and extraction.
    pub fetch_timeout_secs: u64,
    /// Ceiling for the blob/tree/commit/ref sequence.
    pub publish_timeout_secs: u64,
    /// Delay between branch visibility probes after creating a repository.
    pub creation_poll_interval_ms: u64,
    /// How long to wait for a created repository's branch to appear.
    pub creation_poll_timeout_secs: u64,
    /// Blob uploads in flight at once (1 = strictly sequential).
    pub upload_concurrency: usize,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
            commit_message: "Add Smithery deployment configuration".to_string(),
            repo_description: "MCP server deployed with Smithery".to_string(),
            private_repos: false,
            onboarding_url: "https://smithery.ai/new".to_string(),
            fetch_timeout_secs: 300,
            publish_timeout_secs: 300,
            creation_poll_interval_ms: 1000,
            creation_poll_timeout_secs: 30,
            upload_concurrency: 1,
        }
    }
}

impl DeployConfig {
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[must_use]
    pub const fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    #[must_use]
    pub const fn creation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.creation_poll_interval_ms)
    }

    #[must_use]
    pub const fn creation_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.creation_poll_timeout_secs)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero concurrency or timeout.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            section: "deploy".to_string(),
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.upload_concurrency == 0 {
            return Err(invalid("upload_concurrency", "must be at least 1"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(invalid("fetch_timeout_secs", "must be at least 1"));
        }
        if self.publish_timeout_secs == 0 {
            return Err(invalid("publish_timeout_secs", "must be at least 1"));
        }
        if self.default_branch.trim().is_empty() {
            return Err(invalid("default_branch", "must not be empty"));
        }
        Ok(())
    }
}
