// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for smithery-deploy.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. smithery-deploy.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. SMITHERY_DEPLOY_* env vars
//! 5. --set section.key=value
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! SMITHERY_DEPLOY_GITHUB__API_BASE=http://... → github.api_base
//! SMITHERY_DEPLOY_DEPLOY__UPLOAD_CONCURRENCY=4 → deploy.upload_concurrency
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

use loader::ConfigLoader;
use types::{DeployConfig, GitHubConfig, GlobalConfig};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "smithery-deploy.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SMITHERY_DEPLOY";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logging options.
    pub global: GlobalConfig,
    /// Hosting-service connection.
    pub github: GitHubConfig,
    /// Deployment defaults.
    pub deploy: DeployConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use smithery_deploy::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("smithery-deploy.toml")
    ///     .with_env_prefix("SMITHERY_DEPLOY")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<()> {
        self.github.validate()?;
        self.deploy.validate()?;
        Ok(())
    }

    /// Format configuration options for display, one `key = value` per line,
    /// deterministically ordered.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_github_options(&mut options);
        self.format_deploy_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert(
            "global.log_format".into(),
            format!("{:?}", self.global.log_format).to_lowercase(),
        );
    }

    fn format_github_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("github.api_base".into(), self.github.api_base.clone());
        options.insert("github.user_agent".into(), self.github.user_agent.clone());
        options.insert(
            "github.request_timeout_secs".into(),
            self.github.request_timeout_secs.to_string(),
        );
    }

    fn format_deploy_options(&self, options: &mut BTreeMap<String, String>) {
        let d = &self.deploy;
        options.insert("deploy.default_branch".into(), d.default_branch.clone());
        options.insert("deploy.commit_message".into(), d.commit_message.clone());
        options.insert("deploy.repo_description".into(), d.repo_description.clone());
        options.insert("deploy.private_repos".into(), d.private_repos.to_string());
        options.insert("deploy.onboarding_url".into(), d.onboarding_url.clone());
        options.insert(
            "deploy.fetch_timeout_secs".into(),
            d.fetch_timeout_secs.to_string(),
        );
        options.insert(
            "deploy.publish_timeout_secs".into(),
            d.publish_timeout_secs.to_string(),
        );
        options.insert(
            "deploy.creation_poll_interval_ms".into(),
            d.creation_poll_interval_ms.to_string(),
        );
        options.insert(
            "deploy.creation_poll_timeout_secs".into(),
            d.creation_poll_timeout_secs.to_string(),
        );
        options.insert(
            "deploy.upload_concurrency".into(),
            d.upload_concurrency.to_string(),
        );
    }
}
