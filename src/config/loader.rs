// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Layered configuration for a deploy run.
//!
//! Layers are applied in the order they are added; `--set` assignments and
//! `SMITHERY_DEPLOY_*` variables sit on top of every file:
//!
//! ```text
//!  built-in defaults          (Config::default via serde)
//!  ./smithery-deploy.toml     add_toml_file_optional, skipped if absent
//!  --config a.toml b.toml     add_toml_file, later file wins
//!  SMITHERY_DEPLOY_DEPLOY__DEFAULT_BRANCH=dev
//!  --set deploy.default_branch=dev
//!        |
//!        v
//!  build() -> deserialize (unknown keys rejected) -> validate -> Config
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Environment, File, FileFormat};

use super::Config;
use crate::error::Result;

/// Where a configuration layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `--config` file; missing is an error.
    File(PathBuf),
    /// The working-directory default file, only listed when present.
    DefaultFile(PathBuf),
    /// Inline TOML text.
    Inline,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "[file] {}", path.display()),
            Self::DefaultFile(path) => write!(f, "[default] {}", path.display()),
            Self::Inline => f.write_str("[inline] <string>"),
        }
    }
}

/// Collects configuration layers and resolves them into a validated [`Config`].
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: Option<String>,
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            sources: Vec::new(),
        }
    }

    fn with_file(mut self, path: &Path, required: bool) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(required));
        self
    }

    /// Layers an explicitly requested TOML file.
    ///
    /// Nothing is read until [`Self::build`], which fails if the file is
    /// missing or not valid TOML.
    #[must_use]
    pub fn add_toml_file<P: AsRef<Path>>(self, path: P) -> Self {
        let path = path.as_ref();
        let mut loader = self.with_file(path, true);
        loader.sources.push(ConfigSource::File(path.to_path_buf()));
        loader
    }

    /// Layers a TOML file that may not exist, such as `smithery-deploy.toml`
    /// in the working directory.
    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<Path>>(self, path: P) -> Self {
        let path = path.as_ref();
        let mut loader = self.with_file(path, false);
        if path.exists() {
            loader
                .sources
                .push(ConfigSource::DefaultFile(path.to_path_buf()));
        }
        loader
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.sources.push(ConfigSource::Inline);
        self
    }

    /// Reads `PREFIX_SECTION__KEY` environment variables, e.g.
    /// `SMITHERY_DEPLOY_GITHUB__API_BASE`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Applies a `section.key=value` override as given to `--set`.
    ///
    /// Values stay strings here; `build` converts them to the field type.
    ///
    /// # Errors
    ///
    /// Returns an error if the string has no `=`, the key is empty, or the
    /// key is not a valid configuration path.
    pub fn set_assignment(mut self, assignment: &str) -> Result<Self> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got '{assignment}'"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("empty key in '{assignment}'");
        }
        self.builder = self
            .builder
            .set_override(key, value.trim())
            .map_err(|e| anyhow::anyhow!("invalid override '{key}': {e}"))?;
        Ok(self)
    }

    /// Resolves every layer into a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A `--config` file is missing or not valid TOML.
    /// - An environment variable or override cannot be converted to its field type.
    /// - A key is not a known setting.
    /// - A value fails [`Config::validate`].
    pub fn build(self) -> Result<Config> {
        let builder = match &self.env_prefix {
            Some(prefix) => self.builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
            None => self.builder,
        };
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// File and inline layers added so far, in application order.
    #[must_use]
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Numbered lines describing [`Self::sources`], for debug logging.
    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, source)| format!("{}. {source}", i + 1))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
