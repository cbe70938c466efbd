// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Runtime detection from marker files.

use anyhow::Context;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;

/// Deployment config file the platform reads.
pub const CONFIG_FILE: &str = "smithery.yaml";

const PYTHON_MARKERS: &[&str] = &["pyproject.toml", "requirements.txt", "setup.py"];
const DEPENDENCY_KEYS: &[&str] = &["dependencies", "devDependencies", "peerDependencies"];

/// Language or packaging of a server project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    TypeScript,
    JavaScript,
    Python,
    Go,
    Rust,
    /// Ships its own Dockerfile.
    Container,
    Unknown,
}

impl Runtime {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Container => "container",
            Self::Unknown => "unknown",
        }
    }

    /// Value of `runtime:` in the generated config.
    #[must_use]
    pub const fn config_runtime(self) -> Option<&'static str> {
        match self {
            Self::TypeScript => Some("typescript"),
            Self::Python => Some("python"),
            Self::JavaScript | Self::Go | Self::Rust | Self::Container => Some("container"),
            Self::Unknown => None,
        }
    }

    /// Whether a Dockerfile must be generated for this runtime.
    #[must_use]
    pub const fn needs_dockerfile(self) -> bool {
        matches!(self, Self::JavaScript | Self::Go | Self::Rust)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What [`detect_runtime`] found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub runtime: Runtime,
    /// Marker file that decided the runtime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<&'static str>,
    /// `smithery.yaml` is already present.
    pub has_config: bool,
}

fn has(dir: &Path, name: &str) -> bool {
    dir.join(name).is_file()
}

/// `typescript` in any dependency table of `package.json`.
fn declares_typescript(package_json: &Path) -> bool {
    let parsed = std::fs::read_to_string(package_json)
        .map_err(anyhow::Error::from)
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).map_err(Into::into));
    match parsed {
        Ok(manifest) => DEPENDENCY_KEYS.iter().any(|key| {
            manifest
                .get(key)
                .and_then(serde_json::Value::as_object)
                .is_some_and(|deps| deps.contains_key("typescript"))
        }),
        Err(e) => {
            warn!(path = %package_json.display(), error = %e, "unreadable package.json");
            false
        }
    }
}

/// Detects the runtime of the project in `dir`.
///
/// Priority: Dockerfile, package.json, Python markers, go.mod, Cargo.toml.
///
/// # Errors
///
/// Returns an error if `dir` is not a directory.
pub fn detect_runtime(dir: &Path) -> Result<Detection> {
    let meta = std::fs::metadata(dir)
        .with_context(|| format!("cannot read project directory {}", dir.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let (runtime, marker) = if has(dir, "Dockerfile") {
        (Runtime::Container, Some("Dockerfile"))
    } else if has(dir, "package.json") {
        if has(dir, "tsconfig.json") || declares_typescript(&dir.join("package.json")) {
            (Runtime::TypeScript, Some("package.json"))
        } else {
            (Runtime::JavaScript, Some("package.json"))
        }
    } else if let Some(marker) = PYTHON_MARKERS.iter().copied().find(|m| has(dir, m)) {
        (Runtime::Python, Some(marker))
    } else if has(dir, "go.mod") {
        (Runtime::Go, Some("go.mod"))
    } else if has(dir, "Cargo.toml") {
        (Runtime::Rust, Some("Cargo.toml"))
    } else {
        (Runtime::Unknown, None)
    };

    let detection = Detection {
        runtime,
        marker,
        has_config: has(dir, CONFIG_FILE),
    };
    debug!(dir = %dir.display(), runtime = %runtime, marker, has_config = detection.has_config, "runtime detected");
    Ok(detection)
}
