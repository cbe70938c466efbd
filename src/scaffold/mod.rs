// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Runtime scaffolding.
//!
//! ```text
//! project dir --detect_runtime()--> Runtime
//!                                      |
//!        typescript / python ----------+--> smithery.yaml (runtime: ...)
//!        javascript / go / rust -------+--> smithery.yaml (container) + Dockerfile
//!        container (own Dockerfile) ---+--> smithery.yaml (container)
//!        unknown ----------------------'--> error
//! ```

pub mod detect;
pub mod templates;

#[cfg(test)]
mod tests;

use anyhow::Context;
use std::path::Path;
use tracing::info;

use crate::deploy::FileSet;
use crate::error::Result;

pub use detect::{CONFIG_FILE, Detection, Runtime, detect_runtime};

/// Generated files for one project.
#[derive(Debug, Clone)]
pub struct Scaffold {
    pub detection: Detection,
    pub files: FileSet,
}

/// Package name from `Cargo.toml`, read with the same TOML loader as the
/// application config.
fn cargo_package_name(dir: &Path) -> Result<String> {
    let manifest = dir.join("Cargo.toml");
    let parsed = config::Config::builder()
        .add_source(config::File::from(manifest.as_path()).format(config::FileFormat::Toml))
        .build()
        .with_context(|| format!("failed to parse {}", manifest.display()))?;
    parsed
        .get_string("package.name")
        .with_context(|| format!("{} has no [package] name", manifest.display()))
}

/// Detects the runtime of `dir` and renders its deployment files.
///
/// # Errors
///
/// Returns an error if the runtime is unknown or a manifest cannot be read.
pub fn scaffold(dir: &Path) -> Result<Scaffold> {
    let detection = detect_runtime(dir)?;
    let runtime = detection.runtime;

    let mut files = FileSet::new();
    let config = match runtime {
        Runtime::TypeScript | Runtime::Python => {
            templates::native_config(runtime.as_str())
        }
        Runtime::JavaScript | Runtime::Go | Runtime::Rust | Runtime::Container => {
            templates::container_config()
        }
        Runtime::Unknown => anyhow::bail!(
            "could not detect a runtime in {} (expected Dockerfile, package.json, pyproject.toml, requirements.txt, setup.py, go.mod or Cargo.toml)",
            dir.display()
        ),
    };
    files.insert(CONFIG_FILE, config)?;

    if runtime.needs_dockerfile() {
        let dockerfile = match runtime {
            Runtime::Go => templates::go_dockerfile(),
            Runtime::Rust => templates::rust_dockerfile(&cargo_package_name(dir)?),
            _ => templates::node_dockerfile(),
        };
        files.insert("Dockerfile", dockerfile)?;
    }

    info!(
        dir = %dir.display(),
        runtime = %runtime,
        files = files.len(),
        "scaffold generated"
    );
    Ok(Scaffold { detection, files })
}
