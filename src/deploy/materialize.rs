// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Writes a [`FileSet`] into a working copy.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace};

use super::request::FileSet;
use crate::error::{DeployError, DeployResult};

/// Paths written and skipped by [`apply`], in file-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    written: Vec<String>,
    skipped: Vec<String>,
}

impl MaterializeReport {
    #[must_use]
    pub fn written(&self) -> &[String] {
        &self.written
    }

    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.written, self.skipped)
    }
}

fn failed(path: &str, source: std::io::Error) -> DeployError {
    DeployError::MaterializeFailed {
        path: path.into(),
        source: Box::new(source),
    }
}

/// Applies `files` to `root`.
///
/// Existing paths are left untouched unless `overwrite` is set; entries with
/// empty content are ignored. Progress is recorded in `report` as it happens,
/// so it is meaningful even when an error is returned.
///
/// # Errors
///
/// Returns `DeployError::MaterializeFailed` on the first I/O failure.
pub async fn apply(
    root: &Path,
    files: &FileSet,
    overwrite: bool,
    report: &mut MaterializeReport,
) -> DeployResult<()> {
    for (path, content) in files.iter() {
        if content.is_empty() {
            trace!(path, "empty entry ignored");
            continue;
        }

        let target = root.join(path);
        let exists = tokio::fs::try_exists(&target)
            .await
            .map_err(|e| failed(path, e))?;
        if exists && !overwrite {
            debug!(path, "exists, skipped");
            report.skipped.push(path.to_string());
            continue;
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| failed(path, e))?;
        }
        tokio::fs::write(&target, content)
            .await
            .map_err(|e| failed(path, e))?;
        debug!(path, bytes = content.len(), overwritten = exists, "written");
        report.written.push(path.to_string());
    }
    Ok(())
}
