// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-attempt scratch directory.
//!
//! ```text
//! smithery-deploy-XXXXXX/       <- root (TempDir)
//!   archive.tar.gz              <- downloaded source
//!   tree/                       <- working copy
//! ```

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

const ARCHIVE_NAME: &str = "archive.tar.gz";
const TREE_NAME: &str = "tree";

/// Exclusively owned temporary directory, removed on drop.
///
/// Removal failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: Option<TempDir>,
    root: PathBuf,
    tree: PathBuf,
}

impl ScratchWorkspace {
    /// Creates a fresh workspace under `parent`, or the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("smithery-deploy-");
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        let root = dir.path().to_path_buf();
        let tree = root.join(TREE_NAME);
        std::fs::create_dir(&tree)?;
        debug!(path = %root.display(), "scratch workspace created");
        Ok(Self {
            dir: Some(dir),
            root,
            tree,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The working copy.
    #[must_use]
    pub fn tree(&self) -> &Path {
        &self.tree
    }

    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_NAME)
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!(path = %self.root.display(), "scratch workspace removed"),
                Err(e) => {
                    warn!(path = %self.root.display(), error = %e, "failed to remove scratch workspace");
                }
            }
        }
    }
}
