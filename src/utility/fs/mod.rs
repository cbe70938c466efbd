// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem traversal.
//!
//! ```text
//! walk:  parallel_walk()   ignore::WalkParallel (multi-core)
//!        relative_files()  sorted repo-relative paths
//!        WalkOptions       hidden, gitignore, skip dirs/files
//! ```

pub mod walk;
