// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use bon::Builder;
use flume::bounded;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Directories never published: VCS metadata, dependency caches, build output.
pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "dist",
    "build",
    "out",
    ".next",
    "target",
    "coverage",
    ".nyc_output",
];

/// OS-generated files never published.
pub const NOISE_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// Options for parallel directory traversal.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Maximum depth to traverse (None = unlimited)
    #[builder(setters(name = with_max_depth))]
    max_depth: Option<usize>,
    #[builder(setters(name = with_follow_links), default = false)]
    follow_links: bool,
    #[builder(setters(name = with_include_hidden), default = true)]
    include_hidden: bool,
    /// Honour .gitignore / global excludes / .git/info/exclude
    #[builder(setters(name = with_respect_gitignore), default = false)]
    respect_gitignore: bool,
    /// Number of threads (None = auto-detect)
    #[builder(setters(name = with_threads))]
    threads: Option<usize>,
    /// Directory names pruned before descending (exact match)
    #[builder(setters(name = with_skip_dirs), default)]
    skip_dirs: Vec<String>,
    /// File names dropped from the result (exact match)
    #[builder(setters(name = with_skip_files), default)]
    skip_files: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub const fn follow_links(&self) -> bool {
        self.follow_links
    }

    #[must_use]
    pub const fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    #[must_use]
    pub const fn respect_gitignore(&self) -> bool {
        self.respect_gitignore
    }

    #[must_use]
    pub const fn threads(&self) -> Option<usize> {
        self.threads
    }

    #[must_use]
    pub fn skip_dirs(&self) -> &[String] {
        &self.skip_dirs
    }

    #[must_use]
    pub fn skip_files(&self) -> &[String] {
        &self.skip_files
    }

    /// Options for enumerating a working copy before publishing.
    ///
    /// - Includes hidden files (`.github/`, `.env.example`, ...)
    /// - Ignores ignore files: the tree is published as-is
    /// - Skips [`EXCLUDED_DIRS`] and [`NOISE_FILES`]
    #[must_use]
    pub fn for_workspace() -> Self {
        Self::builder()
            .with_skip_dirs(owned(EXCLUDED_DIRS))
            .with_skip_files(owned(NOISE_FILES))
            .build()
    }
}

/// Result of a parallel walk operation.
#[derive(Debug)]
pub struct WalkResult {
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
    error_count: usize,
}

impl WalkResult {
    pub(crate) const fn new(
        files: Vec<PathBuf>,
        directories: Vec<PathBuf>,
        error_count: usize,
    ) -> Self {
        Self {
            files,
            directories,
            error_count,
        }
    }

    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }
}

enum Found {
    File(PathBuf),
    Dir(PathBuf),
}

/// Builds a `WalkBuilder` with the given options, using `filter_entry` for skipping.
pub(super) fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    if let Some(depth) = options.max_depth() {
        builder.max_depth(Some(depth));
    }

    builder.follow_links(options.follow_links());
    builder.hidden(!options.include_hidden());

    builder.ignore(options.respect_gitignore());
    builder.git_ignore(options.respect_gitignore());
    builder.git_global(options.respect_gitignore());
    builder.git_exclude(options.respect_gitignore());
    builder.parents(options.respect_gitignore());

    if let Some(threads) = options.threads() {
        builder.threads(threads);
    }

    if !options.skip_dirs().is_empty() || !options.skip_files().is_empty() {
        let skip_dirs: Arc<Vec<String>> = Arc::new(options.skip_dirs().to_vec());
        let skip_files: Arc<Vec<String>> = Arc::new(options.skip_files().to_vec());
        builder.filter_entry(move |entry| {
            let Some(name) = entry.file_name().to_str() else {
                return true;
            };
            // the root itself is never pruned
            if entry.depth() == 0 {
                return true;
            }
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return !skip_dirs.iter().any(|skip| skip == name);
            }
            !skip_files.iter().any(|skip| skip == name)
        });
    }

    builder
}

/// Performs parallel directory traversal using `ignore::WalkParallel`.
///
/// Results are collected through a bounded flume channel; order is arbitrary.
///
/// # Errors
///
/// Returns an error if the root directory does not exist.
///
/// # Example
/// ```no_run
/// use smithery_deploy::utility::fs::walk::{parallel_walk, WalkOptions};
///
/// let result = parallel_walk("/path/to/checkout", &WalkOptions::for_workspace())?;
/// println!("Found {} files", result.files().len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parallel_walk<P: AsRef<Path>>(root: P, options: &WalkOptions) -> Result<WalkResult> {
    let root = root.as_ref();

    if !root.is_dir() {
        anyhow::bail!("root directory does not exist: {}", root.display());
    }

    let (tx, rx) = bounded::<Found>(1000);
    let error_count = Arc::new(AtomicUsize::new(0));

    let parallel = build_walker(root, options).build_parallel();

    // Drain on a scoped thread: the walkers block once the bounded channel fills.
    let (files, directories) = std::thread::scope(|scope| {
        let collector = scope.spawn(move || {
            let mut files = Vec::new();
            let mut directories = Vec::new();
            for found in rx.iter() {
                match found {
                    Found::File(p) => files.push(p),
                    Found::Dir(p) => directories.push(p),
                }
            }
            (files, directories)
        });

        parallel.run(|| {
            let tx = tx.clone();
            let error_count = Arc::clone(&error_count);

            Box::new(move |entry_result| {
                match entry_result {
                    Ok(entry) => {
                        let path = entry.path().to_path_buf();
                        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                            let _ = tx.send(Found::Dir(path));
                        } else if entry.file_type().is_some_and(|ft| ft.is_file()) {
                            let _ = tx.send(Found::File(path));
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "walk error");
                        error_count.fetch_add(1, Ordering::Relaxed);
                    }
                }
                ignore::WalkState::Continue
            })
        });

        drop(tx);
        collector.join().unwrap_or_default()
    });

    Ok(WalkResult::new(
        files,
        directories,
        error_count.load(Ordering::Relaxed),
    ))
}

/// Regular files under `root` as sorted, `/`-separated relative paths.
///
/// # Errors
///
/// Returns an error if the root does not exist or any entry could not be read;
/// a partial listing would publish an incomplete tree.
pub fn relative_files<P: AsRef<Path>>(root: P, options: &WalkOptions) -> Result<Vec<String>> {
    let root = root.as_ref();
    let result = parallel_walk(root, options)?;
    if result.error_count() > 0 {
        anyhow::bail!(
            "{} entries under {} could not be read",
            result.error_count(),
            root.display()
        );
    }

    let mut paths = Vec::with_capacity(result.files().len());
    for file in result.files() {
        let rel = file.strip_prefix(root)?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()
            .ok_or_else(|| anyhow::anyhow!("non UTF-8 path: {}", rel.display()))?;
        paths.push(parts.join("/"));
    }
    paths.sort();
    Ok(paths)
}
