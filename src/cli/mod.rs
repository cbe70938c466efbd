// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! smithery-deploy [global options] <command>
//! deploy <SOURCE_URL> --owner O [--repo R] [--file DEST=SRC]... [--generate DIR]
//! auth
//! detect [DIR] [--write] [--force]
//! options
//! version
//! ```

pub mod deploy;
pub mod global;


use crate::cli::deploy::{AuthArgs, DeployArgs, DetectArgs};
use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Publish a server repository, prepared for Smithery, to GitHub.
#[derive(Debug, Parser)]
#[command(
    name = "smithery-deploy",
    author,
    version,
    about = "Prepare a server repository for Smithery and publish it to GitHub",
    long_about = "smithery-deploy Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Fetches a GitHub repository, adds deployment files to it and\n\
                  publishes the result as one commit through the GitHub API.\n\
                  No git installation is needed.",
    after_help = "CONFIGURATION:\n\n\
                  smithery-deploy reads `smithery-deploy.toml` from the current\n\
                  directory when present, then every --config file in order, then\n\
                  SMITHERY_DEPLOY_<SECTION>__<KEY> environment variables, then\n\
                  --set overrides. Use `smithery-deploy options` to print the result."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Fetches a repository, adds files and publishes it.
    Deploy(DeployArgs),

    /// Checks a GitHub token.
    Auth(AuthArgs),

    /// Detects a project's runtime and optionally writes its deployment files.
    Detect(DetectArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
