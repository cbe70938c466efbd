// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the `deploy`, `auth` and `detect` commands.

use clap::Args;
use std::path::PathBuf;

/// GitHub token source shared by commands that talk to the API.
#[derive(Debug, Clone, Default, Args)]
pub struct TokenArgs {
    /// GitHub token with `repo` scope.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,
}

/// Deploy command arguments.
#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// Source repository URL (https, ssh or github.com/owner/repo).
    #[arg(value_name = "SOURCE_URL")]
    pub source: String,

    /// Source branch; the repository's default branch when omitted.
    #[arg(short = 'b', long = "branch", value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Destination owner (user or organization).
    #[arg(short = 'o', long = "owner", value_name = "OWNER")]
    pub owner: String,

    /// Destination repository name; the source repository's name when omitted.
    #[arg(short = 'r', long = "repo", value_name = "REPO")]
    pub repo: Option<String>,

    /// Destination branch; `deploy.default_branch` when omitted.
    #[arg(short = 't', long = "target-branch", value_name = "BRANCH")]
    pub target_branch: Option<String>,

    /// Fail instead of creating a missing destination repository.
    #[arg(long = "no-create")]
    pub no_create: bool,

    /// Replace files that already exist in the source.
    #[arg(long)]
    pub overwrite: bool,

    /// Adds a file: DEST is the path in the repository, SRC a local file.
    /// Can be specified multiple times.
    #[arg(short = 'f', long = "file", value_name = "DEST=SRC", action = clap::ArgAction::Append)]
    pub files: Vec<String>,

    /// Detects the runtime of a local checkout and adds the generated
    /// smithery.yaml (and Dockerfile) to the file set.
    #[arg(short = 'g', long = "generate", value_name = "DIR")]
    pub generate: Option<PathBuf>,

    /// Commit message; `deploy.commit_message` when omitted.
    #[arg(short = 'm', long = "message", value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Print the outcome as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub token: TokenArgs,
}

/// Auth command arguments.
#[derive(Debug, Clone, Args)]
pub struct AuthArgs {
    /// Print the result as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub token: TokenArgs,
}

/// Detect command arguments.
#[derive(Debug, Clone, Args)]
pub struct DetectArgs {
    /// Project directory.
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Write the generated files into DIR.
    #[arg(short = 'w', long)]
    pub write: bool,

    /// With --write, replace files that already exist.
    #[arg(long, requires = "write")]
    pub force: bool,

    /// Print the detection as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}
