// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request and response payloads of the GitHub REST API.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! responses is ignored.

use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub full_name: String,
    pub default_branch: String,
    pub html_url: String,
    #[serde(default)]
    pub private: bool,
}

/// `GET /user`
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub login: String,
}

/// `POST /user/repos` and `POST /orgs/{org}/repos`
#[derive(Debug, Clone, Serialize)]
pub struct CreateRepoRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub private: bool,
    pub auto_init: bool,
}

/// Shared shape of `{ "sha": ... }` responses (blobs, trees, commits).
#[derive(Debug, Clone, Deserialize)]
pub struct ShaResponse {
    pub sha: String,
}

/// `POST /repos/{owner}/{repo}/git/blobs`
#[derive(Debug, Clone, Serialize)]
pub struct CreateBlobRequest<'a> {
    pub content: &'a str,
    pub encoding: &'static str,
}

/// Object kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Blob,
}

/// One row of a new tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub sha: String,
}

impl TreeEntry {
    /// Regular (non-executable) file mode.
    pub const FILE_MODE: &'static str = "100644";

    #[must_use]
    pub fn file(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: Self::FILE_MODE,
            kind: ObjectKind::Blob,
            sha: sha.into(),
        }
    }
}

/// `POST /repos/{owner}/{repo}/git/trees`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTreeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_tree: Option<&'a str>,
    pub tree: &'a [TreeEntry],
}

/// A commit to be created: message, tree and at most one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

impl CommitRecord {
    #[must_use]
    pub fn new(message: impl Into<String>, tree: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            message: message.into(),
            tree: tree.into(),
            parents: parent.into_iter().collect(),
        }
    }
}

/// `GET /repos/{owner}/{repo}/git/commits/{sha}`
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub tree: ShaResponse,
}

/// `GET /repos/{owner}/{repo}/git/ref/heads/{branch}`
#[derive(Debug, Clone, Deserialize)]
pub struct RefInfo {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: RefObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefObject {
    pub sha: String,
}

/// `PATCH /repos/{owner}/{repo}/git/refs/heads/{branch}`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRefRequest<'a> {
    pub sha: &'a str,
    pub force: bool,
}

/// `POST /repos/{owner}/{repo}/git/refs`
#[derive(Debug, Clone, Serialize)]
pub struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    pub name: &'a str,
    pub sha: &'a str,
}

/// Error body returned by the API on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
