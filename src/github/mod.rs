// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! GitHub hosting-service access.
//!
//! ```text
//! location   RepoSlug, RemoteLocation, Credential, URL parsing
//! types      wire payloads (serde)
//! client     GitHubClient: repos, identity, git data API
//! ```

pub mod client;
pub mod location;
pub mod types;


pub use client::{CredentialStatus, GitHubClient};
pub use location::{Credential, RemoteLocation, RepoSlug};
