// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared fixtures for integration tests: a mock API server and source
//! tarballs shaped like the hosting service's archives.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::{Value, json};
use smithery_deploy::config::types::GitHubConfig;
use smithery_deploy::github::{Credential, GitHubClient};
use tar::{EntryType, Header};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "ghp_integration";

/// Gzip tarball with every path under a `{owner}-{repo}-{sha}/` wrapper.
pub fn source_tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let wrapper = "acme-widget-0123abc";
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));

    let mut dir = Header::new_gnu();
    dir.set_entry_type(EntryType::Directory);
    dir.set_mode(0o755);
    dir.set_size(0);
    builder
        .append_data(&mut dir, format!("{wrapper}/"), &[][..])
        .unwrap();

    for (name, content) in files {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(content.len() as u64);
        builder
            .append_data(&mut header, format!("{wrapper}/{name}"), content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn client_for(server: &MockServer) -> GitHubClient {
    let config = GitHubConfig {
        api_base: server.uri(),
        ..GitHubConfig::default()
    };
    GitHubClient::new(&config).unwrap()
}

pub fn credential() -> Credential {
    Credential::new(TOKEN)
}

pub fn repo_json(owner: &str, repo: &str, default_branch: &str) -> Value {
    json!({
        "full_name": format!("{owner}/{repo}"),
        "default_branch": default_branch,
        "html_url": format!("https://github.com/{owner}/{repo}"),
        "private": false
    })
}

pub fn ref_json(branch: &str, sha: &str) -> Value {
    json!({
        "ref": format!("refs/heads/{branch}"),
        "object": { "sha": sha, "type": "commit" }
    })
}

pub async fn mount_repo(server: &MockServer, owner: &str, repo: &str, default_branch: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(owner, repo, default_branch)))
        .mount(server)
        .await;
}

pub async fn mount_tarball(server: &MockServer, owner: &str, repo: &str, reference: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}/tarball/{reference}")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/x-gzip")
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

/// Branch `branch` at commit `commit` whose tree is `tree`.
pub async fn mount_branch(server: &MockServer, owner: &str, repo: &str, branch: &str, commit: &str, tree: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}/git/ref/heads/{branch}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ref_json(branch, commit)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}/git/commits/{commit}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": commit,
            "tree": { "sha": tree }
        })))
        .mount(server)
        .await;
}

/// Blob, tree and commit endpoints answering with fixed ids.
pub async fn mount_git_writes(server: &MockServer, owner: &str, repo: &str, tree: &str, commit: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/repos/{owner}/{repo}/git/blobs")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "blob-sha" })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/repos/{owner}/{repo}/git/trees")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": tree })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/repos/{owner}/{repo}/git/commits")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": commit })))
        .mount(server)
        .await;
}

pub async fn mount_ref_update(server: &MockServer, owner: &str, repo: &str, branch: &str, commit: &str) {
    Mock::given(method("PATCH"))
        .and(path(format!("/repos/{owner}/{repo}/git/refs/heads/{branch}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ref_json(branch, commit)))
        .mount(server)
        .await;
}

/// JSON bodies of the requests received for `method_name path`.
pub async fn bodies(server: &MockServer, method_name: &str, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == method_name && r.url.path() == request_path)
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}
