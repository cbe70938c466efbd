// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end deployment scenarios against a mock API.
//!
//! Covers:
//! - Publishing into an existing repository
//! - Resolving the source's default branch
//! - Skipping the publish when nothing changes in place
//! - Creating a missing destination on top of its initial commit
//! - Dry runs and `create_if_missing = false`
//! - Idempotent re-runs

mod common;

use common::{
    bodies, client_for, credential, mount_branch, mount_git_writes, mount_ref_update, mount_repo,
    mount_tarball, ref_json, repo_json, source_tarball,
};
use serde_json::json;
use smithery_deploy::config::types::DeployConfig;
use smithery_deploy::deploy::{DeployRequest, Deployer, FileSet, gate};
use smithery_deploy::error::DeployStep;
use smithery_deploy::github::RepoSlug;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG_YAML: &str = "runtime: typescript\n";

fn deployer(server: &MockServer, scratch: &Path) -> Deployer {
    let config = DeployConfig {
        creation_poll_interval_ms: 10,
        creation_poll_timeout_secs: 0,
        ..DeployConfig::default()
    };
    Deployer::new(client_for(server), credential(), config).with_scratch_parent(scratch)
}

fn config_files() -> FileSet {
    FileSet::new()
        .with("smithery.yaml", CONFIG_YAML)
        .unwrap()
}

fn request(owner: &str, repo: &str, files: FileSet) -> DeployRequest {
    DeployRequest::builder()
        .with_source_url("https://github.com/acme/widget")
        .with_source_branch("main")
        .with_destination_owner(owner)
        .with_destination_repo(repo)
        .with_destination_branch("main")
        .with_files(files)
        .with_commit_message("Add Smithery deployment configuration")
        .build()
}

async fn mount_source(server: &MockServer, files: &[(&str, &str)]) {
    mount_tarball(server, "acme", "widget", "main", source_tarball(files)).await;
}

/// Destination exists, files are added on top of its branch.
#[tokio::test]
async fn deploy_into_existing_repository() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("package.json", "{}"), ("src/index.ts", "")]).await;
    mount_repo(&server, "octo", "widget", "main").await;
    mount_branch(&server, "octo", "widget", "main", "C1", "T1").await;
    mount_git_writes(&server, "octo", "widget", "T2", "C2").await;
    mount_ref_update(&server, "octo", "widget", "main", "C2").await;

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("octo", "widget", config_files()))
        .await;

    assert!(outcome.success(), "{outcome:?}");
    insta::assert_json_snapshot!(outcome, @r#"
    {
      "success": true,
      "dry_run": false,
      "source_location": "acme/widget@main",
      "destination_location": "octo/widget@main",
      "files_written": [
        "smithery.yaml"
      ],
      "files_skipped": [],
      "resulting_url": "https://smithery.ai/new?owner=octo&repo=widget",
      "commit_sha": "C2"
    }
    "#);
    assert_eq!(
        bodies(&server, "POST", "/repos/octo/widget/git/blobs").await.len(),
        3
    );
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

/// Deploying a repository onto itself with nothing new.
#[tokio::test]
async fn deploy_in_place_without_changes_skips_publish() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("smithery.yaml", CONFIG_YAML)]).await;
    mount_repo(&server, "ACME", "Widget", "main").await;
    for endpoint in ["blobs", "trees", "commits"] {
        Mock::given(method("POST"))
            .and(path(format!("/repos/ACME/Widget/git/{endpoint}")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "x" })))
            .expect(0)
            .mount(&server)
            .await;
    }

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("ACME", "Widget", config_files()))
        .await;

    assert!(outcome.success(), "{outcome:?}");
    assert_eq!(outcome.files_skipped(), ["smithery.yaml"]);
    assert!(outcome.files_written().is_empty());
    assert_eq!(outcome.commit_sha(), None);
    assert!(outcome.resulting_url().is_some());
}

/// Destination is missing and its initial commit never shows up: the files
/// land in a parentless commit.
#[tokio::test]
async fn deploy_creates_missing_repository() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("requirements.txt", "mcp\n")]).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octo" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_partial_json(json!({ "name": "fresh", "auto_init": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(repo_json("octo", "fresh", "main")))
        .expect(1)
        .mount(&server)
        .await;
    mount_git_writes(&server, "octo", "fresh", "T0", "C0").await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/fresh/git/refs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(ref_json("main", "C0")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("octo", "fresh", config_files()))
        .await;

    assert!(outcome.success(), "{outcome:?}");
    assert_eq!(outcome.commit_sha(), Some("C0"));
    let commits = bodies(&server, "POST", "/repos/octo/fresh/git/commits").await;
    assert_eq!(commits[0]["parents"], json!([]));
}

#[tokio::test]
async fn deploy_creates_repository_in_organization() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("go.mod", "module x\n")]).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octo" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/orgs/tools-org/repos"))
        .respond_with(ResponseTemplate::new(201).set_body_json(repo_json("tools-org", "widget", "main")))
        .expect(1)
        .mount(&server)
        .await;
    // the initial commit shows up while polling
    mount_branch(&server, "tools-org", "widget", "main", "INIT", "TINIT").await;
    mount_git_writes(&server, "tools-org", "widget", "T1", "C1").await;
    mount_ref_update(&server, "tools-org", "widget", "main", "C1").await;

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("tools-org", "widget", config_files()))
        .await;

    assert!(outcome.success(), "{outcome:?}");
    assert_eq!(outcome.files_written(), ["smithery.yaml"]);
    // the placeholder from the initial commit stays next to the new file
    let trees = bodies(&server, "POST", "/repos/tools-org/widget/git/trees").await;
    assert_eq!(trees[0]["base_tree"], "TINIT");
    assert!(
        trees[0]["tree"]
            .as_array()
            .unwrap()
            .iter()
            .any(|entry| entry["path"] == "smithery.yaml")
    );
    let commits = bodies(&server, "POST", "/repos/tools-org/widget/git/commits").await;
    assert_eq!(commits[0]["parents"], json!(["INIT"]));
}

#[tokio::test]
async fn deploy_created_repository_with_other_default_branch() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("package.json", "{}")]).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octo" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(201).set_body_json(repo_json("octo", "fresh", "trunk")))
        .mount(&server)
        .await;
    mount_branch(&server, "octo", "fresh", "trunk", "INIT", "TINIT").await;
    mount_git_writes(&server, "octo", "fresh", "T1", "C1").await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/fresh/git/refs"))
        .and(body_partial_json(json!({ "ref": "refs/heads/main", "sha": "C1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(ref_json("main", "C1")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("octo", "fresh", config_files()))
        .await;

    assert!(outcome.success(), "{outcome:?}");
    let trees = bodies(&server, "POST", "/repos/octo/fresh/git/trees").await;
    assert_eq!(trees[0]["base_tree"], "TINIT");
    let commits = bodies(&server, "POST", "/repos/octo/fresh/git/commits").await;
    assert_eq!(commits[0]["parents"], json!(["INIT"]));
}

#[tokio::test]
async fn deploy_fetches_source_default_branch() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_repo(&server, "acme", "widget", "dev").await;
    mount_tarball(&server, "acme", "widget", "dev", source_tarball(&[("go.mod", "module x\n")])).await;
    mount_repo(&server, "octo", "widget", "main").await;
    mount_branch(&server, "octo", "widget", "main", "C1", "T1").await;
    mount_git_writes(&server, "octo", "widget", "T2", "C2").await;
    mount_ref_update(&server, "octo", "widget", "main", "C2").await;

    let request = DeployRequest::builder()
        .with_source_url("https://github.com/acme/widget")
        .with_destination_owner("octo")
        .with_destination_repo("widget")
        .with_destination_branch("main")
        .with_files(config_files())
        .with_commit_message("msg")
        .build();
    let outcome = deployer(&server, scratch.path()).deploy(&request).await;

    assert!(outcome.success(), "{outcome:?}");
    assert_eq!(outcome.source_location(), "acme/widget@dev");
}

#[tokio::test]
async fn wait_for_branch_accepts_unbounded_timeout() {
    let server = MockServer::start().await;
    mount_branch(&server, "octo", "widget", "main", "C1", "T1").await;
    let slug = RepoSlug::parse_url("https://github.com/octo/widget").unwrap();

    let visible = gate::wait_for_branch(
        &client_for(&server),
        &slug,
        &credential(),
        "main",
        Duration::from_millis(10),
        Duration::MAX,
    )
    .await;

    assert!(visible);
}

#[tokio::test]
async fn deploy_creation_rejected() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("a", "b")]).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octo" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "name already exists on this account" })),
        )
        .mount(&server)
        .await;

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("octo", "fresh", config_files()))
        .await;

    assert!(!outcome.success());
    assert_eq!(outcome.failed_step(), Some(DeployStep::CreateRepository));
    assert!(
        outcome
            .error_detail()
            .unwrap()
            .contains("name already exists on this account")
    );
}

#[tokio::test]
async fn deploy_missing_destination_without_create() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("a", "b")]).await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let request = DeployRequest::builder()
        .with_source_url("https://github.com/acme/widget")
        .with_source_branch("main")
        .with_destination_owner("octo")
        .with_destination_repo("gone")
        .with_destination_branch("main")
        .with_create_if_missing(false)
        .with_files(config_files())
        .with_commit_message("msg")
        .build();
    let outcome = deployer(&server, scratch.path()).deploy(&request).await;

    assert!(!outcome.success());
    assert_eq!(outcome.failed_step(), Some(DeployStep::CheckDestination));
    assert_eq!(
        outcome.error_detail(),
        Some("destination repository octo/gone does not exist")
    );
    assert_eq!(outcome.resulting_url(), None);
}

#[tokio::test]
async fn deploy_existence_check_error_is_not_missing() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("a", "b")]).await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/widget"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("octo", "widget", config_files()))
        .await;

    assert!(!outcome.success());
    assert_eq!(outcome.failed_step(), Some(DeployStep::CheckDestination));
}

#[tokio::test]
async fn deploy_dry_run_creates_nothing() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("package.json", "{}")]).await;
    for (verb, endpoint) in [
        ("POST", "/user/repos"),
        ("POST", "/repos/octo/fresh/git/blobs"),
        ("POST", "/repos/octo/fresh/git/refs"),
    ] {
        Mock::given(method(verb))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
    }

    let request = DeployRequest::builder()
        .with_source_url("https://github.com/acme/widget")
        .with_source_branch("main")
        .with_destination_owner("octo")
        .with_destination_repo("fresh")
        .with_destination_branch("main")
        .with_files(config_files())
        .with_commit_message("msg")
        .with_dry_run(true)
        .build();
    let outcome = deployer(&server, scratch.path()).deploy(&request).await;

    assert!(outcome.success(), "{outcome:?}");
    assert!(outcome.dry_run());
    assert_eq!(outcome.files_written(), ["smithery.yaml"]);
    assert_eq!(outcome.resulting_url(), None);
    assert_eq!(outcome.commit_sha(), None);
}

#[tokio::test]
async fn deploy_twice_is_idempotent() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("index.js", "")]).await;
    mount_repo(&server, "octo", "widget", "main").await;
    mount_branch(&server, "octo", "widget", "main", "C1", "T1").await;
    mount_git_writes(&server, "octo", "widget", "T2", "C2").await;
    mount_ref_update(&server, "octo", "widget", "main", "C2").await;

    let deployer = deployer(&server, scratch.path());
    let request = request("octo", "widget", config_files());
    let first = deployer.deploy(&request).await;
    let second = deployer.deploy(&request).await;

    assert!(first.success() && second.success());
    assert_eq!(first.files_written(), second.files_written());
    let trees = bodies(&server, "POST", "/repos/octo/widget/git/trees").await;
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0], trees[1]);
}

#[tokio::test]
async fn deploy_invalid_destination_fails_before_network() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();

    let outcome = deployer(&server, scratch.path())
        .deploy(&request("bad owner", "widget", config_files()))
        .await;

    assert!(!outcome.success());
    assert_eq!(outcome.failed_step(), Some(DeployStep::Validate));
    assert_eq!(outcome.source_location(), "https://github.com/acme/widget");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn deploy_cancelled_before_start() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_source(&server, &[("a", "b")]).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = deployer(&server, scratch.path())
        .deploy_with_cancellation(&request("octo", "widget", config_files()), cancel)
        .await;

    assert!(!outcome.success());
    assert_eq!(outcome.failed_step(), Some(DeployStep::Fetch));
    assert!(outcome.error_detail().unwrap().contains("cancelled"));
}
