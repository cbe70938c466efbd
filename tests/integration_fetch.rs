// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the source fetcher using wiremock.
//!
//! Covers:
//! - Explicit and default branch resolution
//! - Fallback to `main` when the lookup fails
//! - Download failures and cancellation
//! - Scratch workspace cleanup

mod common;

use common::{client_for, credential, mount_repo, mount_tarball, source_tarball};
use smithery_deploy::deploy::{FetchOptions, fetch_source};
use smithery_deploy::error::{DeployError, DeployStep};
use smithery_deploy::net::ProgressDisplay;
use smithery_deploy::utility::fs::walk::{WalkOptions, relative_files};
use std::fs;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(scratch: &std::path::Path) -> FetchOptions<'_> {
    FetchOptions {
        credential: None,
        scratch_parent: Some(scratch),
        progress: ProgressDisplay::Silent,
    }
}

#[tokio::test]
async fn fetch_explicit_branch() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_tarball(
        &server,
        "acme",
        "widget",
        "dev",
        source_tarball(&[("package.json", "{}"), ("src/index.ts", "export {};\n")]),
    )
    .await;

    let fetched = fetch_source(
        &client_for(&server),
        "https://github.com/acme/widget",
        Some("dev"),
        options(scratch.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(fetched.location.to_string(), "acme/widget@dev");
    let tree = fetched.workspace.tree();
    assert_eq!(
        relative_files(tree, &WalkOptions::for_workspace()).unwrap(),
        vec!["package.json", "src/index.ts"]
    );
    assert_eq!(
        fs::read_to_string(tree.join("src/index.ts")).unwrap(),
        "export {};\n"
    );
    assert!(!fetched.workspace.archive_path().exists());
}

#[tokio::test]
async fn fetch_uses_default_branch() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    mount_repo(&server, "acme", "widget", "trunk").await;
    mount_tarball(&server, "acme", "widget", "trunk", source_tarball(&[("a.txt", "a")])).await;

    let fetched = fetch_source(
        &client_for(&server),
        "git@github.com:acme/widget.git",
        None,
        options(scratch.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(fetched.location.reference(), "trunk");
}

#[tokio::test]
async fn fetch_falls_back_to_main_when_lookup_fails() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_tarball(&server, "acme", "widget", "main", source_tarball(&[("a.txt", "a")])).await;

    let fetched = fetch_source(
        &client_for(&server),
        "github.com/acme/widget",
        Some("  "),
        options(scratch.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(fetched.location.reference(), "main");
}

#[tokio::test]
async fn fetch_sends_credential_with_download() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/repos/acme/private/tarball/main"))
        .and(header("Authorization", "Bearer ghp_integration"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(source_tarball(&[("x", "y")])))
        .expect(1)
        .mount(&server)
        .await;

    let cred = credential();
    let fetch_options = FetchOptions {
        credential: Some(&cred),
        ..options(scratch.path())
    };
    fetch_source(
        &client_for(&server),
        "https://github.com/acme/private",
        Some("main"),
        fetch_options,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn fetch_missing_archive_fails_and_cleans_up() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();

    let err = fetch_source(
        &client_for(&server),
        "https://github.com/acme/widget",
        Some("nope"),
        options(scratch.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    let DeployError::FetchFailed(cause) = &err else {
        panic!("expected FetchFailed, got {err:?}");
    };
    assert_eq!(cause.status(), Some(404));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn fetch_rejects_unrecognised_url() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();

    let err = fetch_source(
        &client_for(&server),
        "https://gitlab.com/acme/widget",
        None,
        options(scratch.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DeployError::InvalidLocation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_cancelled_mid_request() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/tarball/main"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(source_tarball(&[("a", "b")]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = fetch_source(
        &client_for(&server),
        "https://github.com/acme/widget",
        Some("main"),
        options(scratch.path()),
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        DeployError::Cancelled {
            step: DeployStep::Fetch
        }
    ));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn fetch_timeout_during_extraction_removes_scratch() {
    let server = MockServer::start().await;
    let scratch = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..20_000).map(|i| format!("pkg/{}/f{i}.txt", i % 100)).collect();
    let files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x")).collect();
    mount_tarball(&server, "acme", "widget", "main", source_tarball(&files)).await;

    let client = client_for(&server);
    let cancel = CancellationToken::new();
    let fetch = fetch_source(
        &client,
        "https://github.com/acme/widget",
        Some("main"),
        options(scratch.path()),
        &cancel,
    );
    let timed_out = tokio::time::timeout(Duration::from_millis(50), fetch).await;
    assert!(timed_out.is_err(), "extraction finished within the budget");

    // extraction stops at the next entry and the workspace goes with it
    let mut leftover = usize::MAX;
    for _ in 0..100 {
        leftover = fs::read_dir(scratch.path()).unwrap().count();
        if leftover == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(leftover, 0);
}
