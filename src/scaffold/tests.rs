// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{CONFIG_FILE, Runtime, detect_runtime, scaffold};
use std::fs;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    for (name, content) in files {
        fs::write(temp.path().join(name), content).unwrap();
    }
    temp
}

fn text(bytes: Option<&[u8]>) -> String {
    String::from_utf8(bytes.expect("missing file").to_vec()).unwrap()
}

#[test]
fn test_detect_priority() {
    let cases: Vec<(Vec<(&str, &str)>, Runtime)> = vec![
        (vec![("Dockerfile", "FROM x"), ("package.json", "{}")], Runtime::Container),
        (vec![("package.json", "{}"), ("tsconfig.json", "{}")], Runtime::TypeScript),
        (
            vec![("package.json", r#"{"devDependencies":{"typescript":"^5"}}"#)],
            Runtime::TypeScript,
        ),
        (vec![("package.json", r#"{"dependencies":{"express":"^4"}}"#)], Runtime::JavaScript),
        (vec![("package.json", "not json")], Runtime::JavaScript),
        (vec![("pyproject.toml", ""), ("go.mod", "")], Runtime::Python),
        (vec![("requirements.txt", "mcp")], Runtime::Python),
        (vec![("setup.py", "")], Runtime::Python),
        (vec![("go.mod", "module x"), ("Cargo.toml", "")], Runtime::Go),
        (vec![("Cargo.toml", "")], Runtime::Rust),
        (vec![("README.md", "hi")], Runtime::Unknown),
    ];

    for (files, expected) in cases {
        let dir = project(&files);
        let detection = detect_runtime(dir.path()).unwrap();
        assert_eq!(detection.runtime, expected, "files: {files:?}");
    }
}

#[test]
fn test_detect_reports_existing_config() {
    let dir = project(&[("requirements.txt", ""), (CONFIG_FILE, "runtime: python\n")]);
    let detection = detect_runtime(dir.path()).unwrap();
    assert!(detection.has_config);
    assert_eq!(detection.marker, Some("requirements.txt"));
}

#[test]
fn test_detect_missing_dir() {
    let dir = project(&[]);
    assert!(detect_runtime(&dir.path().join("nope")).is_err());
}

#[test]
fn test_scaffold_typescript() {
    let dir = project(&[("package.json", "{}"), ("tsconfig.json", "{}")]);
    let scaffold = scaffold(dir.path()).unwrap();
    assert_eq!(scaffold.files.paths().collect::<Vec<_>>(), vec![CONFIG_FILE]);
    assert_eq!(text(scaffold.files.get(CONFIG_FILE)), "runtime: typescript\n");
}

#[test]
fn test_scaffold_javascript_gets_container() {
    let dir = project(&[("package.json", "{}")]);
    let scaffold = scaffold(dir.path()).unwrap();

    assert_eq!(
        scaffold.files.paths().collect::<Vec<_>>(),
        vec!["Dockerfile", CONFIG_FILE]
    );
    insta::assert_snapshot!(text(scaffold.files.get(CONFIG_FILE)), @r"
    runtime: container
    build:
      dockerfile: Dockerfile
      dockerBuildPath: .
    startCommand:
      type: http
      port: 8081
    ");
    assert!(text(scaffold.files.get("Dockerfile")).starts_with("FROM node:"));
}

#[test]
fn test_scaffold_rust_uses_package_name() {
    let dir = project(&[(
        "Cargo.toml",
        "[package]\nname = \"weather-mcp\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
    )]);
    let scaffold = scaffold(dir.path()).unwrap();
    let dockerfile = text(scaffold.files.get("Dockerfile"));
    assert!(dockerfile.contains("target/release/weather-mcp "), "{dockerfile}");
}

#[test]
fn test_scaffold_container_keeps_own_dockerfile() {
    let dir = project(&[("Dockerfile", "FROM scratch\n")]);
    let scaffold = scaffold(dir.path()).unwrap();
    assert_eq!(scaffold.files.paths().collect::<Vec<_>>(), vec![CONFIG_FILE]);
}

#[test]
fn test_scaffold_unknown_fails() {
    let dir = project(&[("notes.txt", "")]);
    let err = scaffold(dir.path()).unwrap_err();
    assert!(err.to_string().contains("could not detect a runtime"));
}
