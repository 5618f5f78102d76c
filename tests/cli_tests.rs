//! End-to-End CLI Tests for collsync
//!
//! These tests run the binary against a local mirror and check outputs and
//! file system changes.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

use common::{Mirror, Project};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn collsync_cmd(mirror: &Mirror, project: &Project) -> Command {
    let mut cmd = Command::cargo_bin("collsync").unwrap();
    cmd.env("COLLSYNC_MIRROR", mirror.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--path")
        .arg(project.path());
    cmd
}

fn sample_mirror() -> Mirror {
    Mirror::new(
        r#"{
            "collections": {
                "starter": { "rules": ["a"], "commands": ["b"] },
                "extras": { "commands": ["b", "c"] }
            }
        }"#,
    )
    .with_file("rules/a/x.md", "rule x")
    .with_file("commands/b.md", "command b")
    .with_file("commands/c.md", "command c")
}

// =============================================================================
// LIST COMMAND TESTS
// =============================================================================

#[test]
fn test_cli_list_shows_collections() {
    let mirror = sample_mirror();
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("starter"))
        .stdout(predicate::str::contains("extras"))
        .stdout(predicate::str::contains("b, c"));
}

#[test]
fn test_cli_list_with_malformed_manifest_fails() {
    let mirror = Mirror::new("{ broken");
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse collection manifest"));
}

// =============================================================================
// INSTALL / UNINSTALL COMMAND TESTS
// =============================================================================

#[test]
fn test_cli_install_writes_files() {
    let mirror = sample_mirror();
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .args(["install", "starter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("installed: rules/a"))
        .stdout(predicate::str::contains("installed: commands/b.md"));

    assert_eq!(project.read("rules/a/x.md"), "rule x");
    assert_eq!(project.read("commands/b.md"), "command b");
    assert!(project.ledger().has_collection("starter"));
}

#[test]
fn test_cli_install_twice_reports_updates() {
    let mirror = sample_mirror();
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .args(["install", "starter"])
        .assert()
        .success();

    collsync_cmd(&mirror, &project)
        .args(["install", "starter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated: rules/a"))
        .stdout(predicate::str::contains("skipped").not());
}

#[test]
fn test_cli_install_skips_user_files() {
    let mirror = sample_mirror();
    let project = Project::new();
    project.write("commands/b.md", "user command");

    collsync_cmd(&mirror, &project)
        .args(["install", "starter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped: commands/b.md"));

    assert_eq!(project.read("commands/b.md"), "user command");
}

#[test]
fn test_cli_install_unknown_collection_fails() {
    let mirror = sample_mirror();
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .args(["install", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("collection 'nope' not found"))
        .stderr(predicate::str::contains("available: extras, starter"));

    assert!(project.files().is_empty());
}

#[test]
fn test_cli_install_missing_entry_fails() {
    let mirror = Mirror::new(r#"{"collections": {"broken": {"commands": ["ghost"]}}}"#)
        .with_file("commands/b.md", "b");
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .args(["install", "broken"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("entry commands/ghost not found"));

    assert!(!project.ledger_path().exists());
}

#[test]
fn test_cli_uninstall_keeps_shared_entries() {
    let mirror = sample_mirror();
    let project = Project::new();

    for name in ["starter", "extras"] {
        collsync_cmd(&mirror, &project)
            .args(["install", name])
            .assert()
            .success();
    }

    collsync_cmd(&mirror, &project)
        .args(["uninstall", "starter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kept (shared): commands/b.md"))
        .stdout(predicate::str::contains("removed: rules/a"));

    assert_eq!(
        project.files(),
        vec![".collsync.json", "commands/b.md", "commands/c.md"]
    );

    collsync_cmd(&mirror, &project)
        .args(["uninstall", "extras"])
        .assert()
        .success();

    assert_eq!(project.files(), vec![".collsync.json"]);
}

// =============================================================================
// LOCAL COMMAND TESTS
// =============================================================================

#[test]
fn test_cli_local_list_prints_manifest_shape() {
    let mirror = sample_mirror();
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .args(["install", "starter"])
        .assert()
        .success();

    let output = collsync_cmd(&mirror, &project)
        .args(["local", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "collections": {
                "local": { "commands": ["b"], "rules": ["a"] }
            }
        })
    );
}

#[test]
fn test_cli_local_list_without_root_fails() {
    let mirror = sample_mirror();
    let project = Project::new();

    collsync_cmd(&mirror, &project)
        .args(["local", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".cursor/ directory not found"));
}

// =============================================================================
// GLOBAL FLAG TESTS
// =============================================================================

#[test]
fn test_cli_gitignore_flag_adds_entry_once() {
    let mirror = sample_mirror();
    let project = Project::new();
    fs::write(project.path().join(".gitignore"), "target/").unwrap();

    for _ in 0..2 {
        collsync_cmd(&mirror, &project)
            .args(["--gitignore", "list"])
            .assert()
            .success();
    }

    let content = fs::read_to_string(project.path().join(".gitignore")).unwrap();
    assert_eq!(content, "target/\n.cursor/\n");
}

#[test]
fn test_cli_config_file_changes_local_root() {
    let mirror = sample_mirror();
    let project = Project::new();
    fs::write(
        project.path().join("collsync.toml"),
        "[local]\nroot = \".editor\"\n",
    )
    .unwrap();

    collsync_cmd(&mirror, &project)
        .args(["install", "starter"])
        .assert()
        .success();

    assert!(project.path().join(".editor/rules/a/x.md").exists());
    assert!(project.path().join(".editor/.collsync.json").exists());
    assert!(!project.root().exists());
}
