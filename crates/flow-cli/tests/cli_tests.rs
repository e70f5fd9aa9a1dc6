//! Tests that invoke the compiled `flowsync` binary.
//!
//! None of these reach a tenant: they exercise argument handling and the
//! validation that runs before the first request.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `flowsync` command isolated from the caller's environment.
fn flowsync(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flowsync").expect("Failed to find flowsync binary");
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    for (key, _) in std::env::vars() {
        if key.starts_with("FLOWSYNC_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

const BASIC_AUTH: [&str; 6] = [
    "--tmn-host",
    "http://127.0.0.1:1",
    "--tmn-userid",
    "user",
    "--tmn-password",
    "secret",
];

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    flowsync(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn missing_host_is_reported() {
    let dir = TempDir::new().unwrap();
    flowsync(&dir)
        .args(["sync", "--package-id", "Pkg", "--dir-git-repo", "."])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--tmn-host"));
}

#[test]
fn invalid_draft_handling_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    flowsync(&dir)
        .args(["sync", "--package-id", "Pkg", "--dir-git-repo", "."])
        .args(["--draft-handling", "KEEP"])
        .args(BASIC_AUTH)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid draft handling"));
}

#[test]
fn artifacts_dir_outside_repo_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("repo")).unwrap();
    flowsync(&dir)
        .args(["sync", "--package-id", "Pkg", "--dir-git-repo", "repo"])
        .args(["--dir-artifacts", "elsewhere"])
        .args(BASIC_AUTH)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("inside the git repository"));
}

#[test]
fn include_and_exclude_are_mutually_exclusive() {
    let dir = TempDir::new().unwrap();
    flowsync(&dir)
        .args(["sync", "--package-id", "Pkg", "--dir-git-repo", "."])
        .args(["--ids-include", "A", "--ids-exclude", "B"])
        .args(BASIC_AUTH)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn config_file_supplies_settings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("flowsync.toml"),
        "[tenant]\nhost = \"http://127.0.0.1:1\"\nuser_id = \"user\"\npassword = \"secret\"\n\n[sync]\npackage_id = \"Pkg\"\ndir_git_repo = \".\"\ntarget = \"sideways\"\n",
    )
    .unwrap();

    flowsync(&dir)
        .arg("sync")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid target 'sideways'"));
}

#[test]
fn explicit_config_file_must_exist() {
    let dir = TempDir::new().unwrap();
    flowsync(&dir)
        .args(["--config", "missing.toml", "sync"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn unreachable_tenant_fails_with_transport_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("repo")).unwrap();
    flowsync(&dir)
        .args(["sync", "--package-id", "Pkg", "--dir-git-repo", "repo", "--timeout", "5"])
        .args(BASIC_AUTH)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("127.0.0.1:1"));
}

#[test]
fn deploy_rejects_unknown_artifact_type() {
    let dir = TempDir::new().unwrap();
    flowsync(&dir)
        .args(["deploy", "--artifact-ids", "A", "--artifact-type", "Flow"])
        .args(BASIC_AUTH)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid artifact type 'Flow'"));
}

#[test]
fn update_package_requires_a_file() {
    let dir = TempDir::new().unwrap();
    flowsync(&dir)
        .args(["update", "package", "--package-file", "nope.json"])
        .args(BASIC_AUTH)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.json"));
}
