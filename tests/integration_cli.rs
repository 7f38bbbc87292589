//! End-to-end tests for the pyvm command-line surface.
//!
//! These exercise argument parsing and the offline `info` command only;
//! commands that reach python.org are covered by unit tests against
//! in-process fakes.

use assert_cmd::Command;
use predicates::prelude::*;

fn pyvm() -> Command {
    let mut cmd = Command::cargo_bin("pyvm").unwrap();
    cmd.env("PYVM_NO_PROGRESS", "1");
    cmd
}

#[test]
fn help_lists_all_subcommands() {
    pyvm()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn version_flag_reports_the_package_version() {
    pyvm()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_is_rejected() {
    pyvm()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn verbose_and_quiet_are_mutually_exclusive() {
    pyvm()
        .args(["--verbose", "--quiet", "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn info_reports_host_identity() {
    pyvm()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("OS:"))
        .stdout(predicate::str::contains("Arch:"))
        .stdout(predicate::str::contains("Elevated:"));
}

#[test]
fn info_json_carries_the_expected_fields() {
    let output = pyvm().args(["info", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed.get("os").is_some());
    assert!(parsed.get("arch").is_some());
    assert!(parsed["elevated"].is_boolean());
    assert!(parsed.get("config_path").is_some());
}

#[test]
fn format_flag_rejects_unknown_values() {
    for subcommand in ["check", "info"] {
        pyvm()
            .args([subcommand, "--format", "jsn"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }
}

#[test]
fn update_rejects_malformed_target_versions() {
    for bogus in ["3.12", "v3.12.4", "3.12.4rc1", "latest"] {
        pyvm()
            .args(["update", "--target", bogus])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid version"));
    }
}
