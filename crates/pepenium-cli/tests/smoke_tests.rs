//! Smoke tests for the pepenium CLI
//!
//! Only offline commands are exercised; `screenshot` and `find` need a live
//! Appium or WebDriver endpoint.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn pepenium() -> Command {
    let mut cmd = Command::cargo_bin("pepenium").expect("pepenium binary should exist");
    cmd.env_remove("RUST_LOG").env_remove("PEPENIUM_CONFIG_DIR");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    pepenium()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_lists_commands() {
    pepenium()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("profiles"))
        .stdout(predicate::str::contains("check-config"))
        .stdout(predicate::str::contains("find"));
}

#[test]
fn test_no_args_fails() {
    pepenium().assert().failure();
}

// ============================================================================
// Offline commands
// ============================================================================

#[test]
fn test_profiles() {
    pepenium()
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("aws-android"))
        .stdout(predicate::str::contains("bs-mac"))
        .stdout(predicate::str::contains("local-web"));
}

#[test]
fn test_profiles_json() {
    let output = pepenium().args(["profiles", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 11);
}

#[test]
fn test_capabilities_masks_credentials() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("browserstackMac.yml"),
        "userName: demo\naccessKey: t0p-s3cret\nplatforms:\n  - browserName: safari\n    os: OS X\n    osVersion: Sonoma\n",
    )
    .unwrap();
    pepenium()
        .args(["capabilities", "bs-mac", "--config-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("***:***@hub-cloud.browserstack.com"))
        .stdout(predicate::str::contains("t0p-s3cret").not());
}

#[test]
fn test_capabilities_unknown_profile() {
    pepenium()
        .args(["capabilities", "bs-amiga"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown profile 'bs-amiga'"));
}

#[test]
fn test_check_config_valid() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bs.yml");
    fs::write(
        &file,
        "userName: demo\naccessKey: k\nplatforms:\n  - deviceName: iPhone 15\n    osVersion: '17'\n    browserName: safari\n",
    )
    .unwrap();
    pepenium()
        .args(["check-config", "--kind", "mobile-web"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("iPhone 15 17 safari"));
}

#[test]
fn test_check_config_missing_platform() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bs.yml");
    fs::write(&file, "userName: demo\naccessKey: k\n").unwrap();
    pepenium()
        .arg("check-config")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No platform entry"));
}

#[test]
fn test_find_rejects_bad_locator() {
    pepenium()
        .args(["find", "local-android", "--locator", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}
