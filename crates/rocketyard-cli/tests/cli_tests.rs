//! Integration tests for the CLI commands.
//!
//! These tests use `assert_cmd` to run the binary against the shared
//! fixtures and check stdout and exit codes.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name)
        .canonicalize()
        .expect("fixture present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("rocketyard-cli");
    cmd.env("RUST_LOG", "error");
    cmd
}

#[test]
fn parts_lists_catalog_sorted() {
    cli()
        .arg("parts")
        .arg(fixture("catalog.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Available parts (5):"))
        .stdout(predicate::str::is_match(r"(?s)fl-t400.*lv-t45.*mk1-pod").expect("regex"));
}

#[test]
fn validate_accepts_fixture_catalog() {
    cli()
        .arg("validate")
        .arg(fixture("catalog.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog is valid."));
}

#[test]
fn validate_rejects_broken_catalog() {
    cli()
        .arg("validate")
        .arg(fixture("catalog_broken.json"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("circular-reference"))
        .stdout(predicate::str::contains("Did you mean 'LiquidFuel'?"));
}

#[test]
fn validate_json_output_is_parseable() {
    let output = cli()
        .args(["validate", "--json"])
        .arg(fixture("catalog.json"))
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["valid"], serde_json::json!(true));
    assert!(report["celestialBodies"]["errors"].as_array().is_some());
}

#[test]
fn performance_prints_report() {
    cli()
        .arg("performance")
        .arg(fixture("catalog.json"))
        .arg(fixture("rocket.json"))
        .args(["--altitude", "70000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rocket: 3 parts, 2 connections"))
        .stdout(predicate::str::contains("2590 kg"))
        .stdout(predicate::str::contains("Structure: ok"))
        .stdout(predicate::str::contains("Delta-v"))
        .stdout(predicate::str::contains("Performance at 70000 m:"));
}

#[test]
fn performance_reports_rejected_connection() {
    let dir = tempdir().expect("temp dir");
    let rocket = dir.path().join("loop.json");
    fs::write(
        &rocket,
        r#"{
            "instances": [{"id": "a", "part": "fl-t400"}, {"id": "b", "part": "fl-t400"}],
            "connections": [
                {"child": "b", "parent": "a"},
                {"child": "a", "parent": "b", "childNode": "side", "parentNode": "side"}
            ]
        }"#,
    )
    .expect("write rocket");

    cli()
        .arg("performance")
        .arg(fixture("catalog.json"))
        .arg(&rocket)
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not connect 'a' beneath 'b'"));
}

#[test]
fn config_file_overrides_structure_thresholds() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"structure": {"massRatioThreshold": 1.5}}"#).expect("write config");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("performance")
        .arg(fixture("catalog.json"))
        .arg(fixture("rocket.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("excessive-mass-ratio"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"physics": {"referenceBody": {"gravity": -1}}}"#).expect("write config");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("parts")
        .arg(fixture("catalog.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}
