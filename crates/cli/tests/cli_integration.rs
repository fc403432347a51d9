//! CLI integration tests.
//!
//! Uses `assert_cmd` to spawn the `paylens` binary and verify exit codes,
//! stdout content, and stderr content.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn paylens() -> Command {
    cargo_bin_cmd!("paylens")
}

#[test]
fn help_exits_0_with_description() {
    paylens()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Agentic payment protocol auditor"));
}

#[test]
fn protocols_lists_all_four() {
    paylens()
        .arg("protocols")
        .assert()
        .success()
        .stdout(predicate::str::contains("AP2"))
        .stdout(predicate::str::contains("x402"))
        .stdout(predicate::str::contains("ACP"))
        .stdout(predicate::str::contains("UCP"));
}

#[test]
fn protocol_json_output_includes_point_of_no_return() {
    let output = paylens()
        .args(["--output", "json", "protocol", "x402"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let meta: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(meta["name"], "x402");
    assert_eq!(meta["point_of_no_return"], "awaiting_settlement");
}

#[test]
fn unknown_protocol_exits_1() {
    paylens()
        .args(["protocol", "SEPA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown protocol: SEPA"));
}

#[test]
fn schema_prints_json_schema() {
    let output = paylens()
        .args(["schema", "AP2", "CartMandate"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let schema: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(schema["type"], "object");
    assert!(schema["required"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("contents")));
}

#[test]
fn unknown_intent_type_exits_1() {
    paylens()
        .args(["schema", "AP2", "Bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("intent type 'Bogus' not found"));
}

#[test]
fn validate_reports_missing_fields_and_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("intent.json");
    fs::write(&path, r#"{"contents": {}}"#).unwrap();

    paylens()
        .args(["validate", "AP2", "CartMandate", "--data"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Missing required field: contents.id",
        ));
}

#[test]
fn validate_accepts_a_complete_intent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("intent.json");
    fs::write(
        &path,
        r#"{"offer_id": "of_1", "payment_method": "token"}"#,
    )
    .unwrap();

    paylens()
        .args(["validate", "UCP", "CheckoutIntent", "--data"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid: UCP CheckoutIntent"));
}

#[test]
fn step_walks_the_transition_table() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data.json");
    let context = dir.path().join("context.json");
    fs::write(&data, r#"{"contents": {}, "merchant_authorization": "jwt"}"#).unwrap();
    fs::write(&context, r#"{}"#).unwrap();

    let output = paylens()
        .args([
            "--output",
            "json",
            "step",
            "AP2",
            "--state",
            "draft",
            "--intent-type",
            "CartMandate",
            "--data",
        ])
        .arg(&data)
        .arg("--context")
        .arg(&context)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let outcome: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(outcome["new_state"], "pending_approval");
    assert_eq!(outcome["result"]["action"], "merchant_sign_cart");
}

#[test]
fn analyze_ap2_scores_an_empty_mandate_zero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mandate.json");
    fs::write(&path, "{}").unwrap();

    let output = paylens()
        .args(["--output", "json", "analyze-ap2", "--mandate"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let analysis: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(analysis["score"], 0);
    assert_eq!(analysis["grade"], "F");
}

#[test]
fn inspect_unknown_protocol_exits_before_connecting() {
    paylens()
        .args(["inspect", "SEPA", "--target", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown protocol: SEPA"));
}
