//! Integration tests for the `vest` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the parse,
//! compute, timeline and report subcommands through the actual binary,
//! including stdin piping, file I/O and error exits.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Helper: path to the grants.json fixture.
fn grants_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/grants.json")
}

/// Helper: path to the invalid_grants.json fixture.
fn invalid_grants_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid_grants.json")
}

/// Helper: run `vest` with args and parse stdout as JSON.
fn run_json(args: &[&str]) -> Value {
    let output = Command::cargo_bin("vest")
        .unwrap()
        .args(args)
        .output()
        .expect("vest must run");
    assert!(output.status.success(), "vest {:?} failed: {:?}", args, output);
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// parse
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parse_well_formed_schedule() {
    let json = run_json(&["parse", "4 year / 1 year cliff"]);
    assert_eq!(json["schedule"]["duration_months"], 48);
    assert_eq!(json["schedule"]["cliff_months"], 12);
    assert!(json["fallback"].is_null());
}

#[test]
fn parse_garbage_falls_back_with_warning() {
    Command::cargo_bin("vest")
        .unwrap()
        .args(["parse", "garbage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unparsable_duration\""))
        .stdout(predicate::str::contains("\"duration_months\": 48"))
        .stderr(predicate::str::contains("unparsable vesting duration"));
}

#[test]
fn parse_without_text_uses_default() {
    let json = run_json(&["parse"]);
    assert_eq!(json["schedule"]["duration_months"], 48);
    assert_eq!(json["fallback"], "missing");
}

// ─────────────────────────────────────────────────────────────────────────────
// compute
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn compute_inside_cliff() {
    let json = run_json(&[
        "compute",
        "--shares",
        "1000000",
        "--start",
        "2025-01-01",
        "--schedule",
        "4 year / 1 year cliff",
        "--as-of",
        "2025-06-01",
    ]);
    assert_eq!(json["vested_shares"], 0);
    assert_eq!(json["unvested_shares"], 1_000_000);
    assert_eq!(json["next_vesting_date"], "2026-01-01");
}

#[test]
fn compute_fully_vested_has_null_next_date() {
    let json = run_json(&[
        "compute",
        "--shares",
        "1000000",
        "--start",
        "2025-01-01",
        "--schedule",
        "4 year / 1 year cliff",
        "--as-of",
        "2029-02-01",
    ]);
    assert_eq!(json["vested_shares"], 1_000_000);
    assert!(json["next_vesting_date"].is_null());
    assert_eq!(json["next_vesting_amount"], 62_500);
}

#[test]
fn compute_zero_shares_fails() {
    Command::cargo_bin("vest")
        .unwrap()
        .args(["compute", "--shares", "0", "--start", "2025-01-01", "--as-of", "2026-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn compute_invalid_start_fails() {
    Command::cargo_bin("vest")
        .unwrap()
        .args(["compute", "--shares", "10", "--start", "2025-13-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --start"));
}

// ─────────────────────────────────────────────────────────────────────────────
// timeline
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn timeline_lists_cliff_then_quarters() {
    let json = run_json(&[
        "timeline",
        "--shares",
        "48000",
        "--start",
        "2025-01-01",
        "--schedule",
        "4 year / 1 year cliff",
    ]);
    let events = json.as_array().expect("timeline is an array");
    assert_eq!(events.len(), 13);
    assert_eq!(events[0]["date"], "2026-01-01");
    assert_eq!(events[0]["shares"], 12_000);
    assert_eq!(events[12]["cumulative_shares"], 48_000);
}

// ─────────────────────────────────────────────────────────────────────────────
// report
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn report_from_file() {
    let json = run_json(&["report", "-i", grants_path(), "--as-of", "2027-01-01"]);

    assert_eq!(json["as_of"], "2027-01-01");
    assert_eq!(json["error_count"], 0);
    assert_eq!(json["fallback_count"], 1);
    assert_eq!(json["rows"][0]["facts"]["vested_shares"], 500_000);
    assert_eq!(json["rows"][1]["facts"]["vested_shares"], 24_000);
    assert_eq!(json["rows"][1]["facts"]["next_vesting_date"], "2027-04-15");
    assert_eq!(json["rows"][2]["schedule_fallback"], "unparsable_duration");
    assert_eq!(json["total_vested"], 530_000);
}

#[test]
fn report_from_stdin() {
    let input = r#"[{"holder":"Ada","total_shares":4800,"start_date":"2025-01-01","schedule":"4 years"}]"#;

    Command::cargo_bin("vest")
        .unwrap()
        .args(["report", "--as-of", "2027-01-01"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"vested_shares\": 2400"));
}

#[test]
fn report_to_file() {
    let output_path = "/tmp/vest-test-report-output.json";

    // Clean up from any prior run
    let _ = std::fs::remove_file(output_path);

    Command::cargo_bin("vest")
        .unwrap()
        .args(["report", "-i", grants_path(), "-o", output_path, "--as-of", "2027-01-01"])
        .assert()
        .success();

    let content = std::fs::read_to_string(output_path).expect("output file must exist");
    let json: Value = serde_json::from_str(&content).expect("output must be JSON");
    assert_eq!(json["rows"].as_array().unwrap().len(), 3);

    let _ = std::fs::remove_file(output_path);
}

#[test]
fn report_keeps_invalid_rows_distinct() {
    let json = run_json(&["report", "-i", invalid_grants_path(), "--as-of", "2027-01-01"]);

    assert_eq!(json["error_count"], 2);
    assert_eq!(json["total_vested"], 500_000);
    assert!(json["rows"][1]["error"]
        .as_str()
        .unwrap()
        .contains("total_shares must be a positive integer"));
    assert!(json["rows"][1]["facts"].is_null());
    assert!(json["rows"][2]["error"].as_str().unwrap().contains("invalid date"));
}

#[test]
fn report_strict_fails_on_invalid_rows() {
    Command::cargo_bin("vest")
        .unwrap()
        .args(["report", "-i", invalid_grants_path(), "--as-of", "2027-01-01", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error_count\": 2"))
        .stderr(predicate::str::contains("2 of 3 rows failed validation"));
}

#[test]
fn report_rejects_non_array_input() {
    Command::cargo_bin("vest")
        .unwrap()
        .args(["report", "--as-of", "2027-01-01"])
        .write_stdin(r#"{"holder":"not an array"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON array of grant rows"));
}

#[test]
fn report_missing_file_fails() {
    Command::cargo_bin("vest")
        .unwrap()
        .args(["report", "-i", "/nonexistent/grants.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}
