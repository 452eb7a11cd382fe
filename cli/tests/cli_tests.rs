//! CLI binary integration tests using assert_cmd + predicates.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("swagger-refs").expect("binary should exist")
}

/// Write a root document referencing `common.yaml` plus the referenced file.
fn write_pair(dir: &Path) -> std::path::PathBuf {
    let root = dir.join("swagger.yaml");
    fs::write(
        &root,
        r##"swagger: "2.0"
definitions:
  Order:
    allOf:
      - $ref: "common.yaml#/definitions/Base"
      - type: object
        properties:
          lines:
            type: array
            items:
              $ref: "common.yaml#/definitions/Line"
"##,
    )
    .unwrap();
    fs::write(
        dir.join("common.yaml"),
        r##"definitions:
  Base:
    type: object
    properties:
      id: { type: string }
  Line:
    type: object
    properties:
      sku: { type: string }
"##,
    )
    .unwrap();
    root
}

// ── Resolve to File ─────────────────────────────────────────────────────────

#[test]
fn test_resolve_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_pair(dir.path());
    let output = dir.path().join("out.json");
    let report = dir.path().join("report.json");

    cmd()
        .args(["resolve", input.to_str().unwrap()])
        .args(["-o", output.to_str().unwrap()])
        .args(["--report", report.to_str().unwrap()])
        .assert()
        .success();

    let out_content = fs::read_to_string(&output).expect("output file should exist");
    let out: serde_json::Value =
        serde_json::from_str(&out_content).expect("output should be valid JSON");
    assert_eq!(
        out["definitions"]["Order"]["allOf"][0]["$ref"],
        "#/definitions/Base"
    );
    assert_eq!(
        out["definitions"]["Order"]["allOf"][1]["properties"]["lines"]["items"]["$ref"],
        "#/definitions/Line"
    );
    assert!(out["definitions"]["Line"].is_object());

    let report_content = fs::read_to_string(&report).expect("report file should exist");
    let report: serde_json::Value =
        serde_json::from_str(&report_content).expect("report should be valid JSON");
    assert_eq!(report["merged"].as_array().unwrap().len(), 2);
    assert_eq!(report["warnings"], serde_json::json!([]));
}

// ── Resolve to Stdout ───────────────────────────────────────────────────────

#[test]
fn test_resolve_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_pair(dir.path());

    cmd()
        .args(["resolve", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"#/definitions/Base\""))
        .stdout(predicate::str::contains("common.yaml").not());
}

#[test]
fn test_compact_format_is_single_line() {
    let dir = TempDir::new().unwrap();
    let input = write_pair(dir.path());

    let assert = cmd()
        .args(["resolve", input.to_str().unwrap(), "--format", "compact"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.trim_end().lines().count(), 1);
    assert!(stdout.ends_with('\n'));
}

// ── Options ─────────────────────────────────────────────────────────────────

#[test]
fn test_base_uri_overrides_input_location() {
    let dir = TempDir::new().unwrap();
    let input = write_pair(dir.path());
    let elsewhere = TempDir::new().unwrap();
    let base = url::Url::from_directory_path(elsewhere.path())
        .unwrap()
        .join("swagger.yaml")
        .unwrap();

    // common.yaml does not exist next to the overridden base.
    cmd()
        .args(["resolve", input.to_str().unwrap()])
        .args(["--base-uri", base.as_str()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning:"))
        .stdout(predicate::str::contains("common.yaml#/definitions/Base"));
}

#[test]
fn test_strict_fails_on_unresolved_reference() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("swagger.yaml");
    fs::write(
        &input,
        "swagger: \"2.0\"\ndefinitions:\n  Pet:\n    $ref: \"missing.yaml#/Pet\"\n",
    )
    .unwrap();

    cmd()
        .args(["resolve", input.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("missing.yaml"));

    cmd()
        .args(["resolve", input.to_str().unwrap(), "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("left unresolved"));
}

// ── Error Cases ─────────────────────────────────────────────────────────────

#[test]
fn test_missing_input_file() {
    cmd()
        .args(["resolve", "/nonexistent/swagger.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read input file"));
}

#[test]
fn test_input_that_is_not_a_mapping() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("list.yaml");
    fs::write(&input, "- just\n- a\n- list\n").unwrap();

    cmd()
        .args(["resolve", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse document"));
}

#[test]
fn test_invalid_base_uri() {
    let dir = TempDir::new().unwrap();
    let input = write_pair(dir.path());

    cmd()
        .args(["resolve", input.to_str().unwrap(), "--base-uri", "not a uri"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resolution failed"));
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
