//! Integration tests for the cablelist CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a cablelist command
fn cablelist() -> Command {
    let mut cmd = Command::cargo_bin("cablelist").unwrap();
    cmd.env_remove("CABLELIST_DATABASE")
        .env_remove("CABLELIST_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    cablelist().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a command in the project and expect success
fn run_ok(tmp: &TempDir, args: &[&str]) -> String {
    let output = cablelist()
        .current_dir(tmp.path())
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Project with one unit, two article connections with one unit connection
/// each, three vehicle types and version 1.0
fn setup_catalog() -> TempDir {
    let tmp = setup_test_project();
    run_ok(&tmp, &["catalog", "unit", "add", "=A01"]);
    run_ok(&tmp, &["catalog", "article-connection", "add", "X1:1"]);
    run_ok(&tmp, &["catalog", "article-connection", "add", "X1:2"]);
    run_ok(&tmp, &["catalog", "vehicle-type", "add", "RE 460", "--series", "001"]);
    run_ok(&tmp, &["catalog", "vehicle-type", "add", "RE 460", "--series", "002"]);
    run_ok(&tmp, &["catalog", "vehicle-type", "add", "RE 460", "--series", "003"]);
    run_ok(&tmp, &["catalog", "connection", "add", "K1", "--unit", "1", "--article", "1"]);
    run_ok(&tmp, &["catalog", "connection", "add", "K2", "--unit", "1", "--article", "2"]);
    run_ok(&tmp, &["version", "add", "1.0"]);
    tmp
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    cablelist()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized cablelist project"));

    assert!(tmp.path().join(".cablelist").is_dir());
    assert!(tmp.path().join(".cablelist/config.yaml").is_file());
    assert!(tmp.path().join(".cablelist/links.db").is_file());
}

#[test]
fn test_init_fails_if_already_exists() {
    let tmp = setup_test_project();

    cablelist()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_keeps_links() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["link", "add", "1:2:1.0:NEW", "--type", "CABLELINK"]);

    cablelist()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();

    let out = run_ok(&tmp, &["link", "list", "-f", "tsv"]);
    assert!(out.contains("1:2:1:NEW"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a cablelist project"));
}

#[test]
fn test_database_option_works_without_project() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("standalone.db");
    let db = db.to_str().unwrap();

    cablelist()
        .current_dir(tmp.path())
        .args(["--database", db, "version", "add", "2.5"])
        .assert()
        .success();

    cablelist()
        .current_dir(tmp.path())
        .args(["--database", db, "version", "list", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.5\t2500"));
}

// ============================================================================
// Link Command Tests
// ============================================================================

#[test]
fn test_link_add_and_show() {
    let tmp = setup_catalog();

    cablelist()
        .current_dir(tmp.path())
        .args([
            "link",
            "add",
            "1:2:1.0:NEW",
            "--type",
            "CABLELINK",
            "--identification",
            "W100",
            "--resistance",
            "0.5",
            "--start",
            "1",
            "--end",
            "2,3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added link 1:2:1:NEW"))
        .stdout(predicate::str::contains("2 vehicle type pair(s)"));

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "show", "1:2:1:NEW"])
        .assert()
        .success()
        .stdout(predicate::str::contains("W100"))
        .stdout(predicate::str::contains("<-->"))
        .stdout(predicate::str::contains("1:2, 1:3"));
}

#[test]
fn test_link_show_json() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["link", "add", "1:2:1:NEW", "--type", "TESTLINK", "--pair", "3:1"],
    );

    let out = run_ok(&tmp, &["link", "show", "1:2:1:NEW", "-f", "json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["key"]["connection_start"], 1);
    assert_eq!(json["key"]["version"], 1000);
    assert_eq!(json["key"]["modification"], "NEW");
    assert_eq!(json["link_type"], "TESTLINK");
    assert_eq!(json["direction"], "BID");
    assert_eq!(json["vehicle_types"][0]["start"], 3);
    assert_eq!(json["vehicle_types"][0]["end"], 1);
}

#[test]
fn test_link_add_duplicate_fails() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["link", "add", "1:2:1:NEW", "--type", "CABLELINK"]);

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "add", "1:2:1:NEW", "--type", "CABLELINK"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_link_add_rejects_direction() {
    let tmp = setup_catalog();

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--direction", "STE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed"));
}

#[test]
fn test_link_add_rejects_unpairable_vehicle_types() {
    let tmp = setup_catalog();

    cablelist()
        .current_dir(tmp.path())
        .args([
            "link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--start", "1,2", "--end", "1,2,3",
        ])
        .assert()
        .failure();

    // Nothing was stored
    let out = run_ok(&tmp, &["link", "list", "-f", "tsv"]);
    assert!(!out.contains("1:2:1:NEW"));
}

#[test]
fn test_link_add_rejects_invalid_key() {
    let tmp = setup_catalog();

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "add", "1:2:NEW", "--type", "CABLELINK"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid link key"));
}

#[test]
fn test_link_add_unregistered_version_fails() {
    let tmp = setup_catalog();

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "add", "1:2:9.0:NEW", "--type", "CABLELINK"])
        .assert()
        .failure();
}

#[test]
fn test_link_edit_attributes_and_vehicle_types() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--pair", "1:2"],
    );

    run_ok(
        &tmp,
        &["link", "edit", "1:2:1:NEW", "--identification", "W200", "--pair", "3:3"],
    );

    let out = run_ok(&tmp, &["link", "show", "1:2:1:NEW"]);
    assert!(out.contains("W200"));
    assert!(out.contains("3:3"));
    assert!(!out.contains("1:2, "));
}

#[test]
fn test_link_edit_keeps_vehicle_types_when_none_given() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--pair", "1:2"],
    );
    run_ok(&tmp, &["version", "add", "2.0"]);

    run_ok(&tmp, &["link", "edit", "1:2:1:NEW", "--key", "1:2:2:MODNEW"]);

    let out = run_ok(&tmp, &["assign", "show", "1:2:2:MODNEW", "-f", "tsv"]);
    assert!(out.contains("1\t2"));
}

#[test]
fn test_link_rm_removes_history() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["link", "add", "1:2:1:NEW", "--type", "CABLELINK"]);
    run_ok(&tmp, &["version", "add", "2.0"]);

    // Version 2.0 carried the link over
    let out = run_ok(&tmp, &["link", "history", "1", "2", "-f", "tsv"]);
    assert!(out.contains("1:2:1:NEW"));
    assert!(out.contains("1:2:2:EXISTS"));

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "rm", "1:2:1:NEW"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed link"));

    let out = run_ok(&tmp, &["link", "history", "1", "2", "-f", "tsv"]);
    assert_eq!(out.lines().count(), 1, "only the header is left: {}", out);
}

#[test]
fn test_link_list_by_version() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["link", "add", "1:2:1:NEW", "--type", "CABLELINK"]);
    run_ok(&tmp, &["version", "add", "2.0"]);

    let out = run_ok(&tmp, &["link", "list", "--version", "2.0", "-f", "tsv"]);
    assert!(out.contains("1:2:2:EXISTS"));
    assert!(!out.contains("1:2:1:NEW"));

    let out = run_ok(&tmp, &["link", "list", "-f", "json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
}

// ============================================================================
// Assign Command Tests
// ============================================================================

#[test]
fn test_assign_set_reports_diff() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--pair", "2:1", "--pair", "1:2"],
    );

    cablelist()
        .current_dir(tmp.path())
        .args(["assign", "set", "1:2:1:NEW", "--pair", "2:1", "--pair", "3:3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+1 -1"));

    let out = run_ok(&tmp, &["assign", "show", "1:2:1:NEW", "-f", "tsv"]);
    assert_eq!(out, "START\tEND\n2\t1\n3\t3\n");
}

#[test]
fn test_assign_set_unknown_link_fails() {
    let tmp = setup_catalog();

    cablelist()
        .current_dir(tmp.path())
        .args(["assign", "set", "1:2:1:NEW", "--pair", "1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no link"));
}

#[test]
fn test_assign_clear() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--pair", "1:1"],
    );

    run_ok(&tmp, &["assign", "clear", "1:2:1:NEW"]);

    cablelist()
        .current_dir(tmp.path())
        .args(["assign", "show", "1:2:1:NEW"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No vehicle type pair found"));
}

#[test]
fn test_link_import_adds_all_or_nothing() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["catalog", "connection", "add", "K3", "--unit", "1"]);

    let links = tmp.path().join("links.yaml");
    fs::write(
        &links,
        r#"- key: { connection_start: 1, connection_end: 2, version: 1000, modification: NEW }
  link_type: CABLELINK
  direction: BID
  identification: W1
  vehicle_types:
    - { start: 1, end: 2 }
- key: { connection_start: 2, connection_end: 3, version: 1000, modification: NEW }
  link_type: INTERNLINK
  direction: BID
"#,
    )
    .unwrap();

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "import", "links.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 link(s)"));

    let out = run_ok(&tmp, &["assign", "show", "1:2:1:NEW", "-f", "tsv"]);
    assert!(out.contains("1\t2"));

    // A batch with one existing link adds nothing
    let again = tmp.path().join("again.yaml");
    fs::write(
        &again,
        r#"- key: { connection_start: 1, connection_end: 3, version: 1000, modification: NEW }
  link_type: CABLELINK
  direction: BID
- key: { connection_start: 1, connection_end: 2, version: 1000, modification: NEW }
  link_type: CABLELINK
  direction: BID
"#,
    )
    .unwrap();

    cablelist()
        .current_dir(tmp.path())
        .args(["link", "import", "again.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("link 1:2:1:NEW already exists"));

    let out = run_ok(&tmp, &["link", "list", "-f", "tsv"]);
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn test_assign_unit_lists_and_clears() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--pair", "1:2", "--pair", "2:3"],
    );

    let out = run_ok(&tmp, &["assign", "unit", "1", "-f", "tsv"]);
    assert!(out.contains("1:2:1:NEW\t1\t2"));
    assert!(out.contains("1:2:1:NEW\t2\t3"));

    cablelist()
        .current_dir(tmp.path())
        .args(["assign", "unit", "1", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 vehicle type assignment(s) of unit 1"));

    let out = run_ok(&tmp, &["assign", "show", "1:2:1:NEW", "-f", "json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

// ============================================================================
// Template Derivation Tests
// ============================================================================

#[test]
fn test_derive_unit_creates_templated_link() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["catalog", "template", "1", "2", "--type", "CABLELINK", "--identification", "T1"],
    );

    cablelist()
        .current_dir(tmp.path())
        .args(["derive", "unit", "1", "--version", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Derived link 1:2:1:NEW"))
        .stdout(predicate::str::contains("1 link(s) derived, 0 already present"));

    // A second run finds the existing link
    cablelist()
        .current_dir(tmp.path())
        .args(["derive", "unit", "1", "--version", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 link(s) derived, 1 already present"));

    let out = run_ok(&tmp, &["link", "show", "1:2:1:NEW", "-f", "json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["identification"], "T1");
    assert_eq!(json["article_link"]["connection_start"], 1);
}

#[test]
fn test_derive_unit_dry_run_stores_nothing() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["catalog", "template", "1", "2", "--type", "CABLELINK"]);

    let out = run_ok(&tmp, &["derive", "unit", "1", "--version", "1.0", "--dry-run", "-f", "tsv"]);
    assert!(out.contains("1-2\t1\t2\tCABLELINK"));

    let out = run_ok(&tmp, &["link", "list", "-f", "tsv"]);
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn test_connection_add_with_derive() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["catalog", "article-connection", "add", "X2:1"]);
    run_ok(&tmp, &["catalog", "template", "1", "3", "--type", "INTERNLINK"]);

    cablelist()
        .current_dir(tmp.path())
        .args([
            "catalog", "connection", "add", "K3", "--unit", "1", "--article", "3", "--derive",
            "1.0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Derived link 1:3:1:NEW"));
}

#[test]
fn test_derive_connection_reports_its_unit() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["catalog", "template", "1", "2", "--type", "CABLELINK"]);

    cablelist()
        .current_dir(tmp.path())
        .args(["derive", "connection", "2", "--version", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Connection 2 of unit 1 (article connection 2)"))
        .stdout(predicate::str::contains("Derived link 1:2:1:NEW"));

    run_ok(&tmp, &["catalog", "connection", "add", "K9", "--unit", "1"]);
    cablelist()
        .current_dir(tmp.path())
        .args(["derive", "connection", "3", "--version", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has no article connection"))
        .stdout(predicate::str::contains("0 link(s) derived"));
}

#[test]
fn test_derive_unknown_connection_fails() {
    let tmp = setup_catalog();

    cablelist()
        .current_dir(tmp.path())
        .args(["derive", "connection", "99", "--version", "1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown connection"));
}

#[test]
fn test_template_list_and_show() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["catalog", "template", "1", "2", "--type", "CONNECTION", "--resistance", "1.5"],
    );

    let out = run_ok(&tmp, &["template", "list", "-f", "tsv"]);
    assert!(out.contains("1\t2\tCONNECTION"));

    cablelist()
        .current_dir(tmp.path())
        .args(["template", "show", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.5 Ohm"));

    cablelist()
        .current_dir(tmp.path())
        .args(["template", "show", "2", "1"])
        .assert()
        .failure();
}

// ============================================================================
// Version, Catalog and Status Tests
// ============================================================================

#[test]
fn test_version_rm() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["version", "add", "3.0"]);

    run_ok(&tmp, &["version", "rm", "3.0"]);
    let out = run_ok(&tmp, &["version", "list", "-f", "tsv"]);
    assert!(!out.contains("3\t3000"));

    cablelist()
        .current_dir(tmp.path())
        .args(["version", "rm", "3.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not registered"));
}

#[test]
fn test_version_rm_referenced_fails() {
    let tmp = setup_catalog();
    run_ok(&tmp, &["link", "add", "1:2:1:NEW", "--type", "CABLELINK"]);

    cablelist()
        .current_dir(tmp.path())
        .args(["version", "rm", "1.0"])
        .assert()
        .failure();
}

#[test]
fn test_catalog_lists_yaml() {
    let tmp = setup_catalog();

    let out = run_ok(&tmp, &["catalog", "connection", "list", "--unit", "1", "-f", "yaml"]);
    assert!(out.contains("contact_name: K1"));
    assert!(out.contains("article_connection: 2"));

    let out = run_ok(&tmp, &["catalog", "vehicle-type", "list", "-f", "tsv"]);
    assert!(out.contains("RE 460\t-\t003"));
}

#[test]
fn test_status_json() {
    let tmp = setup_catalog();
    run_ok(
        &tmp,
        &["link", "add", "1:2:1:NEW", "--type", "CABLELINK", "--pair", "1:1"],
    );

    let out = run_ok(&tmp, &["status", "-f", "json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["links"], 1);
    assert_eq!(json["versions"], 1);
    assert_eq!(json["vehicle_type_assignments"], 1);
}

#[test]
fn test_quiet_suppresses_success_output() {
    let tmp = setup_test_project();

    cablelist()
        .current_dir(tmp.path())
        .args(["-q", "version", "add", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_completions_bash() {
    cablelist()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cablelist"));
}
