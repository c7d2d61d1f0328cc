// Integration tests for the csearch command line: exit codes, the --json
// stdout contract and the text report.
//
// Run with: cargo test -p custsearch-cli --test cli_contract -- --nocapture

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use rusqlite::{params, Connection};

fn csearch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_csearch"));
    cmd.env_remove("CSEARCH_CATALOG");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Assert stdout is a single, parseable JSON value.
fn assert_single_json(stdout: &str) -> serde_json::Value {
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be valid JSON.\nParse error: {}\nstdout:\n{}", e, trimmed)
    })
}

const CATALOG: &str = r#"
[sources.bank_a]
title = "Bank A customers"

[sources.bank_a.storage]
kind = "sqlite"
path = "bank_a.db"
table = "customers"

[sources.bank_a.profile]
identity_field = "NATIONAL_ID"

[[sources.bank_a.filters]]
name = "name"
label = "Full name"
columns = ["FULL_NAME"]

[[sources.bank_a.filters]]
name = "birth"
label = "Birth date"
columns = ["BIRTH_DATE"]
prefix_digits = 4

[sources.bank_a.report]
fields = ["FULL_NAME", "BIRTH_DATE", "CARD_NO"]

[sources.bank_a.report.labels]
FULL_NAME = "Full name"
BIRTH_DATE = "Birth date"
CARD_NO = "Card"

[sources.branch]
[sources.branch.storage]
kind = "csv"
path = "branch.csv"
[sources.branch.profile]
identity_field = "FULL_NAME"
[[sources.branch.filters]]
name = "name"
columns = ["FULL_NAME"]
"#;

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();

    let conn = Connection::open(dir.path().join("bank_a.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (NATIONAL_ID TEXT, FULL_NAME TEXT, BIRTH_DATE TEXT, CARD_NO TEXT);",
    )
    .unwrap();
    let rows: &[(&str, &str, &str, Option<&str>)] = &[
        ("0012345678", "Ali Karimi", "1365/02/11", None),
        ("0012345678", "Ali Karimi", "1365/02/11", Some("6037991234567890")),
        ("0012345678", "Ali Karimi", "1365/02/11", Some("6104337654321098")),
        ("0012345678", "Ali Karimi", "1365/02/11", Some("6104337654321098")),
        ("0098765432", "Sara Ahmadi", "1370/08/01", None),
    ];
    for r in rows {
        conn.execute(
            "INSERT INTO customers VALUES (?1, ?2, ?3, ?4)",
            params![r.0, r.1, r.2, r.3],
        )
        .unwrap();
    }

    std::fs::write(
        dir.path().join("branch.csv"),
        "FULL_NAME,PHONE,CITY\nReza Moradi,None,Qom\nReza Moradi,0935,Qom\n",
    )
    .unwrap();
    dir
}

fn catalog(dir: &Path) -> String {
    dir.join("catalog.toml").to_str().unwrap().to_string()
}

// ===========================================================================
// csearch search
// ===========================================================================

#[test]
fn search_prints_text_report() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=karimi"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = "\
Records found in Bank A customers
for \"Full name: karimi\"
4 row(s) found, 1 record(s) after removing duplicates and merging records

1.
  Full name : Ali Karimi
  Birth date: 1365/02/11
  Card      : 6037991234567890
  Card 2    : 6104337654321098
";
    assert_eq!(stdout, expected);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("4 row(s) found in "), "stderr: {stderr}");
    assert!(stderr.contains("; 2 after removing duplicates; 1 record(s)"), "stderr: {stderr}");
}

#[test]
fn search_json_is_single_value() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=Ali", "-f", "birth=1365", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["source"], "bank_a");
    assert_eq!(val["criteria"][1], "Birth date starts with: 1365");
    assert_eq!(val["summary"]["raw_rows"], 4);
    assert_eq!(val["summary"]["exact_duplicates"], 1);
    assert_eq!(val["summary"]["dominated_rows"], 1);
    assert_eq!(val["summary"]["consolidated_records"], 1);
    assert_eq!(val["meta"]["absent_keys"], "isolate");
    let fields = &val["records"][0]["fields"];
    assert_eq!(fields["CARD_NO"], "6037991234567890");
    assert_eq!(fields["CARD_NO_2"], "6104337654321098");
    assert!(fields.get("CARD_NO_3").is_none());
}

#[test]
fn search_writes_output_file() {
    let dir = fixture();
    let out_path = dir.path().join("result.json");
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=Sara", "-q"])
        .arg("--output")
        .arg(&out_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "quiet run wrote to stderr");
    let written = std::fs::read_to_string(&out_path).unwrap();
    let val = assert_single_json(&written);
    assert_eq!(val["records"][0]["identity"], "0098765432");
}

#[test]
fn search_csv_source() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "branch", "-f", "name=reza", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["title"], "branch");
    assert_eq!(val["summary"]["resolved_rows"], 1);
    assert_eq!(val["records"][0]["fields"]["PHONE"], "0935");
}

#[test]
fn no_results_exit_code() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=Nobody"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(10));
}

#[test]
fn injection_attempt_is_literal() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=' OR '1'='1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(10));

    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=%"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(10));
}

#[test]
fn empty_criteria_exit_code() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=  "])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(11));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: fill at least one field"), "stderr: {stderr}");
    assert!(stderr.contains("hint:"), "stderr: {stderr}");
}

#[test]
fn unknown_filter_and_source() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "phone=0912"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(11));

    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_z", "-f", "name=x", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(11));
    assert!(output.stdout.is_empty(), "errors must not reach stdout");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"error\":\"unknown_source\""), "stderr: {stderr}");
}

#[test]
fn malformed_filter_is_usage_error() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_catalog_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=x"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn missing_catalog_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=x", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty(), "errors must not reach stdout");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr.lines().find(|l| l.starts_with('{')).unwrap_or_else(|| panic!("no JSON error: {stderr}"));
    let val: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(val["error"], "io");
    assert_eq!(val["exit_code"], 4);
    assert!(val["message"].as_str().unwrap().contains("cannot read catalog"));
}

#[test]
fn no_results_prints_no_json_error() {
    let dir = fixture();
    let output = csearch()
        .args(["search", catalog(dir.path()).as_str(), "-s", "bank_a", "-f", "name=Nobody", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(10));
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["summary"]["raw_rows"], 0);
    assert!(!String::from_utf8_lossy(&output.stderr).contains("\"error\":"));
}

// ===========================================================================
// csearch validate
// ===========================================================================

#[test]
fn validate_lists_sources() {
    let dir = fixture();
    let output = csearch().args(["validate", catalog(dir.path()).as_str()]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bank_a: Bank A customers [sqlite bank_a.db (customers)] identity=NATIONAL_ID filters=name,birth"), "{stdout}");
    assert!(stdout.contains("branch: branch [csv branch.csv] identity=FULL_NAME filters=name"), "{stdout}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("catalog OK: 2 source(s)"));
}

#[test]
fn validate_rejects_bad_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.toml");
    std::fs::write(&path, "[sources.x.storage]\nkind = \"csv\"\npath = \"x.csv\"\n").unwrap();
    let output = csearch().arg("validate").arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

// ===========================================================================
// csearch dedup
// ===========================================================================

#[test]
fn dedup_csv_json() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("rows.csv");
    std::fs::write(
        &csv,
        "id,name,city,phone\n1,Ali,None,None\n1,Ali,None,0912\n2,Sara,Tehran,None\n2,Sara,Shiraz,None\nNone,Reza,Qom,None\nNone,Reza,Qom,0935\n",
    )
    .unwrap();

    let output = csearch()
        .arg("dedup")
        .arg(&csv)
        .args(["--identity", "id", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["summary"]["consolidated_records"], 4);
    assert_eq!(val["records"][1]["fields"]["city_2"], "Shiraz");

    let output = csearch()
        .arg("dedup")
        .arg(&csv)
        .args(["--identity", "id", "--absent-keys", "group", "--json"])
        .output()
        .unwrap();
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["summary"]["consolidated_records"], 3);
    assert_eq!(val["meta"]["absent_keys"], "group");
}

#[test]
fn dedup_variant_names_skip_real_columns() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("rows.csv");
    std::fs::write(&csv, "id,city,city_2\n2,Tehran,Karaj\n2,Shiraz,Karaj\n").unwrap();

    let output = csearch()
        .arg("dedup")
        .arg(&csv)
        .args(["--identity", "id", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    let fields = val["records"][0]["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields["city"], "Tehran");
    assert_eq!(fields["city_2"], "Karaj");
    assert_eq!(fields["city_3"], "Shiraz");
}

#[test]
fn dedup_json_error_on_bad_profile() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("rows.csv");
    std::fs::write(&csv, "id\n1\n").unwrap();

    let output = csearch()
        .arg("dedup")
        .arg(&csv)
        .args(["--identity", "  ", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty(), "errors must not reach stdout");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr.lines().find(|l| l.starts_with('{')).unwrap_or_else(|| panic!("no JSON error: {stderr}"));
    let val: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(val["error"], "config_invalid");
    assert_eq!(val["exit_code"], 3);

    let output = csearch()
        .arg("dedup")
        .arg(dir.path().join("missing.csv"))
        .args(["--identity", "id", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("\"error\":\"io\""));
}

#[test]
fn dedup_requires_identity_or_profile() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("rows.csv");
    std::fs::write(&csv, "id\n1\n").unwrap();
    let output = csearch().arg("dedup").arg(&csv).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn dedup_with_profile() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("rows.csv");
    let profile = dir.path().join("profile.toml");
    std::fs::write(&csv, "id,note\n1,\n1,x\n").unwrap();
    std::fs::write(&profile, "identity_field = \"id\"\nabsent_markers = [\"\"]\n").unwrap();

    let output = csearch()
        .arg("dedup")
        .arg(&csv)
        .arg("--profile")
        .arg(&profile)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 row(s) found, 1 record(s)"), "{stdout}");
    assert!(stdout.contains("  note: x\n"), "{stdout}");
}

// ===========================================================================
// csearch shell
// ===========================================================================

#[test]
fn shell_session_over_stdin() {
    let dir = fixture();
    let mut child = csearch()
        .args(["shell", catalog(dir.path()).as_str(), "--source", "bank_a"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"find name=\"Sara Ahmadi\"\nuse branch\nfind name=Reza\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Records found in Bank A customers"), "{stdout}");
    assert!(stdout.contains("  Full name : Sara Ahmadi\n"), "{stdout}");
    assert!(stdout.contains("using branch\n"), "{stdout}");
    assert!(stdout.contains("  PHONE    : 0935\n"), "{stdout}");
}
