//! Integration tests for `structeq compare`.
#![allow(clippy::expect_used)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Path to the compiled `structeq` binary.
fn structeq_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("structeq");
    path
}

fn json_file(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create temp file");
    f.write_all(contents.as_bytes()).expect("write temp file");
    f
}

fn path_of(f: &tempfile::NamedTempFile) -> &str {
    f.path().to_str().expect("utf-8 path")
}

fn compare(left: &str, right: &str, extra: &[&str]) -> Output {
    let (a, b) = (json_file(left), json_file(right));
    Command::new(structeq_bin())
        .arg("compare")
        .arg(path_of(&a))
        .arg(path_of(&b))
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("run structeq compare")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

#[test]
fn equal_documents_exit_0() {
    let out = compare(r#"{"a": [1, 2.0], "b": null}"#, r#"{"b": null, "a": [1, 2]}"#, &[]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "equal\n");
}

#[test]
fn different_documents_exit_1_with_diagnostic() {
    let out = compare(
        r#"{"name": "Jim", "age": 27}"#,
        r#"{"name": "Jim", "age": 34}"#,
        &["--objects-as-records"],
    );
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.starts_with("[field value mismatch] ▶ Object {"), "stdout: {text}");
    assert!(text.contains(" ▶ .age\n  Expected: 27\n  Found: 34"), "stdout: {text}");
    assert!(stderr(&out).is_empty(), "stderr: {}", stderr(&out));
}

#[test]
fn invalid_json_exits_2() {
    let out = compare("{", "{}", &[]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("not valid JSON"), "stderr: {}", stderr(&out));
}

#[test]
fn missing_file_exits_2() {
    let out = Command::new(structeq_bin())
        .args(["compare", "/no/such/left.json", "/no/such/right.json"])
        .output()
        .expect("run structeq compare");
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("file not found"));
}

#[test]
fn stdin_twice_exits_2() {
    let out = Command::new(structeq_bin())
        .args(["compare", "-", "-"])
        .stdin(Stdio::null())
        .output()
        .expect("run structeq compare");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn depth_limit_exits_3() {
    let deep = "[[[[[[1]]]]]]";
    let out = compare(deep, deep, &["--max-depth", "3"]);
    assert_eq!(out.status.code(), Some(3));
    assert!(
        stderr(&out).contains("max_depth is 3"),
        "stderr: {}",
        stderr(&out)
    );
}

#[test]
fn limit_from_environment() {
    let (a, b) = (json_file("[1, 2, 3]"), json_file("[1, 2, 3]"));
    let out = Command::new(structeq_bin())
        .args(["compare", path_of(&a), path_of(&b)])
        .env("STRUCTEQ_MAX_COLLECTION_SIZE", "2")
        .output()
        .expect("run structeq compare");
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn file_size_limit_exits_2() {
    let out = compare("[1, 2, 3]", "[1, 2, 3]", &["--max-file-size", "4"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("too large"));
}

// ---------------------------------------------------------------------------
// Comparison flags
// ---------------------------------------------------------------------------

#[test]
fn arrays_as_sets_ignores_order() {
    assert_eq!(compare("[1, 2, 3]", "[3, 2, 1]", &[]).status.code(), Some(1));
    assert_eq!(
        compare("[1, 2, 3]", "[3, 2, 1]", &["--arrays-as-sets"])
            .status
            .code(),
        Some(0)
    );
}

#[test]
fn strings_match_numbers_flag() {
    let (left, right) = (r#"{"price": "2.50"}"#, r#"{"price": 2.5}"#);
    assert_eq!(compare(left, right, &[]).status.code(), Some(1));
    assert_eq!(
        compare(left, right, &["--strings-match-numbers"])
            .status
            .code(),
        Some(0)
    );
}

#[test]
fn secure_errors_redacts_credentials() {
    let out = compare(
        r#"{"user": "jim", "password": "hunter2"}"#,
        r#"{"user": "jim", "password": "hunter3"}"#,
        &["--objects-as-records", "--secure-errors"],
    );
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(!text.contains("hunter"), "stdout: {text}");
    assert!(text.contains("[REDACTED]"), "stdout: {text}");
}

#[test]
fn json_format_reports_difference() {
    let out = compare("[1, 2]", "[1, 2, 3]", &["--format", "json"]);
    assert_eq!(out.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json report");
    assert_eq!(report["equal"], false);
    assert_eq!(report["difference"], "collection size mismatch");
    assert_eq!(report["details"], "  Expected size: 2\n  Found size: 3");
}

#[test]
fn reads_left_document_from_stdin() {
    let right = json_file(r#"{"k": [true]}"#);
    let mut child = Command::new(structeq_bin())
        .args(["compare", "-", path_of(&right)])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn structeq");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(br#"{"k": [true]}"#)
        .expect("write stdin");
    let out = child.wait_with_output().expect("wait");
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn verbose_logs_to_stderr_only() {
    let out = compare("[1]", "[1]", &["--verbose"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "equal\n");
    assert!(stderr(&out).contains("comparison finished"), "stderr: {}", stderr(&out));
}
