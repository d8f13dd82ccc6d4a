//! Integration tests for the `hashref` command-line interface.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn setup_test_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("greek.txt"), "alpha\nbeta\ngamma\n").unwrap();
    dir
}

fn hashref(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hashref"))
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .env_remove("HASHREF_WORKSPACE")
        .env_remove("HASHREF_LOG")
        .output()
        .expect("failed to run hashref")
}

fn fingerprint(text: &str) -> String {
    hashref_patcher::line_fingerprint(text)
}

fn write_edits(dir: &TempDir, json: serde_json::Value) -> String {
    let path = dir.path().join("edits.json");
    fs::write(&path, json.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_hash() {
    let dir = setup_test_workspace();
    let output = hashref(dir.path(), &["hash", "beta"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), fingerprint("beta"));
}

#[test]
fn test_cli_view_annotates_lines() {
    let dir = setup_test_workspace();
    let output = hashref(dir.path(), &["view", "greek.txt"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("1:{}| alpha", fingerprint("alpha"))));
    assert!(stdout.contains(&format!("3:{}| gamma", fingerprint("gamma"))));
}

#[test]
fn test_cli_view_with_offset_and_limit() {
    let dir = setup_test_workspace();
    let output = hashref(dir.path(), &["view", "greek.txt", "--offset", "2", "--limit", "1"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("2:{}| beta", fingerprint("beta"))
    );
}

#[test]
fn test_cli_patch_prints_document() {
    let dir = setup_test_workspace();
    let edits = write_edits(
        &dir,
        serde_json::json!({
            "filePath": "greek.txt",
            "edits": [{ "startHash": format!("2:{}", fingerprint("beta")), "content": "BETA" }]
        }),
    );

    let output = hashref(dir.path(), &["patch", &edits]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "*** Begin Patch\n*** Update File: greek.txt\n@@ alpha\n-beta\n+BETA\n*** End Patch"
    );
    // patch never writes
    assert_eq!(
        fs::read_to_string(dir.path().join("greek.txt")).unwrap(),
        "alpha\nbeta\ngamma\n"
    );
}

#[test]
fn test_cli_edit_applies_change() {
    let dir = setup_test_workspace();
    let edits = write_edits(
        &dir,
        serde_json::json!({
            "filePath": "greek.txt",
            "afterHash": format!("3:{}", fingerprint("gamma")),
            "content": "delta"
        }),
    );

    let output = hashref(dir.path(), &["edit", &edits]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(dir.path().join("greek.txt")).unwrap(),
        "alpha\nbeta\ngamma\ndelta\n"
    );
}

#[test]
fn test_cli_edit_content_with_trailing_newline() {
    let dir = setup_test_workspace();
    let edits = write_edits(
        &dir,
        serde_json::json!({
            "filePath": "greek.txt",
            "startHash": format!("2:{}", fingerprint("beta")),
            "content": "BETA\n"
        }),
    );

    let output = hashref(dir.path(), &["edit", &edits]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(dir.path().join("greek.txt")).unwrap(),
        "alpha\nBETA\ngamma\n"
    );
}

#[test]
fn test_cli_edit_empty_content_removes_line() {
    let dir = setup_test_workspace();
    let edits = write_edits(
        &dir,
        serde_json::json!({
            "filePath": "greek.txt",
            "startHash": format!("2:{}", fingerprint("beta")),
            "content": ""
        }),
    );

    let output = hashref(dir.path(), &["edit", &edits]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(dir.path().join("greek.txt")).unwrap(),
        "alpha\ngamma\n"
    );
}

#[test]
fn test_cli_edit_dry_run() {
    let dir = setup_test_workspace();
    let edits = write_edits(
        &dir,
        serde_json::json!({
            "filePath": "greek.txt",
            "startHash": format!("1:{}", fingerprint("alpha")),
            "endHash": format!("2:{}", fingerprint("beta")),
            "content": "merged"
        }),
    );

    let output = hashref(dir.path(), &["edit", &edits, "--dry-run", "--diff"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("merged"));
    assert_eq!(
        fs::read_to_string(dir.path().join("greek.txt")).unwrap(),
        "alpha\nbeta\ngamma\n"
    );
}

#[test]
fn test_cli_edit_stale_reference_fails() {
    let dir = setup_test_workspace();
    let edits = write_edits(
        &dir,
        serde_json::json!({
            "filePath": "greek.txt",
            "startHash": format!("2:{}", fingerprint("beat")),
            "content": "x"
        }),
    );

    let output = hashref(dir.path(), &["edit", &edits]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("re-read the file"));
    assert_eq!(
        fs::read_to_string(dir.path().join("greek.txt")).unwrap(),
        "alpha\nbeta\ngamma\n"
    );
}

#[test]
fn test_cli_invalid_config() {
    let dir = setup_test_workspace();
    let config = dir.path().join("hashref.toml");
    fs::write(&config, "unknown_key = true\n").unwrap();

    let output = hashref(
        dir.path(),
        &["--config", &config.to_string_lossy(), "view", "greek.txt"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to parse config"));
}

#[test]
fn test_cli_discovers_workspace_config() {
    let dir = setup_test_workspace();
    fs::write(dir.path().join("hashref.toml"), "annotate_reads = false\n").unwrap();

    let output = hashref(dir.path(), &["view", "greek.txt"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "1: alpha\n2: beta\n3: gamma"
    );
}
