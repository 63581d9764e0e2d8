//! Integration tests for flowgraph-cli.
//!
//! Runs the `flowgraph` binary against patch files written to a temp dir.

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `flowgraph` binary built by cargo.
fn flowgraph_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flowgraph"))
}

const MIXER: &str = r#"
name = "Mixer"
description = "two buses into master"

[[connections]]
source = "Reverb"
outlet = "out"
sink = "Master"
inlet = "in"

[[connections]]
source = "Chorus"
outlet = "out"
sink = "Master"
inlet = "in"

[[always_on]]
instrument = "Master"
params = [0.8]

[[tables]]
size = 4096
gen = 10
args = [1]

[[tables]]
size = 4096
gen = 10
args = [1]
"#;

fn write_patch(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("failed to write patch");
    path
}

// ---------------------------------------------------------------------------
// `flowgraph check`
// ---------------------------------------------------------------------------

#[test]
fn cli_check_valid_patch() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "mixer.toml", MIXER);

    let output = flowgraph_bin()
        .arg("check")
        .arg(&path)
        .output()
        .expect("failed to run flowgraph check");

    assert!(output.status.success(), "flowgraph check failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Patch:       Mixer"), "got: {stdout}");
    assert!(stdout.contains("Connections: 2 into 1 inlet"), "got: {stdout}");
    assert!(stdout.contains("OK"));
}

#[test]
fn cli_check_rejects_invalid_patch() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(
        &dir,
        "bad.toml",
        "name = \"Bad\"\nblock_size = 0\n",
    );

    let output = flowgraph_bin()
        .arg("check")
        .arg(&path)
        .output()
        .expect("failed to run flowgraph check");

    assert!(!output.status.success(), "invalid patch should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("block size"), "got: {stderr}");
}

#[test]
fn cli_check_missing_file() {
    let output = flowgraph_bin()
        .arg("check")
        .arg("/nonexistent/patch.toml")
        .output()
        .expect("failed to run flowgraph check");

    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `flowgraph routes`
// ---------------------------------------------------------------------------

#[test]
fn cli_routes_table() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "mixer.toml", MIXER);

    let output = flowgraph_bin()
        .arg("routes")
        .arg(&path)
        .output()
        .expect("failed to run flowgraph routes");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Master:in  <-  Reverb:out, Chorus:out"),
        "got: {stdout}"
    );
}

#[test]
fn cli_routes_json() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "mixer.toml", MIXER);

    let output = flowgraph_bin()
        .args(["routes", "--json"])
        .arg(&path)
        .output()
        .expect("failed to run flowgraph routes --json");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("routes --json should print JSON");
    assert_eq!(json[0]["sink"], "Master:in");
    assert_eq!(json[0]["sources"][0], "Reverb:out");
    assert_eq!(json[0]["sources"][1], "Chorus:out");
}

// ---------------------------------------------------------------------------
// `flowgraph dry-run`
// ---------------------------------------------------------------------------

#[test]
fn cli_dry_run_text() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "mixer.toml", MIXER);

    let output = flowgraph_bin()
        .arg("dry-run")
        .arg(&path)
        .output()
        .expect("failed to run flowgraph dry-run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Always-on events (1):"), "got: {stdout}");
    assert!(
        stdout.contains("i \"Master\" start=0 dur=held [0.8]"),
        "got: {stdout}"
    );
    assert!(stdout.contains("Tables (2 requested, 1 built):"), "got: {stdout}");
    assert!(stdout.contains("table 101"), "got: {stdout}");
}

#[test]
fn cli_dry_run_json() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "mixer.toml", MIXER);

    let output = flowgraph_bin()
        .args(["dry-run", "--json", "--first-table", "7"])
        .arg(&path)
        .output()
        .expect("failed to run flowgraph dry-run --json");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("dry-run --json should print JSON");
    assert_eq!(json["patch"], "Mixer");
    assert_eq!(json["events"][0]["instrument"], "Master");
    assert_eq!(json["events"][0]["duration"], -1.0);
    assert_eq!(json["tables"], serde_json::json!([7, 7]));
    assert_eq!(json["router"]["tables"][0]["handle"], 7);
    assert_eq!(json["router"]["connections"][0]["sink"], "Master:in");
}
