//! CLI integration tests
//!
//! These tests run the `progmerge` binary against JSON documents in a scratch
//! directory and check its stdout and output files.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_progmerge"))
        .current_dir(dir)
        .args(["--log", "test"])
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn two_source_import() -> Value {
    json!({
        "a": { "groups": [{ "title": "Keynote", "originatingDataSourceId": "A" }] },
        "b": { "groups": [{ "title": "keynote ", "originatingDataSourceId": "B",
                            "description": "Opening talk" }] }
    })
}

#[test]
fn test_cli_merge_writes_outcome_and_report() {
    let temp_dir = TempDir::new().unwrap();
    let import = write_json(temp_dir.path(), "import.json", &two_source_import());
    let out = temp_dir.path().join("merged.json");

    let output = run(
        temp_dir.path(),
        &[
            "merge",
            "--import",
            import.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Import Changes"));

    let outcome: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let groups = outcome["snapshot"]["groups"].as_object().unwrap();
    assert_eq!(groups.len(), 1);

    let group = groups.values().next().unwrap();
    assert_eq!(group["title"], "Keynote");
    assert_eq!(group["description"], "Opening talk");
    assert_eq!(group["originatingDataSourceId"], "A¬B");
    assert_eq!(group["isNew"], true);
}

#[test]
fn test_cli_merge_report_only() {
    let temp_dir = TempDir::new().unwrap();
    let import = write_json(temp_dir.path(), "import.json", &two_source_import());

    let output = run(
        temp_dir.path(),
        &["merge", "--import", import.to_str().unwrap(), "--report"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("changes detected"));
    assert!(stdout.contains("MERGE_IMPORTED"));
}

#[test]
fn test_cli_merge_rejects_empty_payload() {
    let temp_dir = TempDir::new().unwrap();
    let import = write_json(temp_dir.path(), "import.json", &json!({}));

    let output = run(
        temp_dir.path(),
        &["merge", "--import", import.to_str().unwrap()],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_cli_plan_derives_dirty_keys() {
    let temp_dir = TempDir::new().unwrap();
    let original = write_json(
        temp_dir.path(),
        "original.json",
        &json!({
            "tags": {
                "t1": { "id": "t1", "name": "AI" },
                "t2": { "id": "t2", "name": "ML" }
            }
        }),
    );
    let edited = write_json(
        temp_dir.path(),
        "edited.json",
        &json!({
            "tags": {
                "t1": { "id": "t1", "name": "Artificial Intelligence" },
                "t3": { "id": "t3", "isNew": true, "name": "Robotics" }
            }
        }),
    );

    let output = run(
        temp_dir.path(),
        &[
            "plan",
            "--original",
            original.to_str().unwrap(),
            "--edited",
            edited.to_str().unwrap(),
            "--json",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let plan: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["tags"]["new"][0]["id"], "t3");
    assert_eq!(plan["tags"]["updated"][0]["id"], "t1");
    assert_eq!(plan["tags"]["deleted"], json!(["t2"]));
}

#[test]
fn test_cli_plan_nothing_to_save() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = write_json(
        temp_dir.path(),
        "snapshot.json",
        &json!({ "tags": { "t1": { "id": "t1", "name": "AI" } } }),
    );

    let output = run(
        temp_dir.path(),
        &[
            "plan",
            "--original",
            snapshot.to_str().unwrap(),
            "--edited",
            snapshot.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("_Nothing to save._"));
}
