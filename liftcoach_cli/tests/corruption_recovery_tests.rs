//! Corruption recovery tests for the liftcoach binary.
//!
//! The snapshot can always be rebuilt from the block's event journal, and a
//! torn final journal line is skipped.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("config.toml"), "").expect("Failed to write config");
    dir
}

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("liftcoach"));
    cmd.arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--config")
        .arg(dir.path().join("config.toml"));
    cmd
}

fn json(dir: &TempDir, args: &[&str]) -> Value {
    let output = cli(dir)
        .arg("--json")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout is not JSON")
}

fn start_and_load(dir: &TempDir) -> (Value, String) {
    cli(dir).args(["plan", "--days", "2"]).assert().success();
    let workout = json(dir, &["start"]);
    let exercise = workout["exercises"][0]["exercise"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    cli(dir)
        .args(["load", &exercise, "--weight", "100", "--reps", "5"])
        .assert()
        .success();
    (json(dir, &["show"]), exercise)
}

#[test]
fn test_corrupted_snapshot_is_rebuilt_from_journal() {
    let dir = setup_test_dir();
    let (before, exercise) = start_and_load(&dir);

    fs::write(dir.path().join("data/block.json"), "{ invalid json }}}}")
        .expect("Failed to corrupt snapshot");

    let recovered = json(&dir, &["show"]);
    assert_eq!(recovered, before);

    // Mutations keep working and rewrite a valid snapshot
    cli(&dir)
        .args(["set", &exercise, "1", "done"])
        .assert()
        .success();
    let contents = fs::read_to_string(dir.path().join("data/block.json")).unwrap();
    serde_json::from_str::<Value>(&contents).expect("snapshot still corrupted");
}

#[test]
fn test_corrupted_snapshot_without_journal_fails() {
    let dir = setup_test_dir();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/block.json"), "not json at all").unwrap();

    cli(&dir)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));
}

#[test]
fn test_torn_journal_line_is_skipped_during_recovery() {
    let dir = setup_test_dir();
    let (before, _) = start_and_load(&dir);
    let id = before["id"].as_str().unwrap();

    let journal = dir.path().join("data/events").join(format!("{}.jsonl", id));
    let mut file = fs::OpenOptions::new().append(true).open(&journal).unwrap();
    write!(file, "{{\"type\":\"SetStateHasChanged\",\"exercise_id\":").unwrap();
    drop(file);
    fs::remove_file(dir.path().join("data/block.json")).unwrap();
    fs::write(dir.path().join("data/block.json"), "").unwrap();

    let recovered = json(&dir, &["show"]);
    assert_eq!(recovered, before);
}

#[test]
fn test_missing_data_dir_is_created_on_plan() {
    let dir = setup_test_dir();
    assert!(!dir.path().join("data").exists());

    cli(&dir).args(["plan", "--days", "5"]).assert().success();

    assert!(dir.path().join("data/block.json").exists());
    assert!(dir.path().join("data/events").is_dir());
}
