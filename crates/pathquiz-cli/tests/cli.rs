//! End-to-end tests for the pathquiz binary.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

/// Command isolated from the user's config and environment overrides.
fn pathquiz(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pathquiz").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env_remove("PATHQUIZ_QUIZ__MODE")
        .env_remove("PATHQUIZ_SYNC__AUTOSYNC_EVERY")
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}

fn questions() -> Value {
    json!([
        {
            "id": "q1",
            "text": "Which stain highlights amyloid?",
            "category": "staining",
            "options": [
                { "id": "q1-a", "text": "Congo red", "isCorrect": true },
                { "id": "q1-b", "text": "Gram stain", "isCorrect": false }
            ]
        },
        {
            "id": "q2",
            "text": "Hallmark of apoptosis?",
            "category": "cell-injury",
            "explanation": "Apoptosis shrinks the cell and fragments the nucleus.",
            "options": [
                { "id": "q2-a", "text": "Cell swelling", "isCorrect": false },
                { "id": "q2-b", "text": "Nuclear fragmentation", "isCorrect": true }
            ]
        }
    ])
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn session_actions() -> Value {
    json!([
        { "type": "INITIALIZE", "sessionId": "session-1", "questions": questions() },
        { "type": "START_QUIZ", "at": 1000 },
        { "type": "SUBMIT_ANSWER", "questionId": "q1", "selectedOptionId": "q1-a", "timeSpentMs": 5000 },
        { "type": "NEXT_QUESTION" },
        { "type": "SUBMIT_ANSWER", "questionId": "q2", "selectedOptionId": "q2-a", "timeSpentMs": 3000 },
        { "type": "NAVIGATE_TO_QUESTION", "index": 7 },
        { "type": "TOGGLE_FLAG", "questionId": "q2" }
    ])
}

fn replay_json(home: &Path, args: &[&str]) -> Value {
    let output = pathquiz(home)
        .arg("replay")
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "replay failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Basic commands
// ============================================================================

#[test]
fn version_command_succeeds() {
    let temp = TempDir::new().unwrap();
    pathquiz(temp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pathquiz"))
        .stdout(predicate::str::contains("Snapshot format: v1"));
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    pathquiz(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("--no-color"));
}

#[test]
fn replay_requires_actions_file() {
    let temp = TempDir::new().unwrap();
    pathquiz(temp.path())
        .arg("replay")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn replay_reports_progress_and_ignored_actions() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(temp.path(), "actions.json", &session_actions());

    pathquiz(temp.path())
        .args(["--no-color", "replay"])
        .arg(&actions)
        .assert()
        .success()
        .stdout(predicate::str::contains("Replayed 7 actions (6 applied, 1 ignored)"))
        .stdout(predicate::str::contains("#5 NAVIGATE_TO_QUESTION ignored: question index out of bounds"))
        .stdout(predicate::str::contains("2/2 (100%)"))
        .stdout(predicate::str::contains("1 correct, 1 incorrect"));
}

#[test]
fn replay_json_output_is_machine_readable() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(temp.path(), "actions.json", &session_actions());

    let report = replay_json(temp.path(), &[actions.to_str().unwrap()]);

    assert_eq!(report["actions"], 7);
    assert_eq!(report["applied"], 6);
    assert_eq!(report["ignored"][0]["index"], 5);
    assert_eq!(report["ignored"][0]["reason"], "index_out_of_bounds");
    assert_eq!(report["summary"]["status"], "in_progress");
    assert_eq!(report["summary"]["progress"]["percentage"], 100);
    assert_eq!(report["summary"]["stateHash"].as_str().unwrap().len(), 64);
    assert_eq!(report["state"]["currentQuestionIndex"], 1);
    assert_eq!(report["state"]["totalTimeSpentMs"], 8000);
}

#[test]
fn replay_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(temp.path(), "actions.json", &session_actions());
    let path = actions.to_str().unwrap();

    let first = replay_json(temp.path(), &[path]);
    let second = replay_json(temp.path(), &[path]);

    assert_eq!(first["summary"]["stateHash"], second["summary"]["stateHash"]);
    assert_eq!(first["state"], second["state"]);
}

#[test]
fn replay_strict_fails_on_ignored_actions() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(temp.path(), "actions.json", &session_actions());

    pathquiz(temp.path())
        .args(["replay", "--strict"])
        .arg(&actions)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 7 actions were ignored"));
}

#[test]
fn replay_rejects_unknown_action_type() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(
        temp.path(),
        "actions.json",
        &json!([{ "type": "SKIP_QUESTION" }]),
    );

    pathquiz(temp.path())
        .arg("replay")
        .arg(&actions)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Action #0 is malformed"));
}

#[test]
fn replay_uses_project_quiz_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("pathquiz.toml"),
        "[quiz]\nmode = \"practice\"\nallow_review = false\n",
    )
    .unwrap();
    let actions = write_json(temp.path(), "actions.json", &session_actions());

    let report = replay_json(temp.path(), &[actions.to_str().unwrap()]);

    assert_eq!(report["state"]["config"]["mode"], "practice");
    // Flagging is disabled without review
    assert_eq!(report["ignored"][1]["reason"], "review_disabled");
}

#[test]
fn replay_from_snapshot_continues_session() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(temp.path(), "actions.json", &session_actions());
    let snapshot = temp.path().join("snapshot.json");

    pathquiz(temp.path())
        .arg("replay")
        .arg(&actions)
        .arg("--out")
        .arg(&snapshot)
        .assert()
        .success();

    let finish = write_json(
        temp.path(),
        "finish.json",
        &json!([{ "type": "COMPLETE_QUIZ", "at": 90000 }]),
    );
    let report = replay_json(
        temp.path(),
        &[
            finish.to_str().unwrap(),
            "--from",
            snapshot.to_str().unwrap(),
        ],
    );

    assert_eq!(report["summary"]["status"], "completed");
    assert_eq!(report["state"]["completedAt"], 90000);
    assert_eq!(report["state"]["answers"].as_array().unwrap().len(), 2);
}

#[test]
fn replay_persist_and_resume() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(temp.path(), "actions.json", &session_actions());

    let stored = replay_json(temp.path(), &[actions.to_str().unwrap(), "--persist"]);
    assert_eq!(stored["summary"]["syncStatus"]["pendingChanges"], false);

    let snapshot_file = temp.path().join(".pathquiz/snapshots/session-1.json");
    assert!(snapshot_file.exists());

    let finish = write_json(
        temp.path(),
        "finish.json",
        &json!([{ "type": "ABANDON_QUIZ", "at": 50000 }]),
    );
    let resumed = replay_json(
        temp.path(),
        &[finish.to_str().unwrap(), "--resume", "session-1"],
    );

    assert_eq!(resumed["summary"]["status"], "abandoned");
    assert_eq!(resumed["summary"]["syncStatus"]["pendingChanges"], false);

    let on_disk: Value = serde_json::from_str(&fs::read_to_string(&snapshot_file).unwrap()).unwrap();
    assert_eq!(on_disk["status"], "abandoned");
}

#[test]
fn resume_unknown_session_fails() {
    let temp = TempDir::new().unwrap();
    let actions = write_json(temp.path(), "actions.json", &json!([]));

    pathquiz(temp.path())
        .arg("replay")
        .arg(&actions)
        .args(["--resume", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to resume session nobody"));
}

#[test]
fn from_and_resume_conflict() {
    let temp = TempDir::new().unwrap();
    pathquiz(temp.path())
        .args(["replay", "a.json", "--from", "b.json", "--resume", "s"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// Inspect
// ============================================================================

fn replayed_snapshot(dir: &Path) -> PathBuf {
    let actions = write_json(dir, "actions.json", &session_actions());
    let snapshot = dir.join("snapshot.json");
    pathquiz(dir)
        .arg("replay")
        .arg(&actions)
        .arg("--out")
        .arg(&snapshot)
        .assert()
        .success();
    snapshot
}

#[test]
fn inspect_shows_questions() {
    let temp = TempDir::new().unwrap();
    let snapshot = replayed_snapshot(temp.path());

    pathquiz(temp.path())
        .args(["--no-color", "inspect"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("is a valid snapshot"))
        .stdout(predicate::str::contains("session-1"))
        .stdout(predicate::str::contains("cell-injury"))
        .stdout(predicate::str::contains("incorrect"));
}

#[test]
fn inspect_json_reports_hash() {
    let temp = TempDir::new().unwrap();
    let snapshot = replayed_snapshot(temp.path());

    let output = pathquiz(temp.path())
        .arg("inspect")
        .arg(&snapshot)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["valid"], true);
    assert_eq!(summary["flagged"], json!(["q2"]));
    assert_eq!(summary["stateHash"].as_str().unwrap().len(), 64);
}

#[test]
fn inspect_rejects_tampered_snapshot() {
    let temp = TempDir::new().unwrap();
    let snapshot = replayed_snapshot(temp.path());

    let mut value: Value = serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
    value["progress"]["correct"] = json!(2);
    value["progress"]["incorrect"] = json!(0);
    fs::write(&snapshot, value.to_string()).unwrap();

    pathquiz(temp.path())
        .arg("inspect")
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is invalid"));
}

#[test]
fn inspect_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    pathquiz(temp.path())
        .args(["inspect", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_show_defaults() {
    let temp = TempDir::new().unwrap();
    pathquiz(temp.path())
        .args(["--no-color", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: tutor"))
        .stdout(predicate::str::contains("Autosync every: 5"));
}

#[test]
fn config_show_merges_project_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("pathquiz.toml"),
        "[project]\nname = \"boards\"\n\n[sync]\nautosync_every = 2\n",
    )
    .unwrap();

    pathquiz(temp.path())
        .args(["config", "show", "--format", "toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name = \"boards\""))
        .stdout(predicate::str::contains("autosync_every = 2"));
}

#[test]
fn config_env_overrides_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("pathquiz.toml"), "[sync]\nautosync_every = 2\n").unwrap();

    let output = pathquiz(temp.path())
        .env("PATHQUIZ_SYNC__AUTOSYNC_EVERY", "9")
        .env("PATHQUIZ_QUIZ__MODE", "practice")
        .args(["config", "show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["sync"]["autosync_every"], 9);
    assert_eq!(config["quiz"]["mode"], "practice");
}

#[test]
fn config_validate_rejects_timed_without_limit() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("pathquiz.toml"), "[quiz]\ntiming = \"timed\"\n").unwrap();

    pathquiz(temp.path())
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration validation failed"));
}
