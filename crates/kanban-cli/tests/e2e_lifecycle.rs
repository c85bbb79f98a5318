//! E2E CLI tests covering the task lifecycle:
//! - `kb init` (seeded and empty boards, re-init guard)
//! - `kb create/update/move/delete` JSON contracts
//! - `kb list` with query tokens, `kb show` history
//! - error codes for uninitialized boards and unknown tasks
//!
//! Each test runs `kb` as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the kb binary, rooted in `dir`.
fn kb_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kb"));
    cmd.current_dir(dir);
    cmd.env("KANBAN_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn init_empty(dir: &Path) {
    kb_cmd(dir).args(["init", "--empty"]).assert().success();
}

fn json_of(dir: &Path, args: &[&str]) -> Value {
    let output = kb_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("kb should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

/// Create a task and return its full id.
fn create(dir: &Path, extra: &[&str]) -> String {
    let mut args = vec!["create"];
    args.extend_from_slice(extra);
    let report = json_of(dir, &args);
    assert_eq!(report["applied"], true);
    report["task_id"]
        .as_str()
        .expect("create output should have 'task_id'")
        .to_string()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_seeds_demo_board() {
    let dir = TempDir::new().unwrap();
    let report = json_of(dir.path(), &["init"]);
    assert_eq!(report["tasks"], 8);
    assert_eq!(report["events"], 1);
    assert!(dir.path().join(".kanban/config.toml").exists());
    assert!(dir.path().join(".kanban/state.json").exists());

    let tasks = json_of(dir.path(), &["list"]);
    assert_eq!(tasks.as_array().unwrap().len(), 8);
}

#[test]
fn init_twice_needs_force() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());
    kb_cmd(dir.path())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    create(dir.path(), &["--title", "Short-lived task"]);
    let report = json_of(dir.path(), &["init", "--force", "--empty"]);
    assert_eq!(report["tasks"], 0);
}

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();
    kb_cmd(dir.path())
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));

    kb_cmd(dir.path())
        .args(["list", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_code\": \"E1001\""));
}

// ---------------------------------------------------------------------------
// mutations
// ---------------------------------------------------------------------------

#[test]
fn create_update_move_delete() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());

    let id = create(
        dir.path(),
        &[
            "--title",
            "Hedge FX book",
            "-p",
            "high",
            "--tag",
            "fx,risk",
            "-e",
            "45",
            "--due",
            "2099-01-31",
        ],
    );

    let task = &json_of(dir.path(), &["show", &id])["task"];
    assert_eq!(task["priority"], "high");
    assert_eq!(task["tags"], serde_json::json!(["fx", "risk"]));
    assert_eq!(task["estimateMinutes"], 45);
    assert_eq!(task["dueAt"], "2099-01-31T23:59:59Z");
    assert_eq!(task["status"], "todo");

    let updated = json_of(dir.path(), &["update", &id[..8], "--priority", "low", "--due", "none"]);
    assert_eq!(updated["applied"], true);
    assert_eq!(updated["task"]["priority"], "low");
    assert!(updated["task"].get("dueAt").is_none());

    let moved = json_of(dir.path(), &["move", &id, "doing"]);
    assert_eq!(moved["task"]["status"], "doing");
    assert_eq!(moved["audit_len"], 3);

    let deleted = json_of(dir.path(), &["delete", &id]);
    assert_eq!(deleted["applied"], true);
    assert!(deleted.get("task").is_none());
    assert_eq!(deleted["audit_len"], 4);

    let list = json_of(dir.path(), &["list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn repeated_move_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());
    let id = create(dir.path(), &["--title", "Close energy position"]);

    let first = json_of(dir.path(), &["move", &id, "done"]);
    assert_eq!(first["applied"], true);
    let second = json_of(dir.path(), &["move", &id, "done"]);
    assert_eq!(second["applied"], false);
    assert_eq!(second["audit_len"], first["audit_len"]);
}

#[test]
fn invalid_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());

    kb_cmd(dir.path())
        .args(["create", "--title", "ab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"));

    kb_cmd(dir.path())
        .args(["create", "--title", "Backdated", "--due", "2001-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));

    kb_cmd(dir.path())
        .args(["move", "no-such-task", "done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"));

    assert!(json_of(dir.path(), &["log"]).as_array().unwrap().is_empty());
}

#[test]
fn review_fields_need_god_mode() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());

    kb_cmd(dir.path())
        .args(["create", "--title", "Scored task", "--score", "7"])
        .assert()
        .failure();

    assert_eq!(json_of(dir.path(), &["god-mode", "on"])["god_mode"], true);
    let id = create(
        dir.path(),
        &["--title", "Scored task", "--score", "7", "--comment", "solid"],
    );
    let task = &json_of(dir.path(), &["show", &id])["task"];
    assert_eq!(task["rubric"]["score"], 7);
    assert_eq!(task["rubric"]["comment"], "solid");

    // Toggling the flag is not audited.
    let log = json_of(dir.path(), &["log"]);
    assert_eq!(log.as_array().unwrap().len(), 1);
}

#[test]
fn unsaved_changes_are_reported_as_failures() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());
    // A directory where the temp file should go makes every save fail.
    std::fs::create_dir(dir.path().join(".kanban/state.json.tmp")).unwrap();

    kb_cmd(dir.path())
        .args(["create", "--title", "Hedge FX book", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_code\": \"E5002\""));

    kb_cmd(dir.path())
        .args(["god-mode", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E5002]"));

    assert!(json_of(dir.path(), &["list"]).as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// read side
// ---------------------------------------------------------------------------

#[test]
fn list_filters_with_query_tokens() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());
    create(dir.path(), &["--title", "Hedge FX book", "-p", "high", "--tag", "fx"]);
    create(dir.path(), &["--title", "Review FX limits", "-p", "low", "--tag", "fx"]);
    create(dir.path(), &["--title", "Bond post-mortem", "-p", "high", "--tag", "bonds"]);

    let hits = json_of(dir.path(), &["list", "p:high", "tag:fx"]);
    let titles: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Hedge FX book"]);

    kb_cmd(dir.path())
        .args(["list", "p:urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3002"));

    kb_cmd(dir.path())
        .args(["list", "nothing-matches-this"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks match."));
}

#[test]
fn show_lists_task_history() {
    let dir = TempDir::new().unwrap();
    init_empty(dir.path());
    let id = create(dir.path(), &["--title", "Prepare Asia briefing"]);
    json_of(dir.path(), &["update", &id, "--description", "macro notes"]);
    json_of(dir.path(), &["move", &id, "doing"]);

    let view = json_of(dir.path(), &["show", &id]);
    let actions: Vec<&str> = view["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["CREATE", "UPDATE", "MOVE"]);
    assert_eq!(view["recently_changed"], serde_json::json!(["description"]));

    kb_cmd(dir.path())
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Prepare Asia briefing"))
        .stdout(predicate::str::contains("History"));
}
