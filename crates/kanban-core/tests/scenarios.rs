//! Integration tests: end-to-end board scenarios through the public API.
//!
//! Covers:
//!   - create / move / delete history and time travel back into it
//!   - soft no-ops leaving the log untouched
//!   - import with colliding ids, including legacy note payloads
//!   - query parsing and ordering over a small board
//!   - persistence through the JSON file store

use chrono::{DateTime, Duration, TimeZone, Utc};
use kanban_core::event::{Action, AuditFilter, AuditSummary, SYSTEM_TASK_ID};
use kanban_core::model::{Priority, Status, Task, TaskDraft, TaskField, TaskId};
use kanban_core::mutate::{MutationError, NoChange, Outcome};
use kanban_core::query::{apply_query, parse_query};
use kanban_core::replay::reverse_event;
use kanban_core::store::{JsonFileStore, StateStore};
use kanban_core::{AppState, Board, FirstRun};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 8, 12, 0, 0).unwrap()
}

fn make_task(title: &str) -> Task {
    TaskDraft::new(title).into_task(Utc::now())
}

fn tagged(title: &str, priority: Priority, tags: &[&str], due_in_days: Option<i64>) -> Task {
    let mut draft = TaskDraft::new(title);
    draft.priority = priority;
    draft.tags = tags.iter().map(ToString::to_string).collect();
    draft.estimate_minutes = 60;
    draft.due_at = due_in_days.map(|d| fixed_now() + Duration::days(d));
    draft.into_task(fixed_now() - Duration::days(30))
}

const DUPLICATE_ID: &str = "0b8f2c1e-5d3a-4f6b-9a7c-2e1d0c9b8a76";

fn duplicate_payload() -> String {
    serde_json::json!({
        "tasks": [
            {
                "id": DUPLICATE_ID,
                "title": "Hedge MXN exposure",
                "priority": "high",
                "tags": ["fx"],
                "estimateMinutes": 30,
                "createdAt": "2026-02-01T09:00:00.000Z",
                "status": "todo"
            },
            {
                "id": DUPLICATE_ID,
                "title": "Hedge BRL exposure",
                "priority": "medium",
                "tags": ["fx"],
                "estimateMinutes": 45,
                "createdAt": "2026-02-01T10:00:00.000Z",
                "status": "doing"
            }
        ],
        "audit": [],
        "ui": { "godMode": true }
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// History and time travel
// ---------------------------------------------------------------------------

#[test]
fn create_move_move_delete_then_travel_back() {
    let mut state = AppState::default();
    let t1 = make_task("Rebalance LATAM book");
    let id = t1.id.clone();

    assert_eq!(state.create(t1.clone()).unwrap(), Outcome::Applied);
    assert_eq!(state.move_task(&id, Status::Doing), Outcome::Applied);
    assert_eq!(state.move_task(&id, Status::Done), Outcome::Applied);
    assert_eq!(state.delete(&id), Outcome::Applied);

    let actions: Vec<Action> = state.audit.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![Action::Create, Action::Move, Action::Move, Action::Delete]
    );
    assert!(state.tasks.is_empty());

    let report = state.time_travel(1).unwrap();
    assert_eq!(report.target_index, 1);
    assert_eq!(report.reverted_events, 2);

    let mut expected = t1;
    expected.status = Status::Doing;
    assert_eq!(state.tasks, vec![expected]);

    // History is kept and the jump itself is recorded.
    assert_eq!(state.audit.len(), 5);
    let marker = &state.audit[4];
    assert_eq!(marker.action, Action::Update);
    assert_eq!(marker.task_id, SYSTEM_TASK_ID);
    assert!(marker.diff.note.as_deref().unwrap().starts_with("time travel to "));
}

#[test]
fn travel_past_the_end_is_rejected_without_changes() {
    let mut state = AppState::default();
    state.create(make_task("Close energy position")).unwrap();
    let before = state.clone();

    let err = state.time_travel(1).unwrap_err();
    assert_eq!((err.index, err.len), (1, 1));
    assert_eq!(state, before);
}

#[test]
fn update_reversal_restores_cleared_fields() {
    let mut state = AppState::default();
    let mut task = make_task("Validate volatility signals");
    task.description = Some("Compare with the US desk".into());
    task.due_at = Some(task.created_at + Duration::days(3));
    state.create(task.clone()).unwrap();

    let mut edited = task.clone();
    edited.description = None;
    edited.due_at = None;
    edited.priority = Priority::High;
    assert_eq!(state.update(edited.clone()).unwrap(), Outcome::Applied);

    let event = state.audit.last().unwrap();
    assert_eq!(
        event.diff.changed_fields(),
        vec![TaskField::Description, TaskField::Priority, TaskField::DueAt]
    );

    let reverted = reverse_event(state.tasks.clone(), event);
    assert_eq!(reverted, vec![task]);
}

// ---------------------------------------------------------------------------
// Soft no-ops and hard errors
// ---------------------------------------------------------------------------

#[test]
fn no_ops_leave_the_log_alone() {
    let mut state = AppState::default();
    let task = make_task("Prepare Asia briefing");
    state.create(task.clone()).unwrap();

    assert_eq!(
        state.move_task(&task.id, Status::Todo),
        Outcome::Unchanged(NoChange::AlreadyInStatus(Status::Todo))
    );
    assert_eq!(
        state.update(task.clone()).unwrap(),
        Outcome::Unchanged(NoChange::NothingChanged)
    );
    let ghost = TaskId::generate();
    assert_eq!(
        state.delete(&ghost),
        Outcome::Unchanged(NoChange::TaskNotFound(ghost))
    );
    assert_eq!(state.audit.len(), 1);
}

#[test]
fn hard_errors_reject_without_side_effects() {
    let mut state = AppState::default();
    let task = make_task("Tune stop-loss levels");
    state.create(task.clone()).unwrap();
    let before = state.clone();

    assert_eq!(
        state.create(task.clone()).unwrap_err(),
        MutationError::DuplicateId(task.id.clone())
    );

    let mut rewritten = task.clone();
    rewritten.created_at -= Duration::days(1);
    assert_eq!(
        state.update(rewritten).unwrap_err(),
        MutationError::CreatedAtChanged(task.id.clone())
    );

    let mut short = task;
    short.title = " ab ".into();
    assert!(matches!(
        state.update(short).unwrap_err(),
        MutationError::Invalid(_)
    ));

    assert_eq!(state, before);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[test]
fn import_resolves_duplicate_ids() {
    let mut state = AppState::default();
    let report = state.import_payload(&duplicate_payload()).unwrap();

    assert_eq!(report.imported_tasks, 2);
    assert_eq!(report.duplicates_resolved, 1);
    let ids: HashSet<&TaskId> = state.tasks.iter().map(|t| &t.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(state.tasks.iter().any(|t| t.id == *DUPLICATE_ID));
    assert!(state.ui.god_mode);

    let resolves: Vec<_> = state
        .audit
        .iter()
        .filter(|e| e.action == Action::ResolveDuplicateId)
        .collect();
    assert_eq!(resolves.len(), 1);
    assert_ne!(resolves[0].task_id, DUPLICATE_ID);

    let marker = state.audit.last().unwrap();
    assert_eq!(marker.action, Action::Import);
    assert_eq!(
        marker.diff.note.as_deref(),
        Some("Imported 2 tasks, duplicates resolved 1")
    );
}

#[test]
fn import_can_be_travelled_back() {
    let mut state = AppState::default();
    let local = make_task("Existing local work");
    state.create(local.clone()).unwrap();

    state.import_payload(&duplicate_payload()).unwrap();
    assert_eq!(state.tasks.len(), 2);

    state.time_travel(0).unwrap();
    assert_eq!(state.tasks, vec![local]);
}

#[test]
fn invalid_import_lists_every_issue_and_changes_nothing() {
    let mut state = AppState::default();
    let payload = r#"{"tasks": [{"id": "nope", "title": "x"}], "audit": 3}"#;
    let err = state.import_payload(payload).unwrap_err();

    let paths: Vec<&str> = err.issues.iter().map(|i| i.path.as_str()).collect();
    assert!(paths.contains(&"tasks.0.id"));
    assert!(paths.contains(&"tasks.0.title"));
    assert!(paths.contains(&"audit"));
    assert!(paths.contains(&"ui"));
    assert_eq!(state, AppState::default());
}

#[test]
fn legacy_import_note_is_reversible() {
    let prior = make_task("Before the legacy import");
    let note = format!(
        "Imported 0 tasks||{}",
        serde_json::json!({ "prevTasks": [prior] })
    );
    let payload = serde_json::json!({
        "tasks": [],
        "audit": [{
            "timestamp": "2026-02-01T09:00:00.000Z",
            "action": "IMPORT",
            "taskId": "SYSTEM",
            "actorLabel": "board-user",
            "diff": { "note": note }
        }],
        "ui": { "godMode": false }
    })
    .to_string();

    let state = kanban_core::validate::parse_state(&payload).unwrap();
    let restored = reverse_event(Vec::new(), &state.audit[0]);
    assert_eq!(restored, vec![prior]);
}

// ---------------------------------------------------------------------------
// Query and inspection
// ---------------------------------------------------------------------------

#[test]
fn query_filters_and_orders() {
    let tasks = vec![
        tagged("Hedge FX book", Priority::High, &["fx", "risk"], Some(5)),
        tagged("Review FX limits", Priority::High, &["FX"], Some(2)),
        tagged("Rebalance equities", Priority::High, &["equity"], Some(1)),
        tagged("Document FX desk", Priority::Low, &["fx"], None),
    ];

    let query = parse_query("p:high tag:fx").unwrap();
    let titles: Vec<&str> = apply_query(&tasks, &query, fixed_now(), 7)
        .into_iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Review FX limits", "Hedge FX book"]);

    let everything = apply_query(&tasks, &parse_query("").unwrap(), fixed_now(), 7);
    assert_eq!(everything.last().unwrap().title, "Document FX desk");

    assert!(parse_query("p:urgent").is_err());
}

#[test]
fn audit_views_over_a_session() {
    let mut state = AppState::default();
    let a = make_task("Hedge FX book");
    let b = make_task("Post-mortem bond trade");
    state.create(a.clone()).unwrap();
    state.create(b.clone()).unwrap();
    let _ = state.move_task(&a.id, Status::Doing);
    let _ = state.delete(&b.id);

    let moves = AuditFilter {
        action: Some(Action::Move),
        ..AuditFilter::default()
    };
    assert_eq!(moves.apply(&state.audit).count(), 1);

    let bond = AuditFilter {
        search: Some("BOND".into()),
        ..AuditFilter::default()
    };
    let hits: Vec<usize> = bond.apply(&state.audit).map(|(i, _)| i).collect();
    assert_eq!(hits, vec![1, 3]);

    let summary = AuditSummary::from_events(&state.audit);
    assert_eq!(summary.counts.get(&Action::Create), Some(&2));
    assert_eq!(summary.distinct_tasks, 2);
    assert_eq!(summary.recent.len(), 4);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn board_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".kanban").join("state.json");

    let task = make_task("Update exposure limits");
    {
        let mut board = Board::open(JsonFileStore::new(&path), FirstRun::Empty).unwrap();
        board.create(task.clone()).unwrap();
        let _ = board.move_task(&task.id, Status::Done);
    }

    let reopened = Board::open(JsonFileStore::new(&path), FirstRun::Seed).unwrap();
    assert_eq!(reopened.tasks().len(), 1);
    assert_eq!(reopened.tasks()[0].status, Status::Done);
    assert_eq!(reopened.audit().len(), 2);
    assert_eq!(
        reopened.state().ui.last_moved_task_id.as_deref(),
        Some(task.id.as_str())
    );

    let direct = JsonFileStore::new(&path).load_strict().unwrap().unwrap();
    assert_eq!(&direct, reopened.state());
}
