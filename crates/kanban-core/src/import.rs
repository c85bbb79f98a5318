//! Importing an external board payload into the live state.
//!
//! An import is one transaction: validate the payload, re-key colliding task
//! ids, then adopt the incoming tasks and UI flags. History is only ever
//! extended:
//!
//! ```text
//! existing log ++ incoming log ++ RESOLVE_DUPLICATE_ID* ++ IMPORT
//! ```
//!
//! The trailing `IMPORT` event records the collection it replaced in
//! `priorTasks`, so time travel can walk back across the import.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::ErrorCode;
use crate::event::{Action, AuditEvent, EventParams, create_event};
use crate::model::{Task, TaskId};
use crate::state::AppState;
use crate::validate::{ValidationIssue, parse_state};

/// A payload was rejected. Nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("import rejected with {} issue(s): {}", .issues.len(), summarize(.issues))]
pub struct ImportError {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ImportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidImport
    }
}

/// Result of [`resolve_duplicate_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateResolution {
    /// Input tasks in order, with later collisions re-keyed.
    pub tasks: Vec<Task>,
    /// One `RESOLVE_DUPLICATE_ID` event per re-keyed task.
    pub events: Vec<AuditEvent>,
    pub duplicate_count: usize,
}

/// Give every task whose id was already seen a fresh id.
///
/// The first occurrence of an id keeps it. Freshly generated ids are also
/// tracked, so the output ids are pairwise unique.
#[must_use]
pub fn resolve_duplicate_ids(tasks: Vec<Task>) -> DuplicateResolution {
    let mut seen: HashSet<TaskId> = HashSet::with_capacity(tasks.len());
    let mut events = Vec::new();
    let mut resolved = Vec::with_capacity(tasks.len());

    for task in tasks {
        if seen.insert(task.id.clone()) {
            resolved.push(task);
            continue;
        }
        let mut fresh_id = TaskId::generate();
        while !seen.insert(fresh_id.clone()) {
            fresh_id = TaskId::generate();
        }
        let mut rekeyed = task.clone();
        rekeyed.id = fresh_id;
        events.push(create_event(
            EventParams::task(Action::ResolveDuplicateId, &rekeyed.id)
                .before(&task)
                .after(&rekeyed)
                .note(format!("duplicate-id resolved: {} -> {}", task.id, rekeyed.id)),
        ));
        resolved.push(rekeyed);
    }

    let duplicate_count = events.len();
    if duplicate_count > 0 {
        tracing::info!(duplicate_count, "re-keyed colliding task ids");
    }
    DuplicateResolution {
        tasks: resolved,
        events,
        duplicate_count,
    }
}

/// What an import did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported_tasks: usize,
    pub imported_events: usize,
    pub duplicates_resolved: usize,
}

impl AppState {
    /// Validate `payload` and merge it into this state.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] listing every validation issue; `self` is not
    /// modified in that case.
    pub fn import_payload(&mut self, payload: &str) -> Result<ImportReport, ImportError> {
        let incoming = parse_state(payload).map_err(|issues| ImportError { issues })?;
        Ok(self.import_state(incoming))
    }

    /// Merge an already validated state into this one.
    pub fn import_state(&mut self, incoming: Self) -> ImportReport {
        let Self { tasks, audit, ui } = incoming;
        let imported_events = audit.len();
        let resolution = resolve_duplicate_ids(tasks);
        let report = ImportReport {
            imported_tasks: resolution.tasks.len(),
            imported_events,
            duplicates_resolved: resolution.duplicate_count,
        };

        let note = format!(
            "Imported {} tasks, duplicates resolved {}",
            report.imported_tasks, report.duplicates_resolved
        );
        let prior = std::mem::replace(&mut self.tasks, resolution.tasks);
        let marker = create_event(EventParams::system(Action::Import, note)).with_prior_tasks(prior);

        self.audit.extend(audit);
        for event in resolution.events {
            self.append(event);
        }
        self.append(marker);
        self.ui = ui;

        tracing::info!(
            tasks = report.imported_tasks,
            events = report.imported_events,
            duplicates = report.duplicates_resolved,
            "import applied"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskDraft;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn task(title: &str) -> Task {
        TaskDraft::new(title).into_task(Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap())
    }

    #[test]
    fn first_occurrence_keeps_id() {
        let a = task("Update client exposure limits");
        let mut b = task("Post-mortem on bond desk");
        b.id = a.id.clone();
        let c = task("Review crypto correlations");

        let result = resolve_duplicate_ids(vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(result.duplicate_count, 1);
        assert_eq!(result.tasks[0], a);
        assert_ne!(result.tasks[1].id, a.id);
        assert_eq!(result.tasks[1].title, b.title);
        assert_eq!(result.tasks[2], c);

        let event = &result.events[0];
        assert_eq!(event.action, Action::ResolveDuplicateId);
        assert!(event.targets(&result.tasks[1].id));
        assert_eq!(
            event.diff.note.as_deref(),
            Some(format!("duplicate-id resolved: {} -> {}", a.id, result.tasks[1].id).as_str())
        );
        assert_eq!(event.diff.changed_fields(), vec![crate::model::TaskField::Id]);
    }

    #[test]
    fn no_duplicates_no_events() {
        let result = resolve_duplicate_ids(vec![task("One task"), task("Two task")]);
        assert_eq!(result.duplicate_count, 0);
        assert!(result.events.is_empty());
    }

    #[test]
    fn import_is_additive_and_records_prior_tasks() {
        let mut state = AppState::default();
        let existing = task("Prepare Asia open briefing");
        state.create(existing.clone()).unwrap();

        let incoming = task("Validate volatility signals");
        let payload = json!({
            "tasks": [incoming],
            "audit": [],
            "ui": {"godMode": true}
        });

        let report = state.import_payload(&payload.to_string()).unwrap();
        assert_eq!(report.imported_tasks, 1);
        assert_eq!(report.duplicates_resolved, 0);
        assert_eq!(state.tasks, vec![incoming]);
        assert!(state.ui.god_mode);
        assert_eq!(state.audit.len(), 2);

        let marker = state.audit.last().unwrap();
        assert_eq!(marker.action, Action::Import);
        assert!(marker.is_system());
        assert_eq!(marker.prior_tasks.as_deref(), Some(&[existing][..]));
        assert_eq!(
            marker.diff.note.as_deref(),
            Some("Imported 1 tasks, duplicates resolved 0")
        );
    }

    #[test]
    fn rejected_payload_changes_nothing() {
        let mut state = AppState::default();
        state.create(task("Prepare Asia open briefing")).unwrap();
        let before = state.clone();

        let err = state
            .import_payload(r#"{"tasks":[{"id":"X"}],"audit":[],"ui":{"godMode":false}}"#)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidImport);
        assert!(err.issues.iter().any(|i| i.path == "tasks.0.id"));
        assert_eq!(state, before);
    }

    #[test]
    fn import_can_be_reversed_by_time_travel() {
        let mut state = AppState::default();
        let existing = task("Prepare Asia open briefing");
        state.create(existing.clone()).unwrap();
        let payload = json!({"tasks": [task("Incoming")], "audit": [], "ui": {"godMode": false}});
        state.import_payload(&payload.to_string()).unwrap();

        state.time_travel(0).unwrap();
        assert_eq!(state.tasks, vec![existing]);
    }
}
