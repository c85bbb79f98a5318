//! Reversal of single events and time travel over the audit log.
//!
//! | Event | Inverse |
//! |---|---|
//! | carries `priorTasks` | restore that collection verbatim |
//! | `CREATE` | remove the task |
//! | `DELETE` | re-append the `before` snapshot |
//! | `IMPORT` (legacy note) | restore `prevTasks` decoded from the note |
//! | `UPDATE` / `MOVE` / `RESOLVE_DUPLICATE_ID` | merge `before` onto the live task |
//!
//! Reversal never fails. A missing task, a malformed snapshot, or an
//! undecodable legacy payload reverts to an identity step and is logged.
//!
//! Time travel does not rewrite history. It folds [`reverse_event`] over
//! every event after the target (newest first) and appends one `UPDATE`
//! marker on `SYSTEM` that carries the pre-travel collection, so the jump
//! itself can be undone by travelling again.

use serde::Serialize;

use crate::error::ErrorCode;
use crate::event::{Action, AuditEvent, EventParams, create_event, decode_prior_tasks};
use crate::model::Task;
use crate::state::AppState;

/// Requested index does not exist in the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("audit index {index} is out of range (log has {len} events)")]
pub struct TimeTravelError {
    pub index: usize,
    pub len: usize,
}

impl TimeTravelError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::TimeTravelOutOfRange
    }
}

/// What a time-travel jump did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeTravel {
    /// Index of the event the board now reflects.
    pub target_index: usize,
    /// Number of events undone to get there.
    pub reverted_events: usize,
    /// Live task count after the jump.
    pub task_count: usize,
}

/// Apply the inverse of `event` to `tasks`.
#[must_use]
pub fn reverse_event(mut tasks: Vec<Task>, event: &AuditEvent) -> Vec<Task> {
    if let Some(prior) = &event.prior_tasks {
        tracing::debug!(action = %event.action, count = prior.len(), "restoring prior collection");
        return prior.clone();
    }

    match event.action {
        Action::Create => {
            tasks.retain(|task| !event.targets(&task.id));
            tasks
        }
        Action::Delete => {
            let restored = event.diff.before.as_ref().map(crate::model::TaskPatch::to_task);
            match restored {
                Some(Ok(task)) => tasks.push(task),
                Some(Err(err)) => {
                    tracing::warn!(task_id = %event.task_id, "cannot restore deleted task: {err}");
                }
                None => tracing::warn!(task_id = %event.task_id, "DELETE event has no snapshot"),
            }
            tasks
        }
        Action::Import => reverse_legacy_import(tasks, event),
        Action::Update | Action::Move | Action::ResolveDuplicateId => {
            let Some(before) = &event.diff.before else {
                return tasks;
            };
            let Some(slot) = tasks.iter_mut().find(|task| event.targets(&task.id)) else {
                return tasks;
            };
            match before.apply_to(slot) {
                Ok(reverted) => *slot = reverted,
                Err(err) => {
                    tracing::warn!(task_id = %event.task_id, "cannot revert {}: {err}", event.action);
                }
            }
            tasks
        }
    }
}

fn reverse_legacy_import(tasks: Vec<Task>, event: &AuditEvent) -> Vec<Task> {
    let Some(note) = event.diff.note.as_deref() else {
        return tasks;
    };
    match decode_prior_tasks(note) {
        Ok(Some(prior)) => prior,
        Ok(None) => tasks,
        Err(err) => {
            tracing::warn!("skipping IMPORT reversal: {err}");
            tasks
        }
    }
}

/// Reconstruct the collection as it was right after `audit[target]`,
/// starting from `tasks`.
///
/// Events after `target` are undone newest first.
#[must_use]
pub fn reconstruct(tasks: Vec<Task>, audit: &[AuditEvent], target: usize) -> Vec<Task> {
    let newer = audit.get(target.saturating_add(1)..).unwrap_or_default();
    newer.iter().rev().fold(tasks, reverse_event)
}

impl AppState {
    /// Rewind the live tasks to the point right after `audit[index]`.
    ///
    /// History is kept: one `UPDATE` marker on `SYSTEM` is appended, holding
    /// the pre-travel collection. UI flags are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTravelError`] if `index` is past the end of the log.
    pub fn time_travel(&mut self, index: usize) -> Result<TimeTravel, TimeTravelError> {
        let len = self.audit.len();
        let Some(target) = self.audit.get(index) else {
            return Err(TimeTravelError { index, len });
        };
        let note = format!("time travel to {}", target.timestamp.to_rfc3339());

        let before = self.tasks.clone();
        self.tasks = reconstruct(std::mem::take(&mut self.tasks), &self.audit, index);

        let marker = create_event(EventParams::system(Action::Update, note)).with_prior_tasks(before);
        self.append(marker);

        let report = TimeTravel {
            target_index: index,
            reverted_events: len - index - 1,
            task_count: self.tasks.len(),
        };
        tracing::info!(
            target_index = report.target_index,
            reverted = report.reverted_events,
            tasks = report.task_count,
            "time travel applied"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::create_event_at;
    use crate::model::{Status, TaskDraft, TaskId};
    use chrono::{TimeZone, Utc};

    fn task(title: &str) -> Task {
        TaskDraft::new(title).into_task(Utc.with_ymd_and_hms(2026, 2, 3, 8, 30, 0).unwrap())
    }

    #[test]
    fn reverse_create_removes_task() {
        let t = task("Adjust dynamic stop-loss");
        let event = create_event(EventParams::task(Action::Create, &t.id).after(&t));
        assert!(reverse_event(vec![t], &event).is_empty());
    }

    #[test]
    fn reverse_delete_reappends_snapshot() {
        let kept = task("Review crypto correlations");
        let gone = task("Update client exposure limits");
        let event = create_event(EventParams::task(Action::Delete, &gone.id).before(&gone));
        let tasks = reverse_event(vec![kept.clone()], &event);
        assert_eq!(tasks, vec![kept, gone]);
    }

    #[test]
    fn reverse_update_restores_changed_fields_only() {
        let original = task("Close energy position");
        let mut edited = original.clone();
        edited.status = Status::Done;
        edited.estimate_minutes = 15;
        let event = create_event(
            EventParams::task(Action::Update, &original.id)
                .before(&original)
                .after(&edited),
        );
        assert_eq!(reverse_event(vec![edited], &event), vec![original]);
    }

    #[test]
    fn reverse_update_of_missing_task_is_identity() {
        let original = task("Close energy position");
        let mut edited = original.clone();
        edited.status = Status::Done;
        let event = create_event(
            EventParams::task(Action::Move, &original.id)
                .before(&original)
                .after(&edited),
        );
        let other = task("Somebody else");
        assert_eq!(reverse_event(vec![other.clone()], &event), vec![other]);
    }

    #[test]
    fn reverse_duplicate_resolution_restores_old_id() {
        let original = task("Imported twice");
        let mut rekeyed = original.clone();
        rekeyed.id = TaskId::generate();
        let event = create_event(
            EventParams::task(Action::ResolveDuplicateId, &rekeyed.id)
                .before(&original)
                .after(&rekeyed),
        );
        assert_eq!(reverse_event(vec![rekeyed], &event), vec![original]);
    }

    #[test]
    fn reverse_prefers_prior_tasks_field() {
        let old = task("Prepare Asia open briefing");
        let event = create_event(EventParams::system(Action::Import, "Imported 0 tasks"))
            .with_prior_tasks(vec![old.clone()]);
        assert_eq!(reverse_event(vec![task("New")], &event), vec![old]);
    }

    #[test]
    fn reverse_legacy_import_note() {
        let old = task("Prepare Asia open briefing");
        let payload = serde_json::json!({ "prevTasks": [old] });
        let note = format!("Imported 1 tasks||{payload}");
        let event = create_event_at(
            EventParams::system(Action::Import, note),
            Utc.with_ymd_and_hms(2026, 2, 8, 0, 0, 0).unwrap(),
        );
        assert_eq!(reverse_event(vec![], &event), vec![old]);
    }

    #[test]
    fn reverse_malformed_legacy_import_is_identity() {
        let current = vec![task("Keep me around")];
        let event = create_event(EventParams::system(Action::Import, "Imported||{oops"));
        assert_eq!(reverse_event(current.clone(), &event), current);
        let bare = create_event(EventParams::system(Action::Import, "Imported"));
        assert_eq!(reverse_event(current.clone(), &bare), current);
    }

    #[test]
    fn time_travel_appends_marker_and_keeps_history() {
        let t = task("Rebalance LATAM book");
        let mut state = AppState::default();
        assert!(state.create(t.clone()).unwrap().is_applied());
        assert!(state.move_task(&t.id, Status::Doing).is_applied());
        assert!(state.move_task(&t.id, Status::Done).is_applied());
        state.set_god_mode(true);

        let report = state.time_travel(0).unwrap();
        assert_eq!(report.reverted_events, 2);
        assert_eq!(state.tasks, vec![t.clone()]);
        assert_eq!(state.audit.len(), 4);
        assert!(state.ui.god_mode);

        let marker = state.audit.last().unwrap();
        assert_eq!(marker.action, Action::Update);
        assert!(marker.is_system());
        assert!(marker.diff.note.as_deref().unwrap().starts_with("time travel to "));
        assert_eq!(marker.prior_tasks.as_ref().unwrap()[0].status, Status::Done);

        // Travelling to the event just before the marker undoes the jump.
        state.time_travel(2).unwrap();
        assert_eq!(state.tasks[0].status, Status::Done);
        assert_eq!(state.audit.len(), 5);
    }

    #[test]
    fn time_travel_to_last_index_keeps_tasks() {
        let t = task("Rebalance LATAM book");
        let mut state = AppState::default();
        state.create(t).unwrap();
        let before = state.tasks.clone();
        let report = state.time_travel(0).unwrap();
        assert_eq!(report.reverted_events, 0);
        assert_eq!(state.tasks, before);
        assert_eq!(state.audit.len(), 2);
    }

    #[test]
    fn time_travel_out_of_range() {
        let mut state = AppState::default();
        assert_eq!(
            state.time_travel(0),
            Err(TimeTravelError { index: 0, len: 0 })
        );
    }
}
