//! Audit event model for the board's append-only log.
//!
//! Every successful mutation produces exactly one [`AuditEvent`]. Events are
//! created once, appended, and never edited or removed; corrections (time
//! travel) are recorded as new events.
//!
//! # JSON form
//!
//! ```text
//! {
//!   "timestamp": "2026-02-05T09:20:00Z",
//!   "action": "MOVE",
//!   "taskId": "7f9b2e9c-...",
//!   "actorLabel": "board-user",
//!   "diff": {"before": {"status": "todo"}, "after": {"status": "doing"}},
//!   "priorTasks": [...]          // IMPORT and time-travel markers only
//! }
//! ```

pub mod diff;
pub mod inspect;
pub mod note;
pub mod types;

pub use diff::{Diff, compute_diff};
pub use inspect::{AuditFilter, AuditSummary, recently_changed_fields, summarize_diff};
pub use note::{LEGACY_PAYLOAD_DELIMITER, LegacyNoteError, decode_prior_tasks, note_summary};
pub use types::{Action, UnknownAction};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskId};

/// Task id used by log-level events that affect no single task.
pub const SYSTEM_TASK_ID: &str = "SYSTEM";

/// Actor recorded on every event. The board has no multi-user identity.
pub const ACTOR_LABEL: &str = "board-user";

/// One immutable entry in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Creation time. Non-decreasing in log order under normal operation.
    pub timestamp: DateTime<Utc>,

    pub action: Action,

    /// The affected task's id, or [`SYSTEM_TASK_ID`].
    pub task_id: String,

    pub actor_label: String,

    pub diff: Diff,

    /// Task collection as it was just before this event, for events that
    /// replace the whole collection. Reversal restores it verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_tasks: Option<Vec<Task>>,
}

/// Inputs for [`create_event`].
#[derive(Debug, Clone)]
pub struct EventParams<'a> {
    pub action: Action,
    pub task_id: String,
    pub before: Option<&'a Task>,
    pub after: Option<&'a Task>,
    pub note: Option<String>,
}

impl<'a> EventParams<'a> {
    /// Params for an event about one task.
    #[must_use]
    pub fn task(action: Action, id: &TaskId) -> Self {
        Self {
            action,
            task_id: id.to_string(),
            before: None,
            after: None,
            note: None,
        }
    }

    /// Params for a note-only log-level event.
    #[must_use]
    pub fn system(action: Action, note: impl Into<String>) -> Self {
        Self {
            action,
            task_id: SYSTEM_TASK_ID.to_string(),
            before: None,
            after: None,
            note: Some(note.into()),
        }
    }

    #[must_use]
    pub const fn before(mut self, task: &'a Task) -> Self {
        self.before = Some(task);
        self
    }

    #[must_use]
    pub const fn after(mut self, task: &'a Task) -> Self {
        self.after = Some(task);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Build an event stamped with the current time.
#[must_use]
pub fn create_event(params: EventParams<'_>) -> AuditEvent {
    create_event_at(params, Utc::now())
}

/// Build an event stamped with `now`.
#[must_use]
pub fn create_event_at(params: EventParams<'_>, now: DateTime<Utc>) -> AuditEvent {
    let mut diff = compute_diff(params.before, params.after);
    diff.note = params.note.filter(|note| !note.is_empty());
    AuditEvent {
        timestamp: now,
        action: params.action,
        task_id: params.task_id,
        actor_label: ACTOR_LABEL.to_string(),
        diff,
        prior_tasks: None,
    }
}

impl AuditEvent {
    /// Attach the collection this event replaces.
    #[must_use]
    pub fn with_prior_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.prior_tasks = Some(tasks);
        self
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.task_id == SYSTEM_TASK_ID
    }

    /// Whether this event concerns the task `id`.
    #[must_use]
    pub fn targets(&self, id: &TaskId) -> bool {
        id == self.task_id.as_str()
    }
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.timestamp.to_rfc3339(),
            self.action,
            self.task_id,
            summarize_diff(&self.diff)
        )
    }
}
