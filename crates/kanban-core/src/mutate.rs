//! The four task mutations plus the (unaudited) god-mode toggle.
//!
//! Every mutation is all-or-nothing: on success the task collection changes
//! and exactly one event is appended; otherwise `self` is left untouched.
//!
//! | Operation | Event | Soft no-op when |
//! |---|---|---|
//! | `create` | `CREATE`, full `after` | never |
//! | `update` | `UPDATE`, changed fields | id missing, or nothing differs |
//! | `delete` | `DELETE`, full `before` | id missing |
//! | `move_task` | `MOVE`, `status` only | id missing, or already in that column |
//!
//! Soft no-ops are reported as [`Outcome::Unchanged`], never as errors. Input
//! that breaks a task invariant is a hard [`MutationError`].

use std::fmt;

use crate::error::ErrorCode;
use crate::event::{Action, AuditEvent, EventParams, create_event};
use crate::model::{Status, Task, TaskId, TaskValidationError};
use crate::state::AppState;

/// Result of a mutation that did not fail.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed and one event was appended.
    Applied,
    /// Nothing to do; state and log are unchanged.
    Unchanged(NoChange),
}

impl Outcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Why a mutation resolved to a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoChange {
    TaskNotFound(TaskId),
    AlreadyInStatus(Status),
    NothingChanged,
}

impl NoChange {
    /// Error code to surface when a caller chooses to report this no-op.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::TaskNotFound(_) => Some(ErrorCode::TaskNotFound),
            Self::AlreadyInStatus(_) | Self::NothingChanged => None,
        }
    }
}

impl fmt::Display for NoChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "no task with id {id}"),
            Self::AlreadyInStatus(status) => write!(f, "task is already in {status}"),
            Self::NothingChanged => f.write_str("no fields changed"),
        }
    }
}

/// Hard failures at the mutation boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("invalid task: {0}")]
    Invalid(#[from] TaskValidationError),

    #[error("a task with id {0} already exists")]
    DuplicateId(TaskId),

    #[error("createdAt of task {0} cannot be changed")]
    CreatedAtChanged(TaskId),
}

impl MutationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Invalid(_) => ErrorCode::InvalidTask,
            Self::DuplicateId(_) => ErrorCode::DuplicateTaskId,
            Self::CreatedAtChanged(_) => ErrorCode::ImmutableField,
        }
    }
}

impl AppState {
    /// Add a new task.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Invalid`] if the task breaks a validation rule
    /// and [`MutationError::DuplicateId`] if its id is already live.
    pub fn create(&mut self, task: Task) -> Result<Outcome, MutationError> {
        task.validate()?;
        if self.contains_task(&task.id) {
            return Err(MutationError::DuplicateId(task.id));
        }
        let event = create_event(EventParams::task(Action::Create, &task.id).after(&task));
        self.tasks.push(task);
        self.append(event);
        Ok(Outcome::Applied)
    }

    /// Replace the live task with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Invalid`] if the new snapshot breaks a
    /// validation rule and [`MutationError::CreatedAtChanged`] if it rewrites
    /// the creation time.
    pub fn update(&mut self, task: Task) -> Result<Outcome, MutationError> {
        task.validate()?;
        let Some(index) = self.position(&task.id) else {
            return Ok(Outcome::Unchanged(NoChange::TaskNotFound(task.id)));
        };
        let current = &self.tasks[index];
        if current.created_at != task.created_at {
            return Err(MutationError::CreatedAtChanged(task.id));
        }
        let event = create_event(
            EventParams::task(Action::Update, &task.id)
                .before(current)
                .after(&task),
        );
        if event.diff.is_empty() {
            return Ok(Outcome::Unchanged(NoChange::NothingChanged));
        }
        self.tasks[index] = task;
        self.append(event);
        Ok(Outcome::Applied)
    }

    /// Remove a task.
    pub fn delete(&mut self, id: &TaskId) -> Outcome {
        let Some(index) = self.position(id) else {
            return Outcome::Unchanged(NoChange::TaskNotFound(id.clone()));
        };
        let removed = self.tasks.remove(index);
        let event = create_event(EventParams::task(Action::Delete, id).before(&removed));
        self.append(event);
        Outcome::Applied
    }

    /// Move a task to another column.
    ///
    /// Also records the task and time in [`UiState`](crate::state::UiState)
    /// so a front end can highlight the last move.
    pub fn move_task(&mut self, id: &TaskId, status: Status) -> Outcome {
        let Some(index) = self.position(id) else {
            return Outcome::Unchanged(NoChange::TaskNotFound(id.clone()));
        };
        let current = &self.tasks[index];
        if current.status == status {
            return Outcome::Unchanged(NoChange::AlreadyInStatus(status));
        }
        let mut moved = current.clone();
        moved.status = status;
        let event = create_event(
            EventParams::task(Action::Move, id)
                .before(current)
                .after(&moved),
        );
        self.ui.last_moved_task_id = Some(id.to_string());
        self.ui.last_moved_at = Some(event.timestamp);
        self.tasks[index] = moved;
        self.append(event);
        Outcome::Applied
    }

    /// Flip the reviewer-field feature flag. Not audited.
    pub fn set_god_mode(&mut self, enabled: bool) {
        if self.ui.god_mode != enabled {
            tracing::debug!(enabled, "god mode toggled");
        }
        self.ui.god_mode = enabled;
    }

    pub(crate) fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == *id)
    }

    pub(crate) fn append(&mut self, event: AuditEvent) {
        tracing::debug!(
            action = %event.action,
            task_id = %event.task_id,
            fields = %crate::event::summarize_diff(&event.diff),
            "event appended"
        );
        self.audit.push(event);
    }
}
