//! Board facade: live state plus the store it is persisted to.
//!
//! Each successful transition is saved right away. A failed save never undoes
//! the mutation: it is logged, the in-memory state stays authoritative, and
//! the error is kept until [`Board::take_save_error`] collects it. Short-lived
//! callers must check it before reporting success.

use crate::event::AuditEvent;
use crate::import::{ImportError, ImportReport};
use crate::model::{Status, Task, TaskId};
use crate::mutate::{MutationError, Outcome};
use crate::replay::{TimeTravel, TimeTravelError};
use crate::seed::seeded_state;
use crate::state::AppState;
use crate::store::{StateStore, StoreError};

/// What to do when the store has never been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstRun {
    /// Start with the demo tasks.
    #[default]
    Seed,
    /// Start with an empty board.
    Empty,
}

impl FirstRun {
    #[must_use]
    pub const fn from_seed_flag(seed: bool) -> Self {
        if seed { Self::Seed } else { Self::Empty }
    }
}

#[derive(Debug)]
pub struct Board<S: StateStore> {
    state: AppState,
    store: S,
    save_error: Option<StoreError>,
}

impl<S: StateStore> Board<S> {
    /// Load the board from `store`, initializing it on first run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub fn open(store: S, first_run: FirstRun) -> Result<Self, StoreError> {
        if let Some(state) = store.load()? {
            tracing::debug!(
                tasks = state.tasks.len(),
                events = state.audit.len(),
                "board loaded"
            );
            return Ok(Self {
                state,
                store,
                save_error: None,
            });
        }

        let state = match first_run {
            FirstRun::Seed => seeded_state(),
            FirstRun::Empty => AppState::default(),
        };
        tracing::info!(?first_run, tasks = state.tasks.len(), "initialized new board");
        let mut board = Self {
            state,
            store,
            save_error: None,
        };
        board.persist();
        Ok(board)
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    #[must_use]
    pub fn audit(&self) -> &[AuditEvent] {
        &self.state.audit
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The most recent failed save since the last call, if any.
    pub const fn take_save_error(&mut self) -> Option<StoreError> {
        self.save_error.take()
    }

    #[must_use]
    pub fn into_state(self) -> AppState {
        self.state
    }

    /// See [`AppState::create`].
    ///
    /// # Errors
    ///
    /// Propagates [`MutationError`].
    pub fn create(&mut self, task: Task) -> Result<Outcome, MutationError> {
        let outcome = self.state.create(task)?;
        Ok(self.settle(outcome))
    }

    /// See [`AppState::update`].
    ///
    /// # Errors
    ///
    /// Propagates [`MutationError`].
    pub fn update(&mut self, task: Task) -> Result<Outcome, MutationError> {
        let outcome = self.state.update(task)?;
        Ok(self.settle(outcome))
    }

    pub fn delete(&mut self, id: &TaskId) -> Outcome {
        let outcome = self.state.delete(id);
        self.settle(outcome)
    }

    pub fn move_task(&mut self, id: &TaskId, status: Status) -> Outcome {
        let outcome = self.state.move_task(id, status);
        self.settle(outcome)
    }

    pub fn set_god_mode(&mut self, enabled: bool) {
        self.state.set_god_mode(enabled);
        self.persist();
    }

    /// See [`AppState::time_travel`].
    ///
    /// # Errors
    ///
    /// Propagates [`TimeTravelError`].
    pub fn time_travel(&mut self, index: usize) -> Result<TimeTravel, TimeTravelError> {
        let report = self.state.time_travel(index)?;
        self.persist();
        Ok(report)
    }

    /// See [`AppState::import_payload`].
    ///
    /// # Errors
    ///
    /// Propagates [`ImportError`].
    pub fn import_payload(&mut self, payload: &str) -> Result<ImportReport, ImportError> {
        let report = self.state.import_payload(payload)?;
        self.persist();
        Ok(report)
    }

    fn settle(&mut self, outcome: Outcome) -> Outcome {
        match &outcome {
            Outcome::Applied => self.persist(),
            Outcome::Unchanged(reason) => tracing::debug!(%reason, "mutation skipped"),
        }
        outcome
    }

    fn persist(&mut self) {
        match self.store.save(&self.state) {
            Ok(()) => self.save_error = None,
            Err(err) => {
                tracing::warn!(code = %err.code(), "failed to save board state: {err}");
                self.save_error = Some(err);
            }
        }
    }
}
