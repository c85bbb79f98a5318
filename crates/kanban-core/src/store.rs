//! Persistence adapters for [`AppState`].
//!
//! The board core never touches storage directly; it is handed a
//! [`StateStore`]. Two implementations ship here:
//!
//! - [`JsonFileStore`]: one pretty-printed JSON file, schema-validated on
//!   load and replaced atomically (temp file + rename) on save, under an
//!   advisory lock.
//! - [`MemoryStore`]: in-process, for tests and embedding.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{ProjectConfig, kanban_dir};
use crate::error::ErrorCode;
use crate::lock::{LockError, LockMode, StateLock};
use crate::state::AppState;
use crate::validate::{ValidationIssue, parse_state};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("{} failed validation with {} issue(s)", .path.display(), .issues.len())]
    Corrupt {
        path: PathBuf,
        issues: Vec<ValidationIssue>,
    },

    #[error("cannot serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } | Self::Serialize(_) | Self::Unavailable(_) => {
                ErrorCode::StateWriteFailed
            }
            Self::Lock(err) => err.code(),
            Self::Corrupt { .. } => ErrorCode::CorruptState,
        }
    }
}

/// Where board state lives between runs.
pub trait StateStore {
    /// Load the last saved state.
    ///
    /// `Ok(None)` means nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read at all.
    fn load(&self) -> Result<Option<AppState>, StoreError>;

    /// Replace the saved state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state could not be persisted.
    fn save(&self, state: &AppState) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Default lock wait for file stores not built from config.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self {
            path,
            lock_path,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Store at `<root>/.kanban/<store.file>` per the project config.
    #[must_use]
    pub fn for_project(project_root: &Path, config: &ProjectConfig) -> Self {
        Self::new(kanban_dir(project_root).join(&config.store.file))
            .with_lock_timeout(config.store.lock_timeout())
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load without the fail-closed fallback.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the file does not validate, in
    /// addition to I/O and lock failures.
    pub fn load_strict(&self) -> Result<Option<AppState>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let _lock = StateLock::acquire(&self.lock_path, LockMode::Shared, self.lock_timeout)?;
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_state(&text)
            .map(Some)
            .map_err(|issues| StoreError::Corrupt {
                path: self.path.clone(),
                issues,
            })
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for JsonFileStore {
    /// A file that fails validation loads as an empty board.
    fn load(&self) -> Result<Option<AppState>, StoreError> {
        match self.load_strict() {
            Err(StoreError::Corrupt { path, issues }) => {
                tracing::warn!(
                    path = %path.display(),
                    issues = issues.len(),
                    "state file failed validation, starting from an empty board"
                );
                for issue in issues.iter().take(5) {
                    tracing::debug!("  {issue}");
                }
                Ok(Some(AppState::default()))
            }
            other => other,
        }
    }

    fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let parent = self
            .path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        fs::create_dir_all(&parent).map_err(|e| self.io_error(e))?;

        let _lock = StateLock::acquire(&self.lock_path, LockMode::Exclusive, self.lock_timeout)?;
        let json = state.export_json()?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!(
            path = %self.path.display(),
            tasks = state.tasks.len(),
            events = state.audit.len(),
            "state saved"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Single-threaded in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<Option<AppState>>,
    saves: Cell<usize>,
    fail_saves: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
            ..Self::default()
        }
    }

    /// A store whose every save fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<AppState> {
        self.state.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<AppState>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &AppState) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("memory store configured to fail".into()));
        }
        self.state.replace(Some(state.clone()));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
