pub mod completions;
pub mod create;
pub mod delete;
pub mod export;
pub mod god_mode;
pub mod import;
pub mod init;
pub mod list;
pub mod log;
pub mod move_cmd;
pub mod show;
pub mod summary;
pub mod travel;
pub mod update;

use crate::output::{CliError, OutputMode, fail};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kanban_core::config::{EffectiveConfig, kanban_dir};
use kanban_core::error::ErrorCode;
use kanban_core::model::{Task, TaskId};
use kanban_core::mutate::Outcome;
use kanban_core::store::JsonFileStore;
use kanban_core::{AppState, Board, FirstRun};
use serde::Serialize;
use std::path::Path;

/// Open the board under `project_root`, failing if `kb init` never ran.
pub fn open_board(
    project_root: &Path,
    config: &EffectiveConfig,
    output: OutputMode,
) -> anyhow::Result<Board<JsonFileStore>> {
    let dir = kanban_dir(project_root);
    if !dir.is_dir() {
        return Err(fail(
            output,
            CliError::from_code(
                ErrorCode::NotInitialized,
                format!("no board found at {}", dir.display()),
            ),
        ));
    }
    let store = JsonFileStore::for_project(project_root, &config.project);
    let first_run = FirstRun::from_seed_flag(config.project.board.seed_on_first_run);
    Board::open(store, first_run).map_err(|err| {
        fail(
            output,
            CliError::from_code(err.code(), format!("cannot open board: {err}")),
        )
    })
}

/// Resolve a full id or a unique id prefix to a live task id.
pub fn resolve_task_id(state: &AppState, raw: &str, output: OutputMode) -> anyhow::Result<TaskId> {
    let needle = raw.trim().to_ascii_lowercase();
    if let Ok(id) = TaskId::parse(&needle) {
        if state.contains_task(&id) {
            return Ok(id);
        }
    }

    let matches: Vec<&Task> = state
        .tasks
        .iter()
        .filter(|task| !needle.is_empty() && task.id.as_str().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(fail(
            output,
            CliError::from_code(ErrorCode::TaskNotFound, format!("no task matches '{raw}'")),
        )),
        many => Err(fail(
            output,
            CliError::new(format!(
                "'{raw}' is ambiguous: matches {} tasks",
                many.len()
            ))
            .with_details(many.iter().map(|task| format!("{} {}", task.id, task.title))),
        )),
    }
}

/// Parse a due date: RFC 3339, or `YYYY-MM-DD` meaning the end of that day
/// in UTC.
pub fn parse_due(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("'{raw}' is neither RFC 3339 nor YYYY-MM-DD"))?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    Ok(date.and_time(end_of_day).and_utc())
}

/// JSON shape shared by the single-task mutations.
#[derive(Debug, Serialize)]
pub struct MutationReport {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    pub audit_len: usize,
}

/// Fail if the last transition could not be written to disk.
pub fn ensure_saved(board: &mut Board<JsonFileStore>, output: OutputMode) -> anyhow::Result<()> {
    match board.take_save_error() {
        None => Ok(()),
        Some(err) => Err(fail(
            output,
            CliError::from_code(err.code(), format!("change was not saved: {err}")),
        )),
    }
}

/// Turn a mutation outcome into a report, failing on a missing task or a
/// failed save.
pub fn report_outcome(
    outcome: Outcome,
    id: &TaskId,
    board: &mut Board<JsonFileStore>,
    output: OutputMode,
) -> anyhow::Result<MutationReport> {
    if let Outcome::Unchanged(reason) = &outcome {
        if let Some(code) = reason.code() {
            return Err(fail(output, CliError::from_code(code, reason.to_string())));
        }
    }
    ensure_saved(board, output)?;
    Ok(MutationReport {
        applied: outcome.is_applied(),
        reason: match outcome {
            Outcome::Applied => None,
            Outcome::Unchanged(reason) => Some(reason.to_string()),
        },
        task_id: id.to_string(),
        task: board.state().task(id).cloned(),
        audit_len: board.audit().len(),
    })
}

/// One-line human summary of a mutation report.
pub fn describe(verb: &str, report: &MutationReport) -> String {
    if report.applied {
        format!("✓ {verb} {}", report.task_id)
    } else {
        format!(
            "· no change to {}: {}",
            report.task_id,
            report.reason.as_deref().unwrap_or("no change")
        )
    }
}

/// First eight characters of an id, enough to be unique on most boards.
pub fn short_id(id: &TaskId) -> &str {
    id.as_str().get(..8).unwrap_or_else(|| id.as_str())
}
