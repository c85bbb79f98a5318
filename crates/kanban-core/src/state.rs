//! The combined board snapshot: live tasks, the audit log, and UI flags.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::event::AuditEvent;
use crate::model::{Task, TaskId};

/// UI flags persisted with the board. Never audited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default)]
    pub god_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_moved_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_moved_at: Option<DateTime<Utc>>,
}

/// Everything the board persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Live collection. Order is insignificant; ids are unique.
    pub tasks: Vec<Task>,
    /// Full event log, oldest first. Append-only.
    pub audit: Vec<AuditEvent>,
    #[serde(default)]
    pub ui: UiState,
}

impl AppState {
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == *id)
    }

    #[must_use]
    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.task(id).is_some()
    }

    /// Pretty-printed JSON of the whole state.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization fails.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Default export file name for a given local date.
#[must_use]
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("kanban-audit-export-{}.json", date.format("%Y-%m-%d"))
}

/// Default export file name for today.
#[must_use]
pub fn default_export_file_name() -> String {
    export_file_name(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskDraft;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn default_state_is_empty() {
        let state = AppState::default();
        assert!(state.tasks.is_empty());
        assert!(state.audit.is_empty());
        assert!(!state.ui.god_mode);
    }

    #[test]
    fn ui_serializes_camel_case() {
        let ui = UiState {
            god_mode: true,
            last_moved_task_id: Some("x".into()),
            last_moved_at: None,
        };
        let json = serde_json::to_value(&ui).unwrap();
        assert_eq!(json["godMode"], true);
        assert_eq!(json["lastMovedTaskId"], "x");
        assert!(json.get("lastMovedAt").is_none());
    }

    #[test]
    fn export_roundtrips() {
        let mut state = AppState::default();
        state.tasks.push(
            TaskDraft::new("Review crypto/FX correlations")
                .into_task(Utc.with_ymd_and_hms(2026, 2, 1, 12, 15, 0).unwrap()),
        );
        let json = state.export_json().unwrap();
        assert!(json.contains("\n  \"tasks\""));
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert!(back.contains_task(&state.tasks[0].id));
    }

    #[test]
    fn export_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        assert_eq!(export_file_name(date), "kanban-audit-export-2026-02-09.json");
    }
}
