//! Demo tasks for a brand-new board.

use crate::event::{Action, EventParams, create_event};
use crate::model::Task;
use crate::state::AppState;

const SEED_TASKS_JSON: &str = r#"[
  {
    "id": "7f9b2e9c-7b5f-4f2c-9d5f-58c4a6f5c0a1",
    "title": "Rebalance LATAM portfolio vs. FX risk",
    "description": "Update portfolio weights for MXN and BRL volatility. Review internal limits.",
    "priority": "high",
    "tags": ["rebalance", "fx", "risk"],
    "estimateMinutes": 180,
    "createdAt": "2026-02-05T09:20:00.000Z",
    "dueAt": "2026-02-10T16:00:00.000Z",
    "status": "todo"
  },
  {
    "id": "f8a011a0-66b8-4b66-9c43-4c2ed29a3f4e",
    "title": "Validate intraday volatility signals",
    "description": "Compare local VIX model signals with the US desk alerts.",
    "priority": "medium",
    "tags": ["model", "volatility", "alerts"],
    "estimateMinutes": 90,
    "createdAt": "2026-02-06T13:15:00.000Z",
    "dueAt": "2026-02-11T14:00:00.000Z",
    "status": "doing"
  },
  {
    "id": "1e2bd0b4-0f05-41d4-8e2b-3a6d9ac3b1f8",
    "title": "Close tactical energy position",
    "description": "Unwind the position ahead of the inventory report to free margin.",
    "priority": "high",
    "tags": ["energy", "risk"],
    "estimateMinutes": 60,
    "createdAt": "2026-02-04T11:00:00.000Z",
    "dueAt": "2026-02-08T18:00:00.000Z",
    "status": "doing"
  },
  {
    "id": "8ab4aa2b-5c33-4c11-bf8b-7c9a4dc55b0a",
    "title": "Update per-client exposure limits",
    "description": "Review concentration in two institutional clients and adjust limits.",
    "priority": "low",
    "tags": ["compliance", "clients"],
    "estimateMinutes": 120,
    "createdAt": "2026-02-02T10:00:00.000Z",
    "dueAt": "2026-02-12T12:00:00.000Z",
    "status": "todo"
  },
  {
    "id": "c9a7a62b-4ff8-4f76-8f6c-7c2ff1b5b40f",
    "title": "Post-mortem of failed bond trade",
    "description": "Document root cause, impact, and the mitigation plan for the committee.",
    "priority": "medium",
    "tags": ["postmortem", "bonds"],
    "estimateMinutes": 150,
    "createdAt": "2026-01-31T09:40:00.000Z",
    "dueAt": "2026-02-13T15:00:00.000Z",
    "status": "todo"
  },
  {
    "id": "bb3d7640-0d4a-4d2f-83d3-5e0a34de71e1",
    "title": "Tune dynamic stop-loss on tech book",
    "description": "Recompute stops using the new weekly volatility band.",
    "priority": "high",
    "tags": ["tech", "stops", "volatility"],
    "estimateMinutes": 75,
    "createdAt": "2026-02-03T08:30:00.000Z",
    "dueAt": "2026-02-09T20:00:00.000Z",
    "status": "done"
  },
  {
    "id": "d1fb1d2a-b3a2-4d63-9e2a-6b28f6d0b2b7",
    "title": "Prepare Asia open briefing",
    "description": "Macro, FX and earnings summary for the handoff.",
    "priority": "low",
    "tags": ["briefing", "macro"],
    "estimateMinutes": 45,
    "createdAt": "2026-02-07T06:30:00.000Z",
    "dueAt": "2026-02-10T05:30:00.000Z",
    "status": "done"
  },
  {
    "id": "4a2f7b3b-0d68-43b5-8f76-9b1fbc5a6f88",
    "title": "Review crypto/FX correlations",
    "description": "Refresh the dashboard and write a note for the risk team.",
    "priority": "medium",
    "tags": ["crypto", "fx", "dashboard"],
    "estimateMinutes": 110,
    "createdAt": "2026-02-01T12:15:00.000Z",
    "dueAt": "2026-02-14T17:00:00.000Z",
    "status": "todo"
  }
]"#;

/// The demo task set.
#[must_use]
pub fn seed_tasks() -> Vec<Task> {
    serde_json::from_str(SEED_TASKS_JSON).unwrap_or_else(|err| {
        tracing::error!("seed tasks failed to parse: {err}");
        Vec::new()
    })
}

/// A fresh board holding the demo tasks and one `IMPORT` event for them.
///
/// The event's prior collection is empty, so travelling back past it
/// yields an empty board.
#[must_use]
pub fn seeded_state() -> AppState {
    let tasks = seed_tasks();
    let note = format!("Seed board ({} tasks)", tasks.len());
    let event = create_event(EventParams::system(Action::Import, note)).with_prior_tasks(Vec::new());
    AppState {
        tasks,
        audit: vec![event],
        ui: crate::state::UiState::default(),
    }
}
