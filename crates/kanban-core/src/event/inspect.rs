//! Read-only views over the audit log: one-line diff summaries, filtering,
//! aggregate summaries, and per-task "recently changed" field sets.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::note::note_summary;
use super::types::Action;
use super::{AuditEvent, Diff};
use crate::model::TaskField;

/// How many events [`AuditSummary`] lists.
pub const SUMMARY_RECENT_EVENTS: usize = 10;

/// Comma-joined names of the fields a diff touched.
///
/// A note-only diff summarizes as its note, minus any legacy payload.
#[must_use]
pub fn summarize_diff(diff: &Diff) -> String {
    let fields = diff.changed_fields();
    if fields.is_empty() {
        return diff.note.as_deref().map(note_summary).unwrap_or_default().to_string();
    }
    fields
        .into_iter()
        .map(TaskField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Criteria for narrowing the audit log. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub action: Option<Action>,
    /// Substring of the event's task id.
    pub task_id_contains: Option<String>,
    /// Case-insensitive text matched against the note and both diff sides.
    pub search: Option<String>,
}

impl AuditFilter {
    #[must_use]
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if self.action.is_some_and(|action| action != event.action) {
            return false;
        }
        let task_matches = self
            .task_id_contains
            .as_deref()
            .filter(|fragment| !fragment.is_empty())
            .is_none_or(|fragment| event.task_id.contains(fragment));
        if !task_matches {
            return false;
        }
        if let Some(needle) = self.search.as_deref().filter(|s| !s.is_empty()) {
            return search_haystack(&event.diff).contains(&needle.to_lowercase());
        }
        true
    }

    /// Events matching this filter, with their log indices.
    pub fn apply<'a>(
        &'a self,
        audit: &'a [AuditEvent],
    ) -> impl Iterator<Item = (usize, &'a AuditEvent)> + 'a {
        audit
            .iter()
            .enumerate()
            .filter(move |(_, event)| self.matches(event))
    }
}

fn search_haystack(diff: &Diff) -> String {
    let side = |patch: Option<&crate::model::TaskPatch>| {
        patch.map_or_else(|| "{}".to_string(), |p| p.to_json().to_string())
    };
    format!(
        "{} {} {}",
        diff.note.as_deref().unwrap_or_default(),
        side(diff.before.as_ref()),
        side(diff.after.as_ref())
    )
    .to_lowercase()
}

/// Aggregate view of a run of audit events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub counts: BTreeMap<Action, usize>,
    /// The most recent events, newest first.
    pub recent: Vec<AuditEvent>,
    /// Number of distinct task ids (including `SYSTEM`) touched.
    pub distinct_tasks: usize,
}

impl AuditSummary {
    #[must_use]
    pub fn from_events(events: &[AuditEvent]) -> Self {
        let mut counts = BTreeMap::new();
        for event in events {
            *counts.entry(event.action).or_insert(0) += 1;
        }
        let recent = events
            .iter()
            .rev()
            .take(SUMMARY_RECENT_EVENTS)
            .cloned()
            .collect();
        let distinct_tasks = events
            .iter()
            .map(|event| event.task_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        Self {
            counts,
            recent,
            distinct_tasks,
        }
    }
}

impl fmt::Display for AuditSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Audit summary")?;
        writeln!(f, "-------------")?;
        for (action, count) in &self.counts {
            writeln!(f, "{action}: {count}")?;
        }
        writeln!(f)?;
        writeln!(f, "Last {SUMMARY_RECENT_EVENTS} events:")?;
        for event in &self.recent {
            writeln!(
                f,
                "{} | {} | {} | {}",
                event.timestamp.to_rfc3339(),
                event.action,
                event.task_id,
                event.diff.note.as_deref().map(note_summary).unwrap_or_default()
            )?;
        }
        writeln!(f)?;
        write!(f, "Tasks affected: {}", self.distinct_tasks)
    }
}

/// For each task, the fields changed by its most recent non-system UPDATE.
#[must_use]
pub fn recently_changed_fields(audit: &[AuditEvent]) -> BTreeMap<String, Vec<TaskField>> {
    let mut map = BTreeMap::new();
    for event in audit.iter().rev() {
        if event.action != Action::Update || event.is_system() {
            continue;
        }
        map.entry(event.task_id.clone())
            .or_insert_with(|| event.diff.changed_fields());
    }
    map
}
