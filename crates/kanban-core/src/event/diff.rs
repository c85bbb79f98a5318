//! Field-level before/after deltas between two task snapshots.
//!
//! | before | after | result |
//! |---|---|---|
//! | absent | absent | empty diff |
//! | absent | present | `{after: full snapshot}` |
//! | present | absent | `{before: full snapshot}` |
//! | present | present | changed fields only, on both sides |
//!
//! Equality is structural over each field's JSON value, and fields are
//! visited in [`TaskField::ALL`] order, so the result is deterministic.

use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskField, TaskPatch};

/// The payload of one audit event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<TaskPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<TaskPatch>,
    /// Free-text annotation. Never a substitute for before/after capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Diff {
    /// Union of field names captured on either side, in canonical order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<TaskField> {
        let mut fields: Vec<TaskField> = self
            .before
            .iter()
            .chain(self.after.iter())
            .flat_map(TaskPatch::fields)
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    /// True when neither side captured anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.as_ref().is_none_or(TaskPatch::is_empty)
            && self.after.as_ref().is_none_or(TaskPatch::is_empty)
    }
}

/// Compute the delta from `before` to `after`.
///
/// When both snapshots exist the result always carries both sides, possibly
/// empty if nothing changed. Callers decide whether an empty delta is worth
/// logging.
#[must_use]
pub fn compute_diff(before: Option<&Task>, after: Option<&Task>) -> Diff {
    match (before, after) {
        (None, None) => Diff::default(),
        (None, Some(after)) => Diff {
            after: Some(TaskPatch::from_task(after)),
            ..Diff::default()
        },
        (Some(before), None) => Diff {
            before: Some(TaskPatch::from_task(before)),
            ..Diff::default()
        },
        (Some(before), Some(after)) => {
            let mut old = TaskPatch::new();
            let mut new = TaskPatch::new();
            for field in TaskField::ALL {
                let prev = field.read(before);
                let next = field.read(after);
                if prev != next {
                    old.insert(field, prev);
                    new.insert(field, next);
                }
            }
            Diff {
                before: Some(old),
                after: Some(new),
                note: None,
            }
        }
    }
}
