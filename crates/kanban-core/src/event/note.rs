//! Reader for the legacy IMPORT note encoding.
//!
//! Older logs embedded the pre-import task collection inside the note text:
//!
//! ```text
//! <free-text summary>||{"prevTasks":[...]}
//! ```
//!
//! New events carry the snapshot in [`AuditEvent::prior_tasks`] instead and
//! write only the summary. This module keeps old exports reversible.
//!
//! [`AuditEvent::prior_tasks`]: super::AuditEvent::prior_tasks

use serde::Deserialize;

use crate::model::Task;

/// Separator between the summary and the JSON payload.
pub const LEGACY_PAYLOAD_DELIMITER: &str = "||";

/// Errors decoding a legacy payload.
#[derive(Debug, thiserror::Error)]
pub enum LegacyNoteError {
    #[error("legacy import payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyPayload {
    #[serde(default)]
    prev_tasks: Option<Vec<Task>>,
}

/// Human summary part of a note, with any legacy payload stripped.
#[must_use]
pub fn note_summary(note: &str) -> &str {
    note.split_once(LEGACY_PAYLOAD_DELIMITER)
        .map_or(note, |(summary, _)| summary)
        .trim()
}

/// Decode the prior task collection from a legacy note.
///
/// Returns `Ok(None)` when the note has no payload section, the payload is
/// blank, or the payload has no `prevTasks` key.
///
/// # Errors
///
/// Returns [`LegacyNoteError::Json`] when a payload is present but cannot be
/// parsed.
pub fn decode_prior_tasks(note: &str) -> Result<Option<Vec<Task>>, LegacyNoteError> {
    let Some((_, payload)) = note.split_once(LEGACY_PAYLOAD_DELIMITER) else {
        return Ok(None);
    };
    if payload.trim().is_empty() {
        return Ok(None);
    }
    let parsed: LegacyPayload = serde_json::from_str(payload)?;
    Ok(parsed.prev_tasks)
}
