//! Board data model: tasks and the partial-task snapshots carried by diffs.
//!
//! # Invariants
//! - `Task::id` is unique across the live collection.
//! - `createdAt` is set once and never edited afterwards.

pub mod patch;
pub mod task;

pub use patch::{PatchError, TaskField, TaskPatch, UnknownTaskField};
pub use task::{
    InvalidTaskId, MAX_RUBRIC_SCORE, MIN_TITLE_CHARS, ParseEnumError, Priority, Rubric, Status,
    Task, TaskDraft, TaskId, TaskValidationError, parse_tag_list,
};
