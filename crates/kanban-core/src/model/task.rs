use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Task urgency, rendered as three board priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Sort rank used by query results: high first, low last.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// The three board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    Doing,
    Done,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Todo, Self::Doing, Self::Done];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// Stable task identity. Always a hyphenated UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

/// Error returned when a string is not a valid task id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task id '{raw}': expected a UUID")]
pub struct InvalidTaskId {
    pub raw: String,
}

impl TaskId {
    /// Parse and normalize a UUID task id.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTaskId`] when `raw` is not a UUID.
    pub fn parse(raw: &str) -> Result<Self, InvalidTaskId> {
        Uuid::parse_str(raw.trim())
            .map(|uuid| Self(uuid.hyphenated().to_string()))
            .map_err(|_| InvalidTaskId {
                raw: raw.to_string(),
            })
    }

    /// Generate a fresh random (v4) id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = InvalidTaskId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskId> for String {
    fn from(value: TaskId) -> Self {
        value.0
    }
}

impl FromStr for TaskId {
    type Err = InvalidTaskId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Reviewer score attached in god mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    /// 0 through 10 inclusive.
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Highest allowed rubric score.
pub const MAX_RUBRIC_SCORE: u8 = 10;

/// Minimum title length, counted in characters after trimming.
pub const MIN_TITLE_CHARS: usize = 3;

/// One card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub estimate_minutes: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<Rubric>,
}

/// Reasons a task is rejected at the mutation boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskValidationError {
    #[error("title must be at least 3 characters, got {0}")]
    TitleTooShort(usize),

    #[error("due date {due} is earlier than creation date {created}")]
    DueBeforeCreated {
        due: DateTime<Utc>,
        created: DateTime<Utc>,
    },

    #[error("rubric score {0} is outside 0..=10")]
    RubricScoreOutOfRange(u8),
}

impl Task {
    /// Check the invariants enforced whenever a task enters the board
    /// through `create` or `update`.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        let title_chars = self.title.trim().chars().count();
        if title_chars < MIN_TITLE_CHARS {
            return Err(TaskValidationError::TitleTooShort(title_chars));
        }

        if let Some(due) = self.due_at.filter(|due| *due < self.created_at) {
            return Err(TaskValidationError::DueBeforeCreated {
                due,
                created: self.created_at,
            });
        }

        if let Some(rubric) = self.rubric.as_ref().filter(|r| r.score > MAX_RUBRIC_SCORE) {
            return Err(TaskValidationError::RubricScoreOutOfRange(rubric.score));
        }

        Ok(())
    }

    /// Lowercased `title + description`, the haystack for free-text search.
    #[must_use]
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.title,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// User-supplied fields for a new task. Identity and creation time are
/// assigned by [`TaskDraft::into_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub estimate_minutes: u32,
    pub due_at: Option<DateTime<Utc>>,
    pub status: Status,
    pub reviewer_notes: Option<String>,
    pub rubric: Option<Rubric>,
}

impl TaskDraft {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            tags: Vec::new(),
            estimate_minutes: 0,
            due_at: None,
            status: Status::Todo,
            reviewer_notes: None,
            rubric: None,
        }
    }

    /// Materialize the draft with a fresh id, created at `now`.
    #[must_use]
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::generate(),
            title: self.title.trim().to_string(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            priority: self.priority,
            tags: self.tags,
            estimate_minutes: self.estimate_minutes,
            created_at: now,
            due_at: self.due_at,
            status: self.status,
            reviewer_notes: self.reviewer_notes.filter(|n| !n.trim().is_empty()),
            rubric: self.rubric,
        }
    }
}

/// Split a comma-separated tag list, trimming entries and dropping empties.
///
/// Order and duplicates are preserved.
#[must_use]
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}
