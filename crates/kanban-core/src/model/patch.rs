//! Field-level partial task snapshots.
//!
//! A [`TaskPatch`] maps task fields to their JSON values. It is the payload of
//! both sides of an audit diff: a full snapshot for create/delete, or just the
//! changed fields for update/move.
//!
//! An explicit `null` records that an optional field was absent on that side,
//! so applying a patch can clear a field as well as set one.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::task::{Rubric, Task};

/// Every field of a [`Task`], in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskField {
    Id,
    Title,
    Description,
    Priority,
    Tags,
    EstimateMinutes,
    CreatedAt,
    DueAt,
    Status,
    ReviewerNotes,
    Rubric,
}

/// Error returned when parsing an unknown field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task field '{raw}'")]
pub struct UnknownTaskField {
    pub raw: String,
}

impl TaskField {
    pub const ALL: [Self; 11] = [
        Self::Id,
        Self::Title,
        Self::Description,
        Self::Priority,
        Self::Tags,
        Self::EstimateMinutes,
        Self::CreatedAt,
        Self::DueAt,
        Self::Status,
        Self::ReviewerNotes,
        Self::Rubric,
    ];

    /// JSON key used in persisted state and diffs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::Tags => "tags",
            Self::EstimateMinutes => "estimateMinutes",
            Self::CreatedAt => "createdAt",
            Self::DueAt => "dueAt",
            Self::Status => "status",
            Self::ReviewerNotes => "reviewerNotes",
            Self::Rubric => "rubric",
        }
    }

    /// Whether the field may be absent on a task.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(
            self,
            Self::Description | Self::DueAt | Self::ReviewerNotes | Self::Rubric
        )
    }

    /// Read this field from `task` as a JSON value (`null` when absent).
    #[must_use]
    pub fn read(self, task: &Task) -> Value {
        match self {
            Self::Id => Value::String(task.id.to_string()),
            Self::Title => Value::String(task.title.clone()),
            Self::Description => opt_string(task.description.as_deref()),
            Self::Priority => Value::String(task.priority.as_str().to_string()),
            Self::Tags => Value::Array(task.tags.iter().cloned().map(Value::String).collect()),
            Self::EstimateMinutes => Value::from(task.estimate_minutes),
            Self::CreatedAt => timestamp_value(task.created_at),
            Self::DueAt => task.due_at.map_or(Value::Null, timestamp_value),
            Self::Status => Value::String(task.status.as_str().to_string()),
            Self::ReviewerNotes => opt_string(task.reviewer_notes.as_deref()),
            Self::Rubric => task.rubric.as_ref().map_or(Value::Null, rubric_value),
        }
    }
}

// Same text form chrono's serde impl writes, so snapshots match persisted tasks.
fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn opt_string(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.to_string()))
}

fn rubric_value(rubric: &Rubric) -> Value {
    let mut map = Map::new();
    map.insert("score".into(), Value::from(rubric.score));
    if let Some(comment) = &rubric.comment {
        map.insert("comment".into(), Value::String(comment.clone()));
    }
    Value::Object(map)
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskField {
    type Err = UnknownTaskField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownTaskField { raw: s.to_string() })
    }
}

/// Errors materializing a patch into a concrete task.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The merged fields do not form a valid task.
    #[error("patch does not produce a valid task: {0}")]
    InvalidTask(#[from] serde_json::Error),
}

/// A partial task: a subset of fields with their JSON values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    fields: BTreeMap<TaskField, Value>,
}

impl TaskPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full snapshot of `task`. Absent optional fields are left out.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        let fields = TaskField::ALL
            .into_iter()
            .map(|field| (field, field.read(task)))
            .filter(|(_, value)| !value.is_null())
            .collect();
        Self { fields }
    }

    pub fn insert(&mut self, field: TaskField, value: Value) {
        self.fields.insert(field, value);
    }

    #[must_use]
    pub fn get(&self, field: TaskField) -> Option<&Value> {
        self.fields.get(&field)
    }

    #[must_use]
    pub fn contains(&self, field: TaskField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Fields present in this patch, in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = TaskField> + '_ {
        self.fields.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shallow-merge this patch onto `task`, returning the merged task.
    ///
    /// Fields not in the patch keep the task's value; `null` clears an
    /// optional field.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::InvalidTask`] if a value has the wrong shape for
    /// its field.
    pub fn apply_to(&self, task: &Task) -> Result<Task, PatchError> {
        let mut object = match serde_json::to_value(task)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.overlay(&mut object);
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Interpret this patch as a complete task snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::InvalidTask`] if required fields are missing or
    /// malformed.
    pub fn to_task(&self) -> Result<Task, PatchError> {
        let mut object = Map::new();
        self.overlay(&mut object);
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    fn overlay(&self, object: &mut Map<String, Value>) {
        for (field, value) in &self.fields {
            if value.is_null() {
                object.remove(field.as_str());
            } else {
                object.insert(field.as_str().to_string(), value.clone());
            }
        }
    }

    /// JSON object form, keyed by field name.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(field, value)| (field.as_str().to_string(), value.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(TaskField, Value)> for TaskPatch {
    fn from_iter<I: IntoIterator<Item = (TaskField, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// Custom serde: a plain JSON object keyed by camelCase field names.
impl Serialize for TaskPatch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaskPatch {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut fields = BTreeMap::new();
        for (key, value) in raw {
            match key.parse::<TaskField>() {
                Ok(field) => {
                    fields.insert(field, value);
                }
                Err(err) => tracing::debug!("dropping patch entry: {err}"),
            }
        }
        Ok(Self { fields })
    }
}
