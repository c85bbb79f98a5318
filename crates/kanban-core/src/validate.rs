//! Schema validation for persisted and imported board state.
//!
//! Validation walks the raw JSON tree and collects every problem it finds,
//! each tagged with a dotted path (`tasks.0.title`, `audit.3.diff.before.status`)
//! so a user can locate it in the payload. Unknown keys are ignored.
//!
//! Two levels of checks run:
//!
//! 1. **Shape**: objects, arrays, strings, integers where expected; required
//!    keys present.
//! 2. **Values**: enum membership, UUID ids, RFC 3339 timestamps, title
//!    length, rubric score range.
//!
//! Fractional `estimateMinutes` values are rounded to whole minutes before
//! validation, wherever a task or patch appears in the document.
//!
//! Ordering rules between fields (due date after creation) are deliberately
//! not checked here; they are enforced when a task is created or edited.

use chrono::DateTime;
use serde_json::{Map, Value};
use std::fmt;

use crate::event::Action;
use crate::model::{MAX_RUBRIC_SCORE, MIN_TITLE_CHARS, Priority, Status, TaskField, TaskId};
use crate::state::AppState;

/// One problem found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending value; empty for the document root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Check a JSON document against the board state schema.
#[must_use]
pub fn validate_state(value: &Value) -> Vec<ValidationIssue> {
    let mut walker = Walker::default();
    walker.state(value);
    walker.issues
}

/// Parse and validate a JSON document into an [`AppState`].
///
/// # Errors
///
/// Returns every issue found. Malformed JSON yields a single root-level
/// issue.
pub fn parse_state(text: &str) -> Result<AppState, Vec<ValidationIssue>> {
    let mut value: Value = serde_json::from_str(text).map_err(|err| {
        vec![ValidationIssue {
            path: String::new(),
            message: format!("invalid JSON: {err}"),
        }]
    })?;
    round_estimates(&mut value);
    let issues = validate_state(&value);
    if !issues.is_empty() {
        return Err(issues);
    }
    serde_json::from_value(value).map_err(|err| {
        vec![ValidationIssue {
            path: String::new(),
            message: err.to_string(),
        }]
    })
}

/// Replace every fractional, in-range `estimateMinutes` with its rounded
/// whole-minute value. Anything else is left for validation to judge.
fn round_estimates(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == TaskField::EstimateMinutes.as_str() {
                    if let Some(minutes) = rounded_minutes(child) {
                        *child = Value::from(minutes);
                    }
                } else {
                    round_estimates(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(round_estimates),
        _ => {}
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_minutes(value: &Value) -> Option<u32> {
    if value.is_u64() {
        return None;
    }
    let minutes = value.as_f64()?.round();
    (0.0..=f64::from(u32::MAX)).contains(&minutes).then(|| minutes as u32)
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Default)]
struct Walker {
    path: Vec<String>,
    issues: Vec<ValidationIssue>,
}

impl Walker {
    fn at(&mut self, segment: impl ToString, check: impl FnOnce(&mut Self)) {
        self.path.push(segment.to_string());
        check(self);
        self.path.pop();
    }

    fn issue(&mut self, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: self.path.join("."),
            message: message.into(),
        });
    }

    fn mismatch(&mut self, expected: &str, got: &Value) {
        self.issue(format!("expected {expected}, got {}", kind(got)));
    }

    fn object<'v>(&mut self, value: &'v Value) -> Option<&'v Map<String, Value>> {
        let map = value.as_object();
        if map.is_none() {
            self.mismatch("an object", value);
        }
        map
    }

    fn array<'v>(&mut self, value: &'v Value) -> Option<&'v Vec<Value>> {
        let items = value.as_array();
        if items.is_none() {
            self.mismatch("an array", value);
        }
        items
    }

    fn string<'v>(&mut self, value: &'v Value) -> Option<&'v str> {
        let text = value.as_str();
        if text.is_none() {
            self.mismatch("a string", value);
        }
        text
    }

    /// Present and non-null, or record `required`.
    fn required<'v>(&mut self, map: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
        let value = map.get(key).filter(|v| !v.is_null());
        if value.is_none() {
            self.at(key, |w| w.issue("required"));
        }
        value
    }

    fn each(&mut self, items: &[Value], check: impl Fn(&mut Self, &Value)) {
        for (index, item) in items.iter().enumerate() {
            self.at(index, |w| check(w, item));
        }
    }

    fn timestamp(&mut self, value: &Value) {
        if let Some(text) = self.string(value) {
            if DateTime::parse_from_rfc3339(text).is_err() {
                self.issue(format!("'{text}' is not an RFC 3339 timestamp"));
            }
        }
    }

    fn one_of(&mut self, value: &Value, allowed: &[&str]) {
        if let Some(text) = self.string(value) {
            if !allowed.contains(&text) {
                self.issue(format!("expected one of {}, got '{text}'", allowed.join(", ")));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Document
    // -----------------------------------------------------------------------

    fn state(&mut self, value: &Value) {
        let Some(root) = self.object(value) else {
            return;
        };
        if let Some(tasks) = self.required(root, "tasks") {
            self.at("tasks", |w| {
                if let Some(items) = w.array(tasks) {
                    w.each(items, Self::task);
                }
            });
        }
        if let Some(audit) = self.required(root, "audit") {
            self.at("audit", |w| {
                if let Some(items) = w.array(audit) {
                    w.each(items, Self::event);
                }
            });
        }
        if let Some(ui) = self.required(root, "ui") {
            self.at("ui", |w| w.ui(ui));
        }
    }

    fn ui(&mut self, value: &Value) {
        let Some(map) = self.object(value) else {
            return;
        };
        if let Some(flag) = self.required(map, "godMode") {
            if !flag.is_boolean() {
                self.at("godMode", |w| w.mismatch("a boolean", flag));
            }
        }
        if let Some(id) = map.get("lastMovedTaskId").filter(|v| !v.is_null()) {
            self.at("lastMovedTaskId", |w| {
                w.string(id);
            });
        }
        if let Some(at) = map.get("lastMovedAt").filter(|v| !v.is_null()) {
            self.at("lastMovedAt", |w| w.timestamp(at));
        }
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    fn task(&mut self, value: &Value) {
        let Some(map) = self.object(value) else {
            return;
        };
        for field in TaskField::ALL {
            let present = map.get(field.as_str()).filter(|v| !v.is_null());
            match present {
                Some(v) => self.at(field.as_str(), |w| w.field(field, v)),
                None if field.is_optional() => {}
                None => self.at(field.as_str(), |w| w.issue("required")),
            }
        }
    }

    /// A diff side: any subset of task fields. `null` clears an optional one.
    fn patch(&mut self, value: &Value) {
        let Some(map) = self.object(value) else {
            return;
        };
        for (key, v) in map {
            let Ok(field) = key.parse::<TaskField>() else {
                continue;
            };
            self.at(key, |w| {
                if v.is_null() {
                    if !field.is_optional() {
                        w.issue("cannot be null");
                    }
                } else {
                    w.field(field, v);
                }
            });
        }
    }

    fn field(&mut self, field: TaskField, value: &Value) {
        match field {
            TaskField::Id => {
                if let Some(text) = self.string(value) {
                    if TaskId::parse(text).is_err() {
                        self.issue(format!("'{text}' is not a UUID"));
                    }
                }
            }
            TaskField::Title => {
                if let Some(text) = self.string(value) {
                    if text.trim().chars().count() < MIN_TITLE_CHARS {
                        self.issue(format!("must be at least {MIN_TITLE_CHARS} characters"));
                    }
                }
            }
            TaskField::Description | TaskField::ReviewerNotes => {
                self.string(value);
            }
            TaskField::Priority => self.one_of(value, &Priority::ALL.map(Priority::as_str)),
            TaskField::Status => self.one_of(value, &Status::ALL.map(Status::as_str)),
            TaskField::Tags => {
                if let Some(items) = self.array(value) {
                    self.each(items, |w, tag| {
                        w.string(tag);
                    });
                }
            }
            TaskField::EstimateMinutes => {
                let minutes = value.as_u64().and_then(|n| u32::try_from(n).ok());
                if minutes.is_none() {
                    self.issue("expected a non-negative number of minutes");
                }
            }
            TaskField::CreatedAt | TaskField::DueAt => self.timestamp(value),
            TaskField::Rubric => self.rubric(value),
        }
    }

    fn rubric(&mut self, value: &Value) {
        let Some(map) = self.object(value) else {
            return;
        };
        if let Some(score) = self.required(map, "score") {
            let in_range = score
                .as_u64()
                .is_some_and(|n| n <= u64::from(MAX_RUBRIC_SCORE));
            if !in_range {
                self.at("score", |w| {
                    w.issue(format!("expected a whole number from 0 to {MAX_RUBRIC_SCORE}"));
                });
            }
        }
        if let Some(comment) = map.get("comment").filter(|v| !v.is_null()) {
            self.at("comment", |w| {
                w.string(comment);
            });
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    fn event(&mut self, value: &Value) {
        let Some(map) = self.object(value) else {
            return;
        };
        if let Some(ts) = self.required(map, "timestamp") {
            self.at("timestamp", |w| w.timestamp(ts));
        }
        if let Some(action) = self.required(map, "action") {
            self.at("action", |w| {
                if let Some(text) = w.string(action) {
                    if let Err(err) = text.parse::<Action>() {
                        w.issue(err.to_string());
                    }
                }
            });
        }
        for key in ["taskId", "actorLabel"] {
            if let Some(text) = self.required(map, key) {
                self.at(key, |w| {
                    w.string(text);
                });
            }
        }
        if let Some(diff) = self.required(map, "diff") {
            self.at("diff", |w| w.diff(diff));
        }
        if let Some(prior) = map.get("priorTasks").filter(|v| !v.is_null()) {
            self.at("priorTasks", |w| {
                if let Some(items) = w.array(prior) {
                    w.each(items, Self::task);
                }
            });
        }
    }

    fn diff(&mut self, value: &Value) {
        let Some(map) = self.object(value) else {
            return;
        };
        for side in ["before", "after"] {
            if let Some(patch) = map.get(side).filter(|v| !v.is_null()) {
                self.at(side, |w| w.patch(patch));
            }
        }
        if let Some(note) = map.get("note").filter(|v| !v.is_null()) {
            self.at("note", |w| {
                w.string(note);
            });
        }
    }
}
