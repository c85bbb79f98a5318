//! Board search language.
//!
//! A query is whitespace-separated tokens. Recognized prefixes filter
//! structurally; anything else is a free-text term matched against the task
//! title and description.
//!
//! | Token | Meaning |
//! |---|---|
//! | `tag:<v>` | task has tag `v` (case-insensitive); repeatable, all must match |
//! | `p:<low\|medium\|high>` | exact priority |
//! | `due:overdue` | due date already passed |
//! | `due:week` | due between now and the end of the due window |
//! | `est:<op><n>` | estimate compared with `n` minutes; op is `<`, `<=`, `>`, `>=`, `=` |
//!
//! Results are ordered by priority (high first), then by soonest due date,
//! with undated tasks last.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::ErrorCode;
use crate::model::{Priority, Task};

/// Default span of `due:week`, in days.
pub const DEFAULT_DUE_WINDOW_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueFilter {
    Overdue,
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    // Longest operators first so `<=` is not read as `<`.
    const OPERATORS: [(&'static str, Self); 5] = [
        ("<=", Self::Le),
        (">=", Self::Ge),
        ("=", Self::Eq),
        ("<", Self::Lt),
        (">", Self::Gt),
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "=",
        }
    }

    #[must_use]
    pub fn holds(self, lhs: u32, rhs: u32) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateFilter {
    pub op: Comparison,
    pub minutes: u32,
}

impl fmt::Display for EstimateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.minutes)
    }
}

/// A token with a known prefix had an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid priority '{0}': expected low, medium or high")]
    InvalidPriority(String),

    #[error("invalid due filter '{0}': expected overdue or week")]
    InvalidDue(String),

    #[error("invalid estimate comparator '{0}': expected <op><minutes>, e.g. est:<=60")]
    InvalidEstimate(String),
}

impl QueryError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidQuery
    }
}

/// A parsed query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text_terms: Vec<String>,
    /// Lowercased.
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub due: Option<DueFilter>,
    pub estimate: Option<EstimateFilter>,
}

/// Parse a query string.
///
/// # Errors
///
/// Returns [`QueryError`] for a `p:`, `due:` or `est:` token whose value is
/// not recognized.
pub fn parse_query(input: &str) -> Result<Query, QueryError> {
    let mut query = Query::default();
    for token in input.split_whitespace() {
        if let Some(tag) = token.strip_prefix("tag:") {
            if !tag.is_empty() {
                query.tags.push(tag.to_lowercase());
            }
        } else if let Some(raw) = token.strip_prefix("p:") {
            let priority = raw.to_lowercase();
            let parsed = Priority::ALL
                .into_iter()
                .find(|p| p.as_str() == priority)
                .ok_or(QueryError::InvalidPriority(priority))?;
            query.priority = Some(parsed);
        } else if let Some(raw) = token.strip_prefix("due:") {
            query.due = Some(match raw.to_lowercase().as_str() {
                "overdue" => DueFilter::Overdue,
                "week" => DueFilter::Week,
                other => return Err(QueryError::InvalidDue(other.to_string())),
            });
        } else if let Some(raw) = token.strip_prefix("est:") {
            query.estimate = Some(parse_estimate(raw)?);
        } else {
            query.text_terms.push(token.to_string());
        }
    }
    Ok(query)
}

fn parse_estimate(raw: &str) -> Result<EstimateFilter, QueryError> {
    let invalid = || QueryError::InvalidEstimate(raw.to_string());
    let (op, digits) = Comparison::OPERATORS
        .into_iter()
        .find_map(|(symbol, op)| raw.strip_prefix(symbol).map(|rest| (op, rest)))
        .ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let minutes = digits.parse().map_err(|_| invalid())?;
    Ok(EstimateFilter { op, minutes })
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_query(s)
    }
}

impl Query {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `task` passes every filter, evaluated at `now`.
    #[must_use]
    pub fn matches(&self, task: &Task, now: DateTime<Utc>, due_window: Duration) -> bool {
        if !self.text_terms.is_empty() {
            let haystack = task.search_text();
            if !self
                .text_terms
                .iter()
                .all(|term| haystack.contains(&term.to_lowercase()))
            {
                return false;
            }
        }

        if !self.tags.is_empty() {
            let task_tags: Vec<String> = task.tags.iter().map(|t| t.to_lowercase()).collect();
            if !self.tags.iter().all(|tag| task_tags.contains(tag)) {
                return false;
            }
        }

        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }

        if let Some(due_filter) = self.due {
            let Some(due) = task.due_at else {
                return false;
            };
            let passes = match due_filter {
                DueFilter::Overdue => due < now,
                DueFilter::Week => {
                    // A window reaching past the representable range is unbounded.
                    due >= now
                        && now
                            .checked_add_signed(due_window)
                            .is_none_or(|end| due <= end)
                }
            };
            if !passes {
                return false;
            }
        }

        self.estimate
            .is_none_or(|est| est.op.holds(task.estimate_minutes, est.minutes))
    }
}

/// Filter and order `tasks` by `query`.
#[must_use]
pub fn apply_query<'a>(
    tasks: &'a [Task],
    query: &Query,
    now: DateTime<Utc>,
    due_window_days: u32,
) -> Vec<&'a Task> {
    let window = Duration::days(i64::from(due_window_days));
    let mut matched: Vec<&Task> = tasks
        .iter()
        .filter(|task| query.matches(task, now, window))
        .collect();
    matched.sort_by_key(|task| (task.priority.rank(), task.due_at.is_none(), task.due_at));
    matched
}
