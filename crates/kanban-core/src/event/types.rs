//! Audit action enum covering all six logged mutation kinds.
//!
//! The string form is the upper-case tag used in persisted state and exports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of mutation recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// A task was added to the board.
    Create,
    /// A task's fields were edited, or a system-level correction (time travel).
    Update,
    /// A task was removed.
    Delete,
    /// A task changed column.
    Move,
    /// The whole task collection was replaced from an external payload.
    Import,
    /// An imported task was re-keyed because its id collided.
    ResolveDuplicateId,
}

/// Error returned when parsing an unknown action string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown audit action '{}': expected one of CREATE, UPDATE, DELETE, MOVE, \
             IMPORT, RESOLVE_DUPLICATE_ID",
            self.raw
        )
    }
}

impl std::error::Error for UnknownAction {}

impl Action {
    /// All actions in log-display order.
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Move,
        Self::Import,
        Self::ResolveDuplicateId,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Move => "MOVE",
            Self::Import => "IMPORT",
            Self::ResolveDuplicateId => "RESOLVE_DUPLICATE_ID",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    /// Case-insensitive, so CLI filters can say `--action move`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == upper)
            .ok_or_else(|| UnknownAction { raw: s.to_string() })
    }
}

// Custom serde: serialize as the upper-case tag.
impl Serialize for Action {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
