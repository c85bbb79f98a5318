use std::fmt;

/// Machine-readable error codes for scripted callers of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TaskNotFound,
    InvalidTask,
    DuplicateTaskId,
    ImmutableField,
    InvalidImport,
    InvalidQuery,
    TimeTravelOutOfRange,
    CorruptState,
    StateWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::InvalidTask => "E2002",
            Self::DuplicateTaskId => "E2003",
            Self::ImmutableField => "E2004",
            Self::InvalidImport => "E3001",
            Self::InvalidQuery => "E3002",
            Self::TimeTravelOutOfRange => "E4001",
            Self::CorruptState => "E5001",
            Self::StateWriteFailed => "E5002",
            Self::LockContention => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Board not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::InvalidTask => "Task failed validation",
            Self::DuplicateTaskId => "Task id already exists",
            Self::ImmutableField => "Immutable task field changed",
            Self::InvalidImport => "Import payload failed validation",
            Self::InvalidQuery => "Invalid search query",
            Self::TimeTravelOutOfRange => "Audit index out of range",
            Self::CorruptState => "Persisted state is corrupt",
            Self::StateWriteFailed => "State file write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `kb init` to create a board in this directory."),
            Self::ConfigParseError => Some("Fix syntax in .kanban/config.toml and retry."),
            Self::TaskNotFound => Some("Use `kb list` to see the ids of live tasks."),
            Self::InvalidTask => {
                Some("Titles need 3+ characters and due dates cannot precede creation.")
            }
            Self::DuplicateTaskId => None,
            Self::ImmutableField => Some("createdAt is set once at creation and never edited."),
            Self::InvalidImport => Some("Compare the payload against `kb export` output."),
            Self::InvalidQuery => {
                Some("Supported tokens: tag:<v>, p:<low|medium|high>, due:<overdue|week>, est:<op><n>.")
            }
            Self::TimeTravelOutOfRange => Some("Use `kb log` to list valid audit indices."),
            Self::CorruptState => {
                Some("Restore the state file from an export, or re-import a known-good payload.")
            }
            Self::StateWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `kb` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
