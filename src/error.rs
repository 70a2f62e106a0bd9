use crate::domain::Id;
use thiserror::Error;

/// Domain rule violations. Always recoverable, shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no task selected")]
    NoTaskSelected,
    #[error("minimum one minute")]
    BelowMinimum,
    #[error("task cannot change while the timer is active")]
    TaskLocked,
    #[error("minutes spent must be at least 1")]
    InvalidMinutes,
    #[error("time record has no task")]
    MissingTask,
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),
    #[error("invalid color '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("subtasks cannot have subtasks of their own")]
    NestingTooDeep,
    #[error("parent task belongs to another project")]
    ParentInOtherProject,
    #[error("a task cannot move to another project")]
    ProjectChanged,
}

/// Errors surfaced by the store and by operations that go through it
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("store unavailable: {0}")]
    Transport(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Id },
}

impl TrackerError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn not_found(kind: &'static str, id: Id) -> Self {
        Self::NotFound { kind, id }
    }

    /// Transport failures are worth retrying, everything else needs new input
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
