//! Input Queue error types.

use thiserror::Error;

/// Errors from submitting or executing an input task.
#[derive(Debug, Error)]
pub enum InputError {
    /// The failsafe region was hit (e.g. pointer driven into a screen
    /// corner). Distinct from a transient backend failure: never retried.
    #[error("failsafe triggered: {0}")]
    Failsafe(String),

    /// The backend (enigo) reported a failure.
    #[error("input backend error: {0}")]
    Backend(String),

    /// A task id is not present in the queue's history.
    #[error("unknown input task")]
    UnknownTask,

    /// The queue has been stopped (emergency stop in effect).
    #[error("input queue stopped")]
    Stopped,
}

impl InputError {
    /// Classify this error into the cross-cutting error taxonomy.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::Failsafe(_) => aurora_core::ErrorKind::Validation,
            Self::Backend(_) => aurora_core::ErrorKind::Transport,
            Self::UnknownTask => aurora_core::ErrorKind::Validation,
            Self::Stopped => aurora_core::ErrorKind::PermissionDenied,
        }
    }
}

/// Result type for input queue operations.
pub type InputResult<T> = Result<T, InputError>;
