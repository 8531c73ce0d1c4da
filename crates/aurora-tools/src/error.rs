//! Tool-level error types.

use thiserror::Error;

/// Errors from the CLI Task Broker and the built-in Action tool
/// implementations.
#[derive(Debug, Error)]
pub enum ToolsError {
    /// I/O error (file read/write/delete, subprocess spawn).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A subprocess exceeded its wall-clock deadline and was killed.
    #[error("timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the process ran before being killed.
        elapsed_ms: u64,
    },

    /// No command template is configured for this agent.
    #[error("no command template configured for agent {0:?}")]
    AgentNotConfigured(String),

    /// A task id is not present in the broker's in-memory ring.
    #[error("unknown task")]
    UnknownTask,
}

impl ToolsError {
    /// Classify this error into the cross-cutting error taxonomy.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::Io(_) => aurora_core::ErrorKind::Resource,
            Self::InvalidArgument(_) | Self::UnknownTask => aurora_core::ErrorKind::Validation,
            Self::Timeout { .. } => aurora_core::ErrorKind::Timeout,
            Self::AgentNotConfigured(_) => aurora_core::ErrorKind::Resource,
        }
    }
}

/// Result type for tool operations.
pub type ToolsResult<T> = Result<T, ToolsError>;
