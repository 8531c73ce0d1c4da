//! Reasoning stream error types.

use thiserror::Error;

/// Errors that can occur while operating the reasoning stream.
#[derive(Debug, Error)]
pub enum EventsError {
    /// Unknown context id was referenced.
    #[error("unknown reasoning context: {0}")]
    UnknownContext(String),

    /// Failed to persist a terminal context to disk.
    #[error("failed to persist context {context_id} to {path}: {source}")]
    Persist {
        /// The context that failed to persist.
        context_id: String,
        /// The destination path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a context for persistence.
    #[error("failed to serialize context {context_id}: {source}")]
    Serialize {
        /// The context that failed to serialize.
        context_id: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl EventsError {
    /// Classify this error into the cross-cutting error taxonomy.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::UnknownContext(_) => aurora_core::ErrorKind::Validation,
            Self::Persist { .. } | Self::Serialize { .. } => aurora_core::ErrorKind::Resource,
        }
    }
}

/// Result type for reasoning stream operations.
pub type EventsResult<T> = Result<T, EventsError>;
