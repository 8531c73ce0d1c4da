//! Audit-related error types.

use aurora_core::ErrorKind;
use thiserror::Error;

/// Errors that can occur opening an audit sink.
///
/// Note that a running sink never returns an error from `emit` — a
/// failed write is logged at `warn` and dropped, per the "logging must
/// never fail a caller" invariant. This type only covers sink setup.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The subsystem's log directory could not be created.
    #[error("failed to create audit log directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The subsystem's log file could not be opened for appending.
    #[error("failed to open audit log {path}: {source}")]
    OpenFile {
        /// File that could not be opened.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl AuditError {
    /// Classify this error into the cross-cutting error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CreateDir { .. } | Self::OpenFile { .. } => ErrorKind::Resource,
        }
    }
}

/// Result type for audit sink setup.
pub type AuditResult<T> = Result<T, AuditError>;
