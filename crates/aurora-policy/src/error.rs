//! Policy gate error types.

use aurora_core::ErrorKind;
use thiserror::Error;

/// Errors raised by the policy gate.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The operator master flag or the named feature flag was false.
    #[error("capability '{capability}' is not authorized")]
    NotAuthorized {
        /// The capability that was denied.
        capability: String,
    },

    /// The policy file could not be read.
    #[error("failed to read policy file {path}: {source}")]
    Io {
        /// Path of the policy file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The policy file could not be parsed as YAML.
    #[error("failed to parse policy file {path}: {source}")]
    Parse {
        /// Path of the policy file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The filesystem watcher used for hot reload could not be started.
    #[error("failed to watch policy file for changes: {0}")]
    Watch(#[from] notify::Error),
}

impl PolicyError {
    /// Classify this error into the cross-cutting error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthorized { .. } => ErrorKind::PermissionDenied,
            Self::Io { .. } | Self::Parse { .. } => ErrorKind::Validation,
            Self::Watch(_) => ErrorKind::Resource,
        }
    }
}

/// Result type for policy gate operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
