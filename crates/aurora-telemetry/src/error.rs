//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur with telemetry operations.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Subscriber initialization error.
    #[error("initialization error: {0}")]
    InitError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TelemetryError {
    /// Classify this error into the cross-cutting error taxonomy.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::ConfigError(_) => aurora_core::ErrorKind::Validation,
            Self::InitError(_) | Self::IoError(_) => aurora_core::ErrorKind::Resource,
        }
    }
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
