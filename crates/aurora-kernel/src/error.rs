//! Control Plane error type.

use thiserror::Error;

/// Errors raised while starting, stopping, or querying the Control Plane.
#[derive(Debug, Error)]
pub enum KernelError {
    /// A subsystem's `start()` failed during ordered startup.
    #[error("subsystem '{name}' failed to start: {detail}")]
    StartFailed {
        /// The subsystem's registered name.
        name: String,
        /// Free-text failure detail.
        detail: String,
    },

    /// A subsystem's `stop()` failed during shutdown or emergency stop.
    /// Collected rather than treated as an early return, since shutdown
    /// must still attempt every other subsystem.
    #[error("subsystem '{name}' failed to stop: {detail}")]
    StopFailed {
        /// The subsystem's registered name.
        name: String,
        /// Free-text failure detail.
        detail: String,
    },

    /// The Control Plane is in emergency-stopped state; submission paths
    /// must reject rather than forward the call.
    #[error("control plane is stopped")]
    Stopped,
}

impl KernelError {
    /// Classify this error into the cross-cutting [`aurora_core::ErrorKind`]
    /// taxonomy.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::StartFailed { .. } | Self::StopFailed { .. } => aurora_core::ErrorKind::Fatal,
            Self::Stopped => aurora_core::ErrorKind::PermissionDenied,
        }
    }
}

/// Convenience alias for Control Plane results.
pub type KernelResult<T> = Result<T, KernelError>;
