//! Aurora Telemetry - logging setup, the Heartbeat Supervisor, and host
//! metrics sampling.
//!
//! This crate provides:
//! - Configurable `tracing` logging setup
//! - [`RequestContext`] for correlating log lines across an operation
//! - [`HeartbeatSupervisor`], the periodic health/error/recovery tracker
//!   (C3)
//! - [`sample_system_metrics`], the CPU/memory/disk gauge reader the
//!   Control Plane's metrics snapshot builds on
//!
//! # Example
//!
//! ```rust,no_run
//! use aurora_telemetry::{setup_logging, LogConfig, LogFormat, RequestContext};
//!
//! # fn main() -> Result<(), aurora_telemetry::TelemetryError> {
//! let config = LogConfig::new("info").with_format(LogFormat::Compact);
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("cli_broker").with_operation("dispatch");
//! let _guard = ctx.span().entered();
//! tracing::info!("dispatching task");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod heartbeat;
mod logging;
mod metrics;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use heartbeat::{
    ComponentHealth, ComponentStatus, HealthCheck, HealthSnapshot, HeartbeatSupervisor,
    RecoveryEvent, DEFAULT_PERIOD, RECOVERY_LOG_CAPACITY,
};
pub use logging::{setup_default_logging, setup_logging, LogConfig, LogFormat, LogTarget};
pub use metrics::{sample_system_metrics, SystemMetrics};
