//! Aurora Kernel: the Control Plane (C9).
//!
//! Owns ordered startup/shutdown of every other component and the
//! external collaborators, an idempotent emergency stop that fans out
//! concurrently to every registered subsystem, and the on-demand
//! metrics snapshot (host gauges plus per-component health) with its
//! bounded history ring.
//!
//! Every other component is modeled as a [`Subsystem`] and registered
//! with a [`ControlPlane`] in dependency order at process startup —
//! this crate owns no subsystem directly, per the dependency-injection
//! design named in spec §9: one instance per component, constructed at
//! startup and passed explicitly, rather than a process-wide global.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use aurora_audit::AuditSink;
//! use aurora_events::ReasoningStream;
//! use aurora_kernel::ControlPlane;
//! use aurora_telemetry::HeartbeatSupervisor;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let audit = AuditSink::open("./logs", "kernel").await?;
//! let reasoning = Arc::new(ReasoningStream::new());
//! let heartbeat = Arc::new(HeartbeatSupervisor::new(Vec::new(), audit.clone(), audit.clone()));
//! let plane = ControlPlane::new(reasoning, heartbeat, audit);
//!
//! plane.start_all().await?;
//! plane.emergency_stop("operator halted").await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod control_plane;
mod error;
mod metrics;
mod subsystem;

pub mod prelude;

pub use control_plane::ControlPlane;
pub use error::{KernelError, KernelResult};
pub use metrics::{KernelSnapshot, DEFAULT_HISTORY_CAPACITY};
pub use subsystem::Subsystem;
