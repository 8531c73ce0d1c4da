//! Aurora Audit - the append-only audit trail.
//!
//! This crate provides:
//! - [`AuditEvent`], the immutable JSONL record (timestamp, actor,
//!   action, message, metadata)
//! - [`AuditSink`], a per-subsystem writer whose `emit` never blocks or
//!   fails the caller
//! - [`AuditRegistry`], a lazily-populated set of sinks keyed by
//!   subsystem name, shared across a process
//!
//! Rotation is out of scope here: logs grow unbounded by design and
//! operators rotate them externally.
//!
//! # Example
//!
//! ```
//! # #[tokio::main]
//! # async fn main() {
//! use aurora_audit::{AuditEvent, AuditRegistry};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let registry = AuditRegistry::new(dir.path());
//! let sink = registry.sink("heartbeat").await.unwrap();
//! sink.emit(AuditEvent::system("heartbeat.tick", "all components healthy"));
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod event;
mod registry;
mod sink;

pub use error::{AuditError, AuditResult};
pub use event::AuditEvent;
pub use registry::AuditRegistry;
pub use sink::AuditSink;
