//! Aurora Core - foundation types shared by every Aurora Pro crate.
//!
//! This crate provides:
//! - The cross-cutting error-kind taxonomy from the error handling design
//!   (`ErrorKind`), which every crate's own error type classifies into via
//!   `kind()`.
//! - Common identifiers and the UTC millisecond `Timestamp` used by audit
//!   events, tasks, and workflows.
//! - The task-class enum shared between the LLM Router and the Autonomous
//!   Planner.
//! - A retry/backoff helper used by the CLI broker, the input queue, and
//!   the LLM router's fallback chain.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod ids;
pub mod prelude;
pub mod retry;
pub mod taskclass;
pub mod timestamp;

pub use error::ErrorKind;
pub use ids::{new_id, AgentTag, OperatorId};
pub use retry::{retry_with_backoff, BackoffPolicy};
pub use taskclass::TaskClass;
pub use timestamp::Timestamp;
