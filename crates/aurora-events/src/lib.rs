//! Aurora Events - the reasoning stream shared by the Autonomous Planner,
//! Action Executor, and anything else narrating its work (C8).
//!
//! This crate provides:
//! - [`ReasoningStep`]/[`ReasoningContext`] types
//! - [`ReasoningStream`], an append-only in-memory ring plus per-context
//!   ordered step lists, fanned out to bounded-channel subscribers
//!
//! # Architecture
//!
//! Steps are recorded with [`ReasoningStream::add_step`] and attach to
//! whichever context is currently the implicit default, unless the step
//! names one explicitly. Subscribers register a bounded channel with
//! [`ReasoningStream::subscribe`]; a subscriber that falls behind is
//! dropped on the next publish rather than allowed to block the stream.
//! When a context ends, it is serialized to disk if a persist directory
//! was configured.
//!
//! # Example
//!
//! ```rust
//! use aurora_events::{ContextStatus, ReasoningStream, StepBuilder};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let stream = ReasoningStream::new();
//! let mut receiver = stream.subscribe();
//!
//! let ctx = stream.begin_context("investigate flaky test");
//! stream.add_step(StepBuilder::new("planner", "reading recent CI logs"));
//! stream.end_context(&ctx, ContextStatus::Completed).await.unwrap();
//!
//! let event = receiver.recv().await.unwrap();
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod event;
mod stream;

pub use error::{EventsError, EventsResult};
pub use event::{
    ContextStatus, ReasoningContext, ReasoningLevel, ReasoningStep, StepBuilder, StreamEvent,
};
pub use stream::{ReasoningStream, DEFAULT_RING_CAPACITY, DEFAULT_SUBSCRIBER_CAPACITY};
