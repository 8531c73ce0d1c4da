//! Prelude module - commonly used types for convenient import.
//!
//! Use `use aurora_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use aurora_events::prelude::*;
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

// Errors
pub use crate::{EventsError, EventsResult};

// Reasoning steps and contexts
pub use crate::{
    ContextStatus, ReasoningContext, ReasoningLevel, ReasoningStep, StepBuilder, StreamEvent,
};

// The stream itself
pub use crate::{ReasoningStream, DEFAULT_RING_CAPACITY, DEFAULT_SUBSCRIBER_CAPACITY};
