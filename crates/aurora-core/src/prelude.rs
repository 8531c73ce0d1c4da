//! Prelude module - commonly used types for convenient import.
//!
//! Use `use aurora_core::prelude::*;` to import the types shared across
//! nearly every other crate in the workspace.

pub use crate::error::ErrorKind;
pub use crate::ids::{new_id, AgentTag, OperatorId};
pub use crate::retry::{retry_with_backoff, BackoffPolicy};
pub use crate::taskclass::TaskClass;
pub use crate::timestamp::Timestamp;
