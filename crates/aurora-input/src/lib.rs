#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! The Input Queue (C10): a strictly serialized, single-worker mouse and
//! keyboard action queue, global across the process per spec.md's
//! ordering guarantee.

mod action;
mod backend;
mod error;
mod queue;

pub use action::{is_failsafe_corner, InputAction, MouseButton};
pub use backend::{EnigoBackend, InputBackend};
pub use error::{InputError, InputResult};
pub use queue::{InputQueue, InputQueueHealth, InputTaskStatus};
