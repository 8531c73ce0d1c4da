//! Aurora Policy - the operator authorization gate.
//!
//! This crate provides:
//! - [`Policy`], the on-disk (YAML) document holding the master
//!   `operator_enabled` switch and the per-capability feature map
//! - [`PolicyGate`], a process-wide, hot-reloadable handle that every
//!   privileged call authorizes against before producing a side effect
//!
//! # Example
//!
//! ```
//! use aurora_policy::{Policy, PolicyGate};
//!
//! let mut policy = Policy::locked_down();
//! policy.operator_enabled = true;
//! policy.features.insert("vision_agent".to_string(), true);
//!
//! let gate = PolicyGate::from_policy(policy);
//! assert!(gate.authorize("vision_agent").is_ok());
//! assert!(gate.authorize("control_mouse_keyboard").is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod store;

pub use error::{PolicyError, PolicyResult};
pub use store::{Policy, PolicyGate, KNOWN_CAPABILITIES};
