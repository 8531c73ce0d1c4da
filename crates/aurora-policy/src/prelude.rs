//! Prelude module - commonly used types for convenient import.
//!
//! Use `use aurora_policy::prelude::*;` to import all essential types.

pub use crate::{Policy, PolicyError, PolicyGate, PolicyResult, KNOWN_CAPABILITIES};
