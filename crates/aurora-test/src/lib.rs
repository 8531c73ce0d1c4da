//! Aurora Test — shared test fixtures and mocks for Aurora Pro.
//!
//! Mock implementations and test helpers used across multiple
//! `aurora-*` crates as a dev-dependency, so every crate's test suite
//! isn't re-deriving a `MockHealthCheck` or a throwaway
//! `PolicyGate::from_policy(...)` of its own.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! aurora-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod tests {
//!     use aurora_test::prelude::*;
//!
//!     #[tokio::test]
//!     async fn test_something() {
//!         let gate = wide_open_gate();
//!         assert!(gate.authorize("vision_agent").is_ok());
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
