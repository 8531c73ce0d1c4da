//! Aurora Crypto - content hashing for the audit trail and CLI broker.
//!
//! This crate provides BLAKE3 content hashing, used to record a prompt's
//! hash in a `CLITask`'s audit events (spec §4.4) without storing the
//! prompt text itself in the log line.
//!
//! # Example
//!
//! ```
//! use aurora_crypto::ContentHash;
//!
//! let hash = ContentHash::hash(b"run the test suite");
//! println!("{}", hash.to_hex());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod hash;

pub use error::{CryptoError, CryptoResult};
pub use hash::{sha256_hex, ContentHash};
