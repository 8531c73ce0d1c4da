//! Prelude module - commonly used types for convenient import.
//!
//! Use `use aurora_crypto::prelude::*;` to import all essential types.

pub use crate::{sha256_hex, ContentHash, CryptoError, CryptoResult};
