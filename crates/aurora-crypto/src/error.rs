//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during hashing or encoding operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid hex encoding.
    #[error("invalid hex encoding: {0}")]
    InvalidHexEncoding(#[from] hex::FromHexError),

    /// Invalid base64 encoding.
    #[error("invalid base64 encoding: {0}")]
    InvalidBase64Encoding(#[from] base64::DecodeError),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
