//! LLM-related error types.

use thiserror::Error;

/// Errors that can occur with LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API key not configured.
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// The request timed out.
    #[error("request to {provider} timed out after {elapsed_ms}ms")]
    Timeout {
        /// Provider name.
        provider: String,
        /// How long the request ran before timing out.
        elapsed_ms: u64,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Requested provider, or a provider named in a fallback chain, is
    /// not present in the configured provider table.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// No candidate provider survived selection and every entry in the
    /// fallback chain also failed.
    #[error("no provider available for the request")]
    NoProviderAvailable,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// IO error, e.g. persisting provider statistics.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LlmError {
    /// Classify this error into the cross-cutting error taxonomy.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::ApiKeyNotConfigured { .. } | Self::ConfigError(_) | Self::UnknownProvider(_) => {
                aurora_core::ErrorKind::Validation
            },
            Self::Timeout { .. } => aurora_core::ErrorKind::Timeout,
            Self::ApiRequestFailed(_) | Self::HttpError(_) => aurora_core::ErrorKind::Transport,
            Self::InvalidResponse(_) => aurora_core::ErrorKind::Protocol,
            Self::NoProviderAvailable | Self::IoError(_) => aurora_core::ErrorKind::Resource,
        }
    }
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;
