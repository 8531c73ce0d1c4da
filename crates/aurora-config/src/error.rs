//! Configuration error types.

use std::path::PathBuf;

/// Errors raised while loading, watching, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A config file's contents could not be parsed as TOML.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A loaded configuration failed a validation rule.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The file watcher could not be started.
    #[error("failed to watch config file: {0}")]
    Watch(String),
}

impl ConfigError {
    /// Classify this error into the cross-cutting [`aurora_core::ErrorKind`]
    /// taxonomy.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::Read { .. } | Self::Parse { .. } | Self::Invalid(_) => {
                aurora_core::ErrorKind::Validation
            }
            Self::Watch(_) => aurora_core::ErrorKind::Resource,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
