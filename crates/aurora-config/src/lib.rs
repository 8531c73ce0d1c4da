//! Aurora Config — operator configuration (env, files, hot reload).
//!
//! Provides a single [`AuroraConfig`] type consolidating the process's
//! data-root layout, LLM provider credentials, per-agent CLI command
//! templates, server bind settings, and the cache/heartbeat/timeout
//! budgets the other components are constructed with.
//!
//! # Precedence
//!
//! From lowest to highest priority:
//!
//! 1. **Embedded defaults** — every section's `Default` impl.
//! 2. **Config file** (TOML, path supplied by the caller — typically
//!    `<data_root>/aurora.toml`).
//! 3. **Environment variables** — the set named in spec §6
//!    (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, `GOOGLE_API_KEY`,
//!    `VLLM_BASE_URL`, `TWOCAPTCHA_API_KEY`, `AURORA_ADMIN_KEY`,
//!    `<AGENT>_CLI_CMD`) — always wins, so a credential never has to
//!    be committed to a file to take effect.
//!
//! # Usage
//!
//! ```rust,no_run
//! use aurora_config::AuroraConfig;
//!
//! let config = AuroraConfig::load(Some(std::path::Path::new("./aurora.toml"))).unwrap();
//! println!("listening on {}:{}", config.server.bind, config.server.port);
//! ```
//!
//! # Hot reload
//!
//! [`loader::watch`] starts a `notify`-backed filesystem watcher that
//! re-parses and re-validates the file on every write, sending the
//! result (or the validation error) down a channel. A failed reload
//! is reported but does not replace the last-known-good configuration
//! — callers decide whether to apply it.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

/// Configuration error types.
pub mod error;
/// Configuration file loading, environment overlay, and hot reload.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::{
    AgentsSection, AuroraConfig, CacheSection, HeartbeatSection, PathsSection, ProviderEntry,
    ProvidersSection, ServerSection, TimeoutsSection,
};

impl AuroraConfig {
    /// Load configuration from an optional TOML file, apply the
    /// environment overlay, and validate.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `path` is given but cannot be read
    /// or parsed, or if the merged configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }
}
