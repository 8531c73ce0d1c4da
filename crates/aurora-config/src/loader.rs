//! Configuration loading and hot reload.
//!
//! Implements the load algorithm:
//! 1. Parse the embedded defaults (the [`AuroraConfig`] `Default` impls).
//! 2. Merge an optional TOML file over the defaults.
//! 3. Apply the environment-variable overlay (always wins).
//! 4. Validate.

use std::path::{Path, PathBuf};

use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::types::AuroraConfig;
use crate::validate;

/// Load configuration from an optional TOML file, then apply the
/// environment overlay, then validate.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `path` exists but cannot be read or
/// parsed, or if the merged configuration fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<AuroraConfig> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => AuroraConfig::default(),
    };

    apply_env_overlay(&mut config);
    validate::validate(&config)?;
    Ok(config)
}

/// Load configuration from a single TOML file, with no environment
/// overlay or validation.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> ConfigResult<AuroraConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let config: AuroraConfig = toml::from_str(&text)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source: Box::new(source) })?;
    info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Recognized environment variables, matched literally or by the
/// `<AGENT>_CLI_CMD` pattern.
fn apply_env_overlay(config: &mut AuroraConfig) {
    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        config.providers.entries.entry("anthropic".to_string()).or_default().api_key = Some(key);
    }
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        config.providers.entries.entry("openai".to_string()).or_default().api_key = Some(key);
    }
    if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
        config.providers.entries.entry("google".to_string()).or_default().api_key = Some(key);
    }
    if let Ok(url) = std::env::var("VLLM_BASE_URL") {
        config.providers.entries.entry("vllm".to_string()).or_default().base_url = Some(url);
    }
    if let Ok(key) = std::env::var("TWOCAPTCHA_API_KEY") {
        config.providers.entries.entry("twocaptcha".to_string()).or_default().api_key = Some(key);
    }
    if let Ok(key) = std::env::var("AURORA_ADMIN_KEY") {
        config.server.admin_key = Some(key);
    }

    for (name, value) in std::env::vars() {
        if let Some(agent) = name.strip_suffix("_CLI_CMD") {
            config.agents.cli_commands.insert(agent.to_lowercase(), value);
        }
    }
}

/// Watch `path` for changes, sending a freshly reloaded and validated
/// [`AuroraConfig`] on every write.
///
/// The returned [`notify::RecommendedWatcher`] must be kept alive for
/// as long as watching should continue; dropping it stops the watch.
///
/// # Errors
///
/// Returns a [`ConfigError::Watch`] if the underlying filesystem
/// watcher cannot be started.
pub fn watch(
    path: &Path,
) -> ConfigResult<(notify::RecommendedWatcher, mpsc::Receiver<ConfigResult<AuroraConfig>>)> {
    let (tx, rx) = mpsc::channel(8);
    let watched_path = path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
        let Ok(event) = event else { return };
        if !event.kind.is_modify() && !event.kind.is_create() {
            return;
        }
        let reloaded = load_file(&watched_path);
        if let Err(ref err) = reloaded {
            warn!(path = %watched_path.display(), error = %err, "config reload failed");
        }
        if tx.try_send(reloaded).is_err() {
            warn!("config reload channel full or closed; dropping event");
        }
    })
    .map_err(|e| ConfigError::Watch(e.to_string()))?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .map_err(|e| ConfigError::Watch(e.to_string()))?;

    Ok((watcher, rx))
}

/// Best-effort default data root: `$AURORA_DATA_ROOT`, or `./aurora-data`.
#[must_use]
pub fn default_data_root() -> PathBuf {
    std::env::var("AURORA_DATA_ROOT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./aurora-data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let config = load(None).expect("defaults must validate");
        assert_eq!(config.server.port, 8787);
    }

    #[test]
    fn file_overlay_replaces_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("aurora.toml");
        std::fs::write(&path, "[server]\nport = 9001\n").expect("write config");
        let config = load(Some(&path)).expect("load");
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    #[allow(unsafe_code)]
    fn env_overlay_wins_over_file() {
        // SAFETY (test-only): no other thread in this test binary reads
        // this variable concurrently.
        unsafe {
            std::env::set_var("AURORA_ADMIN_KEY", "test-admin-key");
        }
        let config = load(None).expect("defaults must validate");
        assert_eq!(config.server.admin_key.as_deref(), Some("test-admin-key"));
        unsafe {
            std::env::remove_var("AURORA_ADMIN_KEY");
        }
    }

    #[test]
    #[allow(unsafe_code)]
    fn agent_cli_cmd_pattern_is_recognized() {
        unsafe {
            std::env::set_var("CLAUDE_CLI_CMD", "claude --print");
        }
        let config = load(None).expect("defaults must validate");
        assert_eq!(config.agents.cli_commands.get("claude").map(String::as_str), Some("claude --print"));
        unsafe {
            std::env::remove_var("CLAUDE_CLI_CMD");
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_file(Path::new("/nonexistent/aurora.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
