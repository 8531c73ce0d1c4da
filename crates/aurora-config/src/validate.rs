//! Structural validation for a loaded [`AuroraConfig`].
//!
//! File-malformed or clearly-nonsensical configuration is rejected
//! here rather than surfacing as a confusing panic deep inside a
//! subsystem at startup.

use crate::error::{ConfigError, ConfigResult};
use crate::types::AuroraConfig;

/// Validate `config`, returning the first rule violated.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] describing the first failing rule.
pub fn validate(config: &AuroraConfig) -> ConfigResult<()> {
    if config.paths.data_root.trim().is_empty() {
        return Err(ConfigError::Invalid("paths.data_root must not be empty".to_string()));
    }
    if config.server.port == 0 {
        return Err(ConfigError::Invalid("server.port must not be 0".to_string()));
    }
    if config.cache.memory_budget_bytes == 0 {
        return Err(ConfigError::Invalid("cache.memory_budget_bytes must be greater than 0".to_string()));
    }
    if config.heartbeat.period_secs == 0 {
        return Err(ConfigError::Invalid("heartbeat.period_secs must be greater than 0".to_string()));
    }
    if config.timeouts.cli_task_secs == 0 {
        return Err(ConfigError::Invalid("timeouts.cli_task_secs must be greater than 0".to_string()));
    }
    if config.timeouts.cli_task_max_secs < config.timeouts.cli_task_secs {
        return Err(ConfigError::Invalid(
            "timeouts.cli_task_max_secs must be at least timeouts.cli_task_secs".to_string(),
        ));
    }
    for (agent, template) in &config.agents.cli_commands {
        if template.split_whitespace().next().is_none() {
            return Err(ConfigError::Invalid(format!(
                "agents.{agent}'s CLI command template must have at least one argv token"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate(&AuroraConfig::default()).expect("defaults must validate");
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = AuroraConfig::default();
        config.server.port = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn max_timeout_below_default_is_rejected() {
        let mut config = AuroraConfig::default();
        config.timeouts.cli_task_max_secs = 1;
        config.timeouts.cli_task_secs = 120;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn blank_cli_template_is_rejected() {
        let mut config = AuroraConfig::default();
        config.agents.cli_commands.insert("claude".to_string(), "   ".to_string());
        assert!(validate(&config).is_err());
    }
}
