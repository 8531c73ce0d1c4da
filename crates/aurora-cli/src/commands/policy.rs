//! `aurora policy` — inspect and edit the operator policy file.

use anyhow::{Context, Result};
use aurora_config::AuroraConfig;
use aurora_policy::{Policy, KNOWN_CAPABILITIES};
use clap::Subcommand;

use crate::theme::Theme;

/// `aurora policy <command>`.
#[derive(Subcommand)]
pub enum PolicyCommand {
    /// Print the current policy file.
    Show,
    /// Turn the master `operator_enabled` switch on or off.
    Master {
        /// `on` or `off`.
        state: String,
    },
    /// Enable a capability.
    Enable {
        /// Capability name, e.g. `plugin_system`.
        capability: String,
    },
    /// Disable a capability.
    Disable {
        /// Capability name, e.g. `plugin_system`.
        capability: String,
    },
}

/// Run a [`PolicyCommand`] against the policy file named in `config`.
pub fn dispatch(config: &AuroraConfig, command: PolicyCommand) -> Result<()> {
    let path = config.paths.policy_path();
    match command {
        PolicyCommand::Show => show(&path),
        PolicyCommand::Master { state } => set_master(&path, parse_on_off(&state)?),
        PolicyCommand::Enable { capability } => set_capability(&path, &capability, true),
        PolicyCommand::Disable { capability } => set_capability(&path, &capability, false),
    }
}

fn parse_on_off(state: &str) -> Result<bool> {
    match state {
        "on" => Ok(true),
        "off" => Ok(false),
        other => anyhow::bail!("expected `on` or `off`, got `{other}`"),
    }
}

fn load(path: &std::path::Path) -> Result<Policy> {
    if !path.exists() {
        return Ok(Policy::locked_down());
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn save(path: &std::path::Path, policy: &Policy) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(policy).context("serializing policy")?;
    std::fs::write(path, yaml).with_context(|| format!("writing {}", path.display()))
}

fn show(path: &std::path::Path) -> Result<()> {
    let policy = load(path)?;
    println!("{}", Theme::header("operator policy"));
    println!("operator_enabled = {}", policy.operator_enabled);
    for capability in KNOWN_CAPABILITIES {
        let state = if policy.is_authorized(capability) { "enabled" } else { "disabled" };
        println!("  {capability:<24} {state}");
    }
    Ok(())
}

fn set_master(path: &std::path::Path, on: bool) -> Result<()> {
    let mut policy = load(path)?;
    policy.operator_enabled = on;
    save(path, &policy)?;
    println!("{}", Theme::success(&format!("operator_enabled set to {on}")));
    Ok(())
}

fn set_capability(path: &std::path::Path, capability: &str, on: bool) -> Result<()> {
    if !KNOWN_CAPABILITIES.contains(&capability) {
        println!("{}", Theme::warning(&format!("`{capability}` is not a recognized capability name, setting it anyway")));
    }
    let mut policy = load(path)?;
    policy.features.insert(capability.to_string(), on);
    save(path, &policy)?;
    println!("{}", Theme::success(&format!("{capability} {}", if on { "enabled" } else { "disabled" })));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_then_disable_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");

        set_master(&path, true).unwrap();
        set_capability(&path, "plugin_system", true).unwrap();
        let policy = load(&path).unwrap();
        assert!(policy.is_authorized("plugin_system"));

        set_capability(&path, "plugin_system", false).unwrap();
        let policy = load(&path).unwrap();
        assert!(!policy.is_authorized("plugin_system"));
    }
}
