//! `aurora doctor` — environment and configuration health checks.

use anyhow::Result;
use aurora_config::AuroraConfig;
use aurora_policy::{Policy, KNOWN_CAPABILITIES};

use crate::theme::Theme;

/// Run a battery of non-destructive checks against `config` and print
/// a pass/warn line for each. Never returns an error itself — a failed
/// check is reported, not propagated, so the operator gets the full
/// list in one pass.
pub async fn run(config: &AuroraConfig) -> Result<()> {
    println!("{}", Theme::header("Aurora Pro — environment check"));

    check_data_root(config);
    check_policy_file(config);
    check_providers(config);
    check_agents(config);

    Ok(())
}

fn check_data_root(config: &AuroraConfig) {
    let logs = config.paths.logs_path();
    let cache = config.paths.cache_path();
    for (label, dir) in [("logs", &logs), ("cache", &cache)] {
        match std::fs::create_dir_all(dir) {
            Ok(()) => println!("{}", Theme::success(&format!("{label} directory writable ({})", dir.display()))),
            Err(error) => println!("{}", Theme::error(&format!("{label} directory not writable ({}): {error}", dir.display()))),
        }
    }
}

fn check_policy_file(config: &AuroraConfig) {
    let path = config.paths.policy_path();
    if !path.exists() {
        println!("{}", Theme::warning(&format!("no policy file at {} (run `aurora init`)", path.display())));
        return;
    }
    match aurora_policy::PolicyGate::load(&path) {
        Ok(gate) => {
            let policy = gate.snapshot();
            let enabled = KNOWN_CAPABILITIES.iter().filter(|c| policy.is_authorized(c)).count();
            println!(
                "{}",
                Theme::success(&format!(
                    "policy file parses ({enabled}/{} capabilities enabled, operator_enabled={})",
                    KNOWN_CAPABILITIES.len(),
                    policy.operator_enabled
                ))
            );
        },
        Err(error) => println!("{}", Theme::error(&format!("policy file at {} failed to parse: {error}", path.display()))),
    }
}

fn check_providers(config: &AuroraConfig) {
    if config.providers.entries.is_empty() {
        println!("{}", Theme::warning("no LLM provider entries configured"));
        return;
    }
    for (family, entry) in &config.providers.entries {
        let has_key = entry.api_key.is_some();
        let has_url = entry.base_url.is_some();
        if has_key || has_url {
            println!("{}", Theme::success(&format!("provider `{family}` configured")));
        } else {
            println!("{}", Theme::warning(&format!("provider `{family}` listed but has no key or base URL")));
        }
    }
}

fn check_agents(config: &AuroraConfig) {
    if config.agents.cli_commands.is_empty() {
        println!("{}", Theme::warning("no CLI agent command templates configured (`<AGENT>_CLI_CMD`)"));
    } else {
        for agent in config.agents.cli_commands.keys() {
            println!("{}", Theme::success(&format!("CLI agent `{agent}` has a command template")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_does_not_error_on_a_bare_default_config() {
        let config = AuroraConfig::default();
        run(&config).await.expect("doctor never fails outright");
        let _ = Policy::locked_down();
    }
}
