//! `aurora init` — scaffold a fresh data root.

use std::path::PathBuf;

use anyhow::{Context, Result};
use aurora_policy::Policy;

use crate::theme::Theme;

const DEFAULT_AURORA_TOML: &str = r#"# Aurora Pro configuration.
# Every field may also be set via environment variable; see the README.

[paths]
# data_root = "./aurora-data"

[server]
bind = "127.0.0.1"
port = 8787

[heartbeat]
period_secs = 60

[timeouts]
cli_task_secs = 120
cli_task_max_secs = 1800
llm_call_secs = 60

# Uncomment the families you have credentials for. Each section's
# `model` defaults to the first value listed in its comment; set
# `model` explicitly to pick one of the others.

# [providers.anthropic]
# # model = "claude-sonnet-4-5"  # or "claude-opus-4"

# [providers.openai]
# # model = "gpt-4-turbo"  # or "gpt-4"

# [providers.google]
# # model = "gemini-pro"  # or "gemini-flash"

# [providers.vllm]
# base_url = "http://localhost:11434"
# # model = "qwen2.5"  # or "llama3.2", "codellama"
"#;

/// Create `data_root` (default `./aurora-data`), its `logs/`, `cache/`,
/// and `config/` subdirectories, a locked-down policy file, and a
/// commented `aurora.toml` template in the current directory if one
/// does not already exist.
pub fn run(data_root: Option<PathBuf>) -> Result<()> {
    let data_root = data_root.unwrap_or_else(|| PathBuf::from("./aurora-data"));

    for sub in ["logs", "cache", "config"] {
        let dir = data_root.join(sub);
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    println!("{}", Theme::success(&format!("created data root at {}", data_root.display())));

    let policy_path = data_root.join("config/operator_enabled.yaml");
    if policy_path.exists() {
        println!("{}", Theme::info(&format!("policy file already exists at {}", policy_path.display())));
    } else {
        let policy = Policy::locked_down();
        let yaml = serde_yaml::to_string(&policy).context("serializing default policy")?;
        std::fs::write(&policy_path, yaml).with_context(|| format!("writing {}", policy_path.display()))?;
        println!("{}", Theme::success(&format!("wrote locked-down policy file to {}", policy_path.display())));
    }

    let toml_path = PathBuf::from("./aurora.toml");
    if toml_path.exists() {
        println!("{}", Theme::info("aurora.toml already exists, leaving it in place"));
    } else {
        std::fs::write(&toml_path, DEFAULT_AURORA_TOML).context("writing aurora.toml")?;
        println!("{}", Theme::success("wrote a default aurora.toml"));
    }

    println!(
        "{}",
        Theme::info("edit config/operator_enabled.yaml to enable capabilities, then run `aurora doctor`")
    );
    Ok(())
}
