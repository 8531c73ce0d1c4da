//! Configuration types for the Aurora Pro runtime.
//!
//! All types are self-contained, with no dependency on other internal
//! `aurora-*` crates. Every struct implements [`Default`] with a
//! sensible production value, so a bare `[section]` header in the
//! config file produces a working configuration, and every field can
//! also be supplied purely from environment variables with no file at
//! all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the Aurora Pro runtime.
///
/// Built from the embedded defaults, then an optional TOML file, then
/// an environment-variable overlay — see [`crate::loader::load`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuroraConfig {
    /// Where persisted state lives on disk.
    pub paths: PathsSection,
    /// LLM provider credentials and endpoints.
    pub providers: ProvidersSection,
    /// Per-agent CLI command templates for the Action Executor's broker.
    pub agents: AgentsSection,
    /// Operator-facing HTTP surface bind address and admin key.
    pub server: ServerSection,
    /// Memory-tier cache budget.
    pub cache: CacheSection,
    /// Heartbeat Supervisor sampling cadence.
    pub heartbeat: HeartbeatSection,
    /// Timeout and retry budgets.
    pub timeouts: TimeoutsSection,
}

/// Filesystem layout, relative to a single data root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Root directory all other paths are resolved under.
    pub data_root: String,
    /// JSONL audit logs, one file per subsystem.
    pub logs_dir: String,
    /// Disk-tier cache directory.
    pub cache_dir: String,
    /// Policy file path (YAML).
    pub policy_file: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            data_root: "./aurora-data".to_string(),
            logs_dir: "logs".to_string(),
            cache_dir: "cache".to_string(),
            policy_file: "config/operator_enabled.yaml".to_string(),
        }
    }
}

impl PathsSection {
    /// Resolve `logs_dir` against `data_root`.
    #[must_use]
    pub fn logs_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_root).join(&self.logs_dir)
    }

    /// Resolve `cache_dir` against `data_root`.
    #[must_use]
    pub fn cache_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_root).join(&self.cache_dir)
    }

    /// Resolve `policy_file` against `data_root`.
    #[must_use]
    pub fn policy_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_root).join(&self.policy_file)
    }
}

/// One LLM provider's credential and endpoint overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEntry {
    /// API key. Prefer the environment-variable overlay over storing
    /// this in a file.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL override (used by self-hosted/`vLLM`-style providers).
    pub base_url: Option<String>,
    /// Model id to request, e.g. `"claude-opus-4"` instead of the
    /// family's default `"claude-sonnet-4-5"`. `None` means "use the
    /// family's default model".
    pub model: Option<String>,
}

/// LLM provider credentials, keyed by provider family
/// (`"anthropic"`, `"openai"`, `"google"`, `"vllm"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSection {
    /// Per-provider entries.
    #[serde(flatten)]
    pub entries: HashMap<String, ProviderEntry>,
}

/// Per-agent shell-split argv template for the CLI broker, e.g.
/// `CLAUDE_CLI_CMD="claude --print --dangerously-skip-permissions"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsSection {
    /// Agent tag (lowercased, e.g. `"claude"`, `"codex"`) to its
    /// command template.
    #[serde(flatten)]
    pub cli_commands: HashMap<String, String>,
}

/// The operator-facing HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address.
    pub bind: String,
    /// Bind port.
    pub port: u16,
    /// Admin key required on privileged endpoints. `None` disables
    /// admin-only routes rather than leaving them unauthenticated.
    #[serde(skip_serializing)]
    pub admin_key: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { bind: "127.0.0.1".to_string(), port: 8787, admin_key: None }
    }
}

/// Memory-tier cache sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Memory-tier budget in bytes.
    pub memory_budget_bytes: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { memory_budget_bytes: aurora_cache::DEFAULT_MEMORY_BUDGET_BYTES }
    }
}

/// Heartbeat Supervisor cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatSection {
    /// Seconds between heartbeat ticks.
    pub period_secs: u64,
}

impl Default for HeartbeatSection {
    fn default() -> Self {
        Self { period_secs: 60 }
    }
}

/// Timeout and retry budgets shared across subsystems.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsSection {
    /// Default CLI task timeout, seconds.
    pub cli_task_secs: u64,
    /// Maximum CLI task timeout an operator may request, seconds.
    pub cli_task_max_secs: u64,
    /// LLM provider call timeout, seconds.
    pub llm_call_secs: u64,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self { cli_task_secs: 120, cli_task_max_secs: 1800, llm_call_secs: 60 }
    }
}
