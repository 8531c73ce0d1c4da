//! `aurora plugin` — inspect and smoke-test WASM plugins.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use aurora_audit::{AuditEvent, AuditSink};
use aurora_cache::{KvStore, MemoryKvStore};
use aurora_config::AuroraConfig;
use aurora_plugins::{discover_manifests, PluginLoader};
use aurora_policy::PolicyGate;
use clap::Subcommand;

use crate::theme::Theme;

/// `aurora plugin <command>`.
#[derive(Subcommand)]
pub enum PluginCommand {
    /// List plugin manifests found under the data root's `plugins/`
    /// directory.
    List,
    /// Print one plugin's manifest fields.
    Info {
        /// Plugin name (must match `Plugin.toml`'s `name` field).
        name: String,
    },
    /// Authorize, load, run `setup`, then immediately `teardown` and
    /// unload — a smoke test that the manifest and WASM module are
    /// valid and the policy gate authorizes `plugin_system`.
    Load {
        /// Plugin name (must match `Plugin.toml`'s `name` field).
        name: String,
    },
}

fn plugins_dir(config: &AuroraConfig) -> PathBuf {
    PathBuf::from(&config.paths.data_root).join("plugins")
}

/// Run a [`PluginCommand`] against the plugin directory named in
/// `config`.
pub async fn dispatch(config: &AuroraConfig, command: PluginCommand) -> Result<()> {
    let dir = plugins_dir(config);
    match command {
        PluginCommand::List => list(&dir),
        PluginCommand::Info { name } => info(&dir, &name),
        PluginCommand::Load { name } => load(config, &dir, &name).await,
    }
}

fn find(dir: &std::path::Path, name: &str) -> Result<(aurora_plugins::PluginManifest, PathBuf)> {
    discover_manifests(dir)
        .into_iter()
        .find(|(manifest, _)| manifest.name == name)
        .with_context(|| format!("no plugin named `{name}` under {}", dir.display()))
}

fn list(dir: &std::path::Path) -> Result<()> {
    let manifests = discover_manifests(dir);
    if manifests.is_empty() {
        println!("{}", Theme::info(&format!("no plugins found under {}", dir.display())));
        return Ok(());
    }
    for (manifest, path) in manifests {
        println!("{} {} ({})", manifest.name, manifest.version, path.display());
    }
    Ok(())
}

fn info(dir: &std::path::Path, name: &str) -> Result<()> {
    let (manifest, path) = find(dir, name)?;
    println!("{}", Theme::header(&manifest.name));
    println!("version:     {}", manifest.version);
    println!("description: {}", manifest.description.as_deref().unwrap_or("(none)"));
    println!("entry:       {}", manifest.entry.display());
    println!("permissions: {}", manifest.permissions.join(", "));
    println!("cpu_time_ms: {}", manifest.cpu_time_ms);
    println!("memory_max_pages: {}", manifest.memory_max_pages);
    println!("directory:   {}", path.display());
    Ok(())
}

async fn load(config: &AuroraConfig, dir: &std::path::Path, name: &str) -> Result<()> {
    let (manifest, plugin_dir) = find(dir, name)?;

    let policy_path = config.paths.policy_path();
    let policy_audit = AuditSink::open(config.paths.logs_path(), "policy").await?;
    let gate = Arc::new(PolicyGate::load(&policy_path).unwrap_or_else(|err| {
        policy_audit.emit(
            AuditEvent::system("policy.parse_failed", format!("{err}"))
                .with_meta("policy_path", policy_path.display().to_string()),
        );
        PolicyGate::from_policy(aurora_policy::Policy::locked_down())
    }));
    // A one-shot smoke test does not need the plugin's KV state to
    // survive the invocation, so an in-memory store is enough here; a
    // long-running `aurora run` process wires a disk-backed one.
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let loader = PluginLoader::new(gate, kv);

    let loaded = loader.load(&manifest, &plugin_dir).await?;
    println!("{}", Theme::success(&format!("loaded `{name}` and ran setup")));
    loader.unload(&loaded).await?;
    println!("{}", Theme::success(&format!("ran teardown and unloaded `{name}`")));
    Ok(())
}
