//! `aurora run` — boot every component and serve until interrupted.
//!
//! This is the ambient equivalent of the HTTP surface's process: the
//! same [`aurora_kernel::ControlPlane`] a hosted server would build is
//! constructed here, just driven by OS signals instead of `/control/*`
//! requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use aurora_audit::{AuditEvent, AuditRegistry};
use aurora_cache::{CacheManager, KvStore, SurrealKvStore};
use aurora_config::AuroraConfig;
use aurora_core::AgentTag;
use aurora_events::ReasoningStream;
use aurora_input::{EnigoBackend, InputQueue};
use aurora_kernel::{ControlPlane, Subsystem};
use aurora_plugins::{discover_manifests, watch, PluginChangeEvent, PluginLoader, PluginRegistry};
use aurora_policy::{Policy, PolicyError, PolicyGate};
use aurora_runtime::{ActionExecutor, AutonomousPlanner, LlmVerifier};
use aurora_telemetry::HeartbeatSupervisor;
use aurora_tools::{load_command_templates_from_env, CliTaskBroker};
use notify::RecommendedWatcher;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::commands::llm::build_router;
use crate::theme::Theme;

/// Persists [`aurora_llm::LlmRouter`] provider statistics across
/// restarts: loaded on [`Subsystem::start`], saved on
/// [`Subsystem::stop`], per the router's own documented
/// `with_stats_path` contract.
struct RouterSubsystem(Arc<aurora_llm::LlmRouter>);

#[async_trait]
impl Subsystem for RouterSubsystem {
    fn name(&self) -> &str {
        "llm_router"
    }

    async fn start(&self) -> Result<(), String> {
        self.0.load_stats().await;
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        self.0.save_stats().await.map_err(|err| err.to_string())
    }
}

/// Stops the Input Queue's single worker on shutdown.
struct InputQueueSubsystem(Arc<InputQueue>);

#[async_trait]
impl Subsystem for InputQueueSubsystem {
    fn name(&self) -> &str {
        "input_queue"
    }

    async fn start(&self) -> Result<(), String> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        self.0.stop();
        Ok(())
    }
}

/// Opens (and, on shutdown, flushes and closes) the disk-tier KV store
/// behind the three-tier [`CacheManager`].
struct CacheSubsystem {
    disk: Arc<SurrealKvStore>,
}

#[async_trait]
impl Subsystem for CacheSubsystem {
    fn name(&self) -> &str {
        "cache"
    }

    async fn start(&self) -> Result<(), String> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        self.disk.close().await.map_err(|err| err.to_string())
    }
}

/// No lifecycle of its own: the Action Executor dispatches Actions
/// on-demand and owns no background task or open resource, but it is
/// still registered so the Control Plane's metrics and restart pass
/// over it like every other component.
struct ExecutorSubsystem;

#[async_trait]
impl Subsystem for ExecutorSubsystem {
    fn name(&self) -> &str {
        "action_executor"
    }

    async fn start(&self) -> Result<(), String> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Same as [`ExecutorSubsystem`]: the Autonomous Planner only runs a
/// workflow on an explicit `run(goal)` call and persists terminal
/// workflows itself; it holds no background task to stop.
struct PlannerSubsystem;

#[async_trait]
impl Subsystem for PlannerSubsystem {
    fn name(&self) -> &str {
        "autonomous_planner"
    }

    async fn start(&self) -> Result<(), String> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Same as [`ExecutorSubsystem`]: the CLI Task Broker's per-agent
/// workers are spawned lazily on first submission and simply idle
/// between tasks; there is no explicit drain-and-stop to perform.
struct BrokerSubsystem;

#[async_trait]
impl Subsystem for BrokerSubsystem {
    fn name(&self) -> &str {
        "cli_task_broker"
    }

    async fn start(&self) -> Result<(), String> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Discovers and loads every plugin under the plugin directory on
/// start, hot-(re)loads and unloads them as the directory changes while
/// running, and unloads everything on stop.
struct PluginHostSubsystem {
    loader: Arc<PluginLoader>,
    registry: Arc<Mutex<PluginRegistry>>,
    plugins_dir: std::path::PathBuf,
    watch_task: Mutex<Option<(RecommendedWatcher, JoinHandle<()>)>>,
}

impl PluginHostSubsystem {
    async fn load_one(&self, manifest: &aurora_plugins::PluginManifest, dir: &std::path::Path) {
        match self.loader.load(manifest, dir).await {
            Ok(loaded) => {
                if let Err(err) = self.registry.lock().await.register(loaded) {
                    warn!(plugin = %manifest.name, %err, "failed to register loaded plugin");
                }
            },
            Err(aurora_plugins::PluginError::NotAuthorized(_)) => {},
            Err(err) => warn!(plugin = %manifest.name, %err, "failed to load plugin"),
        }
    }
}

#[async_trait]
impl Subsystem for PluginHostSubsystem {
    fn name(&self) -> &str {
        "plugin_host"
    }

    async fn start(&self) -> Result<(), String> {
        for (manifest, dir) in discover_manifests(&self.plugins_dir) {
            self.load_one(&manifest, &dir).await;
        }

        let (watcher, mut rx) = match watch(&self.plugins_dir) {
            Ok(pair) => pair,
            Err(err) => {
                warn!(%err, "plugin directory watcher failed to start, hot-reload disabled");
                return Ok(());
            },
        };

        let loader = Arc::clone(&self.loader);
        let registry = Arc::clone(&self.registry);
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    PluginChangeEvent::Changed(dir) => {
                        let Ok(manifest) = aurora_plugins::load_manifest(&dir.join("Plugin.toml")) else {
                            continue;
                        };
                        if registry.lock().await.get(&manifest.name).is_some() {
                            continue;
                        }
                        match loader.load(&manifest, &dir).await {
                            Ok(loaded) => {
                                if let Err(err) = registry.lock().await.register(loaded) {
                                    warn!(plugin = %manifest.name, %err, "failed to register hot-loaded plugin");
                                }
                            },
                            Err(aurora_plugins::PluginError::NotAuthorized(_)) => {},
                            Err(err) => warn!(plugin = %manifest.name, %err, "failed to hot-load plugin"),
                        }
                    },
                    PluginChangeEvent::Removed(dir) => {
                        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                            continue;
                        };
                        let mut registry = registry.lock().await;
                        if let Ok(plugin) = registry.unregister(name) {
                            if let Err(err) = loader.unload(&plugin).await {
                                warn!(plugin = %name, %err, "teardown failed while hot-unloading plugin");
                            }
                        }
                    },
                }
            }
        });

        *self.watch_task.lock().await = Some((watcher, handle));
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        if let Some((_watcher, handle)) = self.watch_task.lock().await.take() {
            handle.abort();
        }

        let mut registry = self.registry.lock().await;
        for name in registry.list().iter().map(ToString::to_string).collect::<Vec<_>>() {
            if let Ok(plugin) = registry.unregister(&name) {
                if let Err(err) = self.loader.unload(&plugin).await {
                    warn!(plugin = %name, %err, "teardown failed while unloading plugin on shutdown");
                }
            }
        }
        Ok(())
    }
}

/// Every long-lived collaborator the process holds for the lifetime of
/// `aurora run`.
struct Runtime {
    control_plane: Arc<ControlPlane>,
    /// Kept alive for the process lifetime; the file watcher behind
    /// [`PolicyGate::watch`] stops as soon as this is dropped.
    _policy_gate: Arc<PolicyGate>,
}

impl Runtime {
    async fn build(config: &AuroraConfig) -> Result<Self> {
        let logs_dir = config.paths.logs_path();
        let audit = AuditRegistry::new(&logs_dir);
        let kernel_audit = audit.sink("kernel").await?;
        let policy_audit = audit.sink("policy").await?;

        let policy_path = config.paths.policy_path();
        let policy_gate = if policy_path.exists() {
            match PolicyGate::watch(&policy_path) {
                Ok(gate) => Arc::new(gate),
                Err(err) => {
                    let reason = match &err {
                        PolicyError::Parse { .. } => "policy file failed to parse",
                        _ => "policy file could not be opened",
                    };
                    println!(
                        "{}",
                        Theme::warning(&format!(
                            "{reason} ({err}), starting locked down"
                        ))
                    );
                    policy_audit.emit(
                        AuditEvent::system("policy.parse_failed", format!("{err}"))
                            .with_meta("policy_path", policy_path.display().to_string()),
                    );
                    Arc::new(PolicyGate::from_policy(Policy::locked_down()))
                },
            }
        } else {
            println!(
                "{}",
                Theme::warning(&format!("no policy file at {}, starting locked down", policy_path.display()))
            );
            policy_audit.emit(
                AuditEvent::system("policy.parse_failed", "no policy file present")
                    .with_meta("policy_path", policy_path.display().to_string()),
            );
            Arc::new(PolicyGate::from_policy(Policy::locked_down()))
        };

        let cache_path = config.paths.cache_path();
        std::fs::create_dir_all(&cache_path)?;
        let disk = Arc::new(SurrealKvStore::open(&cache_path).map_err(|err| anyhow::anyhow!(err))?);
        let cache_disk: Arc<dyn KvStore> = disk.clone();
        let _cache_manager = Arc::new(
            CacheManager::with_memory_budget(Arc::clone(&cache_disk), config.cache.memory_budget_bytes),
        );

        let reasoning = Arc::new(ReasoningStream::new());
        let heartbeat_sink = audit.sink("heartbeat").await?;
        let recovery_sink = audit.sink("heartbeat_recovery").await?;
        let heartbeat = Arc::new(
            HeartbeatSupervisor::new(Vec::new(), heartbeat_sink, recovery_sink)
                .with_period(Duration::from_secs(config.heartbeat.period_secs)),
        );

        let control_plane = Arc::new(ControlPlane::new(Arc::clone(&reasoning), heartbeat, kernel_audit));
        control_plane.register(Arc::new(CacheSubsystem { disk }));

        let router = Arc::new(build_router(config).with_stats_path(logs_dir.join("provider_stats.json")));
        control_plane.register(Arc::new(RouterSubsystem(Arc::clone(&router))));

        let input_audit = audit.sink("input").await?;
        let backend = Arc::new(EnigoBackend::new((1920, 1080)));
        let input_queue = Arc::new(InputQueue::new(backend, input_audit));
        control_plane.register(Arc::new(InputQueueSubsystem(Arc::clone(&input_queue))));

        let executor_audit = audit.sink("executor").await?;
        let verifier = Arc::new(LlmVerifier::new(Arc::clone(&router)));
        let executor = Arc::new(ActionExecutor::new(
            Arc::clone(&policy_gate),
            Arc::clone(&input_queue),
            verifier,
            executor_audit,
            logs_dir.join("screenshots"),
        ));
        control_plane.register(Arc::new(ExecutorSubsystem));

        let plugins_dir = std::path::PathBuf::from(&config.paths.data_root).join("plugins");
        let plugin_loader = Arc::new(PluginLoader::new(Arc::clone(&policy_gate), cache_disk));
        control_plane.register(Arc::new(PluginHostSubsystem {
            loader: plugin_loader,
            registry: Arc::new(Mutex::new(PluginRegistry::new())),
            plugins_dir,
            watch_task: Mutex::new(None),
        }));

        let _planner = Arc::new(AutonomousPlanner::new(
            Arc::clone(&router),
            Arc::clone(&executor),
            Arc::clone(&reasoning),
            logs_dir.join("workflows"),
        ));
        control_plane.register(Arc::new(PlannerSubsystem));

        let agent_tags: Vec<AgentTag> =
            config.agents.cli_commands.keys().map(|name| AgentTag::from(name.as_str())).collect();
        let mut command_templates: HashMap<AgentTag, String> = config
            .agents
            .cli_commands
            .iter()
            .map(|(name, template)| (AgentTag::from(name.as_str()), template.clone()))
            .collect();
        command_templates.extend(load_command_templates_from_env(&agent_tags));
        let broker_audit = audit.sink("cli_task_broker").await?;
        let _broker = CliTaskBroker::with_default_timeout_sec(
            command_templates,
            broker_audit,
            logs_dir.join("cli_tasks"),
            config.timeouts.cli_task_secs,
        );
        control_plane.register(Arc::new(BrokerSubsystem));

        info!("control plane constructed");
        Ok(Self { control_plane, _policy_gate: policy_gate })
    }
}

/// Boot the Policy Gate, Audit Sink registry, Cache Manager, Heartbeat
/// Supervisor, LLM Router, Action Executor, Input Queue, Plugin Host,
/// Autonomous Planner, and CLI Task Broker, register them with a
/// [`ControlPlane`], start everything, and block until the operator
/// interrupts the process.
pub async fn run(config: AuroraConfig) -> Result<()> {
    let runtime = Runtime::build(&config).await?;
    println!("{}", Theme::header("Aurora Pro — starting"));

    runtime.control_plane.start_all().await.map_err(|err| anyhow::anyhow!(err))?;
    Arc::clone(&runtime.control_plane).spawn_metrics_sampler(Duration::from_secs(1));
    println!("{}", Theme::success("all subsystems started, awaiting Ctrl-C (SIGHUP restarts)"));

    wait_for_signal(&runtime.control_plane).await;

    println!("{}", Theme::info("shutting down"));
    runtime.control_plane.emergency_stop("operator interrupt").await.map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}

async fn wait_for_signal(control_plane: &Arc<ControlPlane>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let Ok(mut sighup) = signal(SignalKind::hangup()) else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => return,
                _ = sighup.recv() => {
                    println!("{}", Theme::info("SIGHUP received, restarting subsystems"));
                    if let Err(err) = control_plane.restart().await {
                        println!("{}", Theme::error(&format!("restart failed: {err}")));
                    }
                }
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runtime_builds_starts_and_stops_over_a_fresh_data_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AuroraConfig::default();
        config.paths.data_root = dir.path().display().to_string();

        let runtime = Runtime::build(&config).await.unwrap();
        runtime.control_plane.start_all().await.unwrap();
        runtime.control_plane.emergency_stop("test").await.unwrap();
    }

    #[tokio::test]
    async fn malformed_policy_file_falls_back_to_locked_down_instead_of_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AuroraConfig::default();
        config.paths.data_root = dir.path().display().to_string();

        let policy_path = config.paths.policy_path();
        std::fs::create_dir_all(policy_path.parent().unwrap()).unwrap();
        std::fs::write(&policy_path, "not: [valid, policy, yaml").unwrap();

        let runtime = Runtime::build(&config).await.unwrap();
        assert!(runtime._policy_gate.authorize("control_mouse_keyboard").is_err());
        runtime.control_plane.start_all().await.unwrap();
        runtime.control_plane.emergency_stop("test").await.unwrap();

        let policy_log = std::fs::read_to_string(config.paths.logs_path().join("policy.jsonl")).unwrap();
        assert!(policy_log.contains("policy.parse_failed"));
    }
}
