//! Plugin lifecycle: load, authorize, run setup/teardown, unload.

use std::path::Path;
use std::sync::Arc;

use aurora_cache::{KvStore, ScopedKvStore};
use aurora_policy::PolicyGate;
use tracing::info;

use crate::engine::PluginEngine;
use crate::error::{PluginError, PluginResult};
use crate::manifest::PluginManifest;
use crate::registry::LoadedPlugin;

/// The `PolicyGate` capability a plugin requires the operator to have
/// enabled before any plugin can be loaded.
pub const PLUGIN_SYSTEM_CAPABILITY: &str = "plugin_system";

/// Loads and unloads plugins against a policy gate and a shared disk KV
/// store.
pub struct PluginLoader {
    gate: Arc<PolicyGate>,
    kv_root: Arc<dyn KvStore>,
}

impl PluginLoader {
    /// Build a loader authorizing against `gate` and persisting
    /// plugin-scoped KV state through `kv_root`.
    #[must_use]
    pub fn new(gate: Arc<PolicyGate>, kv_root: Arc<dyn KvStore>) -> Self {
        Self { gate, kv_root }
    }

    /// Parse, authorize, instantiate, and run the setup hook of the
    /// plugin described by `manifest` in `plugin_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotAuthorized`] if the policy gate does not
    /// authorize [`PLUGIN_SYSTEM_CAPABILITY`], or a sandbox/call error if
    /// instantiation or the setup hook fails.
    pub async fn load(
        &self,
        manifest: &PluginManifest,
        plugin_dir: &Path,
    ) -> PluginResult<LoadedPlugin> {
        self.gate
            .authorize(PLUGIN_SYSTEM_CAPABILITY)
            .map_err(|err| PluginError::NotAuthorized(err.to_string()))?;

        let namespace = format!("plugin:{}", manifest.name);
        let kv = ScopedKvStore::new(Arc::clone(&self.kv_root), namespace).map_err(|err| {
            PluginError::SandboxBuild {
                plugin: manifest.name.clone(),
                message: err.to_string(),
            }
        })?;

        let engine = PluginEngine::load(manifest, plugin_dir, kv)?;
        engine.setup().await?;

        info!(plugin = %manifest.name, "loaded plugin");

        Ok(LoadedPlugin {
            manifest: manifest.clone(),
            dir: plugin_dir.to_path_buf(),
            engine,
        })
    }

    /// Run the teardown hook of an already-loaded plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if the teardown hook call itself fails. The
    /// caller drops `plugin` afterward regardless, releasing the WASM
    /// instance.
    pub async fn unload(&self, plugin: &LoadedPlugin) -> PluginResult<()> {
        info!(plugin = %plugin.manifest.name, "unloading plugin");
        plugin.engine.teardown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_policy::Policy;

    fn locked_down_loader() -> PluginLoader {
        let gate = Arc::new(PolicyGate::from_policy(Policy::locked_down()));
        let kv: Arc<dyn KvStore> = Arc::new(aurora_cache::MemoryKvStore::new());
        PluginLoader::new(gate, kv)
    }

    #[tokio::test]
    async fn load_is_denied_without_plugin_system_authorization() {
        let loader = locked_down_loader();
        let manifest = PluginManifest {
            name: "demo".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            entry: "demo.wasm".into(),
            permissions: vec![],
            setup_fn: "setup".to_string(),
            teardown_fn: "teardown".to_string(),
            cpu_time_ms: 5_000,
            memory_max_pages: 1024,
        };
        let err = loader
            .load(&manifest, Path::new("/nonexistent"))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::NotAuthorized(_)));
    }
}
