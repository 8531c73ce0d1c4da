//! The WASM sandbox a single loaded plugin runs in.
//!
//! Wraps an [`extism::Plugin`] instance: build-time memory cap, per-call
//! wall-clock cap (see [`crate::security`]), and the host function
//! surface in [`host`].

pub mod host;
pub mod host_state;
mod util;

use std::path::Path;
use std::sync::{Arc, Mutex};

use extism::{Manifest as ExtismManifest, PluginBuilder, UserData, Wasm};

use crate::error::{PluginError, PluginResult};
use crate::manifest::PluginManifest;
use crate::security::{self, ResourceLimits};
use host_state::HostState;

/// A single loaded plugin's WASM sandbox.
pub struct PluginEngine {
    plugin_id: String,
    manifest: PluginManifest,
    limits: ResourceLimits,
    instance: Arc<Mutex<extism::Plugin>>,
}

impl PluginEngine {
    /// Instantiate the sandbox for `manifest`, reading its entry module
    /// from `plugin_dir` and scoping its KV access to `kv`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::SandboxBuild`] if the entry module cannot be
    /// read or the Extism plugin fails to build.
    pub fn load(
        manifest: &PluginManifest,
        plugin_dir: &Path,
        kv: aurora_cache::ScopedKvStore,
    ) -> PluginResult<Self> {
        let entry_path = manifest.entry_path(plugin_dir);
        let limits = ResourceLimits::from_manifest(manifest);
        let plugin_id = manifest.name.clone();
        let permissions = manifest.permissions.clone();

        let instance = tokio::task::block_in_place(|| {
            let wasm_bytes =
                std::fs::read(&entry_path).map_err(|err| PluginError::SandboxBuild {
                    plugin: plugin_id.clone(),
                    message: format!("failed to read {}: {err}", entry_path.display()),
                })?;

            let host_state = HostState {
                plugin_id: plugin_id.clone(),
                permissions,
                kv,
                runtime_handle: tokio::runtime::Handle::current(),
            };

            let extism_manifest = ExtismManifest::new([Wasm::data(wasm_bytes)])
                .with_timeout(limits.cpu_time)
                .with_memory_max(limits.memory_max_pages);

            let builder = PluginBuilder::new(extism_manifest).with_wasi(true);
            let builder = host::register_host_functions(builder, UserData::new(host_state));

            builder
                .build()
                .map_err(|err| PluginError::SandboxBuild {
                    plugin: plugin_id.clone(),
                    message: err.to_string(),
                })
        })?;

        Ok(Self {
            plugin_id,
            manifest: manifest.clone(),
            limits,
            instance: Arc::new(Mutex::new(instance)),
        })
    }

    /// Call `function`'s manifest-declared setup hook, if the module
    /// exports it. A module that doesn't export it is not an error: the
    /// hook is optional.
    pub async fn setup(&self) -> PluginResult<()> {
        self.call_optional(&self.manifest.setup_fn.clone(), &[]).await
    }

    /// Call the manifest-declared teardown hook, if the module exports
    /// it.
    pub async fn teardown(&self) -> PluginResult<()> {
        self.call_optional(&self.manifest.teardown_fn.clone(), &[])
            .await
    }

    /// Call an exported `function` with `input`, inside a per-call
    /// resource-limit scope.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ResourceLimitExceeded`] if the call does not
    /// complete within the manifest's CPU-time cap, or
    /// [`PluginError::CallFailed`] if the guest call itself errors.
    pub async fn call(&self, function: &str, input: &[u8]) -> PluginResult<Vec<u8>> {
        let plugin_id = self.plugin_id.clone();
        let function = function.to_string();
        let input = input.to_vec();
        let instance = Arc::clone(&self.instance);

        #[cfg(unix)]
        security::apply_soft_cpu_limit(self.limits.cpu_time);

        security::with_resource_scope(self.limits, &plugin_id, &function, async move {
            tokio::task::block_in_place(|| {
                let mut guard = instance.lock().map_err(|_| PluginError::CallFailed {
                    plugin: plugin_id.clone(),
                    function: function.clone(),
                    message: "plugin instance lock poisoned".to_string(),
                })?;
                guard
                    .call::<&[u8], Vec<u8>>(&function, &input)
                    .map_err(|err| PluginError::CallFailed {
                        plugin: plugin_id.clone(),
                        function: function.clone(),
                        message: err.to_string(),
                    })
            })
        })
        .await
    }

    async fn call_optional(&self, function: &str, input: &[u8]) -> PluginResult<()> {
        let exists = {
            let guard = self
                .instance
                .lock()
                .map_err(|_| PluginError::CallFailed {
                    plugin: self.plugin_id.clone(),
                    function: function.to_string(),
                    message: "plugin instance lock poisoned".to_string(),
                })?;
            guard.function_exists(function)
        };
        if !exists {
            return Ok(());
        }
        self.call(function, input).await.map(|_| ())
    }
}
