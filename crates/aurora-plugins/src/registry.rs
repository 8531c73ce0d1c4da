//! Registry of loaded plugins.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::info;

use crate::engine::PluginEngine;
use crate::error::{PluginError, PluginResult};
use crate::manifest::PluginManifest;

/// A plugin currently loaded into the process.
pub struct LoadedPlugin {
    /// The manifest this plugin was loaded from.
    pub manifest: PluginManifest,
    /// The directory the manifest and entry module live in.
    pub dir: PathBuf,
    /// The running sandbox.
    pub engine: PluginEngine,
}

/// Registry of loaded plugins, keyed by manifest name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, LoadedPlugin>,
}

impl PluginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::AlreadyRegistered`] if a plugin with the
    /// same id is already registered.
    pub fn register(&mut self, plugin: LoadedPlugin) -> PluginResult<()> {
        let id = plugin.manifest.name.clone();
        if self.plugins.contains_key(&id) {
            return Err(PluginError::AlreadyRegistered(id));
        }
        info!(plugin = %id, version = %plugin.manifest.version, "registered plugin");
        self.plugins.insert(id, plugin);
        Ok(())
    }

    /// Remove and return a plugin by id.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] if no plugin with the given id is
    /// registered.
    pub fn unregister(&mut self, id: &str) -> PluginResult<LoadedPlugin> {
        let plugin = self
            .plugins
            .remove(id)
            .ok_or_else(|| PluginError::NotFound(id.to_string()))?;
        info!(plugin = %id, "unregistered plugin");
        Ok(plugin)
    }

    /// Look up a loaded plugin by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LoadedPlugin> {
        self.plugins.get(id)
    }

    /// List the ids of every registered plugin.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry has no registered plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `LoadedPlugin` requires a real Extism instance to construct, so
    // registry behavior is exercised indirectly through `PluginLoader`'s
    // tests. These cases cover the parts that don't need an instance.

    #[test]
    fn new_registry_is_empty() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn unregister_missing_plugin_reports_not_found() {
        let mut registry = PluginRegistry::new();
        let err = registry.unregister("ghost").unwrap_err();
        assert!(matches!(err, PluginError::NotFound(id) if id == "ghost"));
    }

    #[test]
    fn get_missing_plugin_returns_none() {
        let registry = PluginRegistry::new();
        assert!(registry.get("ghost").is_none());
    }
}
