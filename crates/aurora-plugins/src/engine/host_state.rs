//! Shared state for a single plugin instance's host functions.
//!
//! Wrapped in [`extism::UserData`] and shared across every host function
//! call made by that instance.

use aurora_cache::ScopedKvStore;

/// State accessible to every host function call for one plugin instance.
pub struct HostState {
    /// The plugin's id, used in log lines and KV namespacing.
    pub plugin_id: String,
    /// Permissions declared in the plugin's manifest. Host functions check
    /// this before performing the operation they gate.
    pub permissions: Vec<String>,
    /// Plugin-scoped KV store (`plugin:{plugin_id}` namespace of the disk
    /// cache tier).
    pub kv: ScopedKvStore,
    /// Tokio runtime handle used to bridge the synchronous Extism host
    /// function calling convention back into async KV store calls.
    pub runtime_handle: tokio::runtime::Handle,
}

impl HostState {
    /// Whether this instance's manifest declared `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

impl std::fmt::Debug for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostState")
            .field("plugin_id", &self.plugin_id)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_cache::MemoryKvStore;
    use std::sync::Arc;

    fn state(permissions: Vec<String>) -> HostState {
        let store: Arc<dyn aurora_cache::KvStore> = Arc::new(MemoryKvStore::new());
        let kv = ScopedKvStore::new(store, "plugin:test").unwrap();
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        HostState {
            plugin_id: "test".to_string(),
            permissions,
            kv,
            runtime_handle: rt.handle().clone(),
        }
    }

    #[test]
    fn has_permission_checks_declared_list() {
        let state = state(vec!["kv".to_string()]);
        assert!(state.has_permission("kv"));
        assert!(!state.has_permission("http"));
    }

    #[test]
    fn debug_format_includes_plugin_id() {
        let state = state(vec![]);
        assert!(format!("{state:?}").contains("test"));
    }
}
