//! Routes a named plugin call to its registry entry.
//!
//! The dispatcher is the single entry point callers outside this crate
//! use to invoke a loaded plugin; it exists so call sites don't need to
//! hold the registry lock themselves across a WASM call.

use std::sync::Arc;

use aurora_audit::{AuditEvent, AuditSink};
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::{PluginError, PluginResult};
use crate::registry::PluginRegistry;

/// Dispatches calls into the plugin registry and audits the outcome.
pub struct PluginDispatcher {
    registry: Arc<RwLock<PluginRegistry>>,
    audit: AuditSink,
}

impl PluginDispatcher {
    /// Build a dispatcher over `registry`, auditing through `audit`.
    #[must_use]
    pub fn new(registry: Arc<RwLock<PluginRegistry>>, audit: AuditSink) -> Self {
        Self { registry, audit }
    }

    /// Call `function` on the plugin `plugin_id` with `input`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] if no plugin with that id is
    /// registered, or the error `PluginEngine::call` produced (resource
    /// limit exceeded, or a guest-side failure).
    pub async fn dispatch(
        &self,
        plugin_id: &str,
        function: &str,
        input: &[u8],
    ) -> PluginResult<Vec<u8>> {
        let registry = self.registry.read().await;
        let plugin = registry
            .get(plugin_id)
            .ok_or_else(|| PluginError::NotFound(plugin_id.to_string()))?;

        let result = plugin.engine.call(function, input).await;
        match &result {
            Ok(_) => {
                self.audit.emit(AuditEvent::system(
                    "plugin.call.completed",
                    format!("{plugin_id}::{function} completed"),
                ));
            }
            Err(err) => {
                warn!(plugin = plugin_id, function, %err, "plugin call failed");
                self.audit.emit(AuditEvent::system(
                    "plugin.call.failed",
                    format!("{plugin_id}::{function} failed: {err}"),
                ));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_to_unregistered_plugin_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(RwLock::new(PluginRegistry::new()));
        let audit = AuditSink::open(dir.path(), "plugins").await.unwrap();
        let dispatcher = PluginDispatcher::new(registry, audit);

        let err = dispatcher
            .dispatch("ghost", "run", b"{}")
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::NotFound(id) if id == "ghost"));
    }
}
