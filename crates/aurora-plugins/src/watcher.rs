//! Directory watcher for hot-loading and hot-unloading plugins.
//!
//! Watches the plugin directory for `Plugin.toml` files appearing or
//! disappearing and reports the change over a channel; the caller
//! decides whether to call [`crate::loader::PluginLoader::load`] or
//! unregister the affected plugin. This crate does not act on the
//! events itself so the policy-gate check in `PluginLoader::load` always
//! runs on the same task that owns the registry.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

use crate::discovery::MANIFEST_FILE_NAME;
use crate::error::{PluginError, PluginResult};

/// A plugin-directory change detected by the watcher.
#[derive(Debug, Clone)]
pub enum PluginChangeEvent {
    /// A new or modified `Plugin.toml` was seen under this plugin
    /// directory.
    Changed(PathBuf),
    /// A plugin directory (or its manifest) was removed.
    Removed(PathBuf),
}

/// Start watching `plugins_dir` for manifest changes.
///
/// Returns the live [`RecommendedWatcher`] (drop it to stop watching) and
/// a receiver of [`PluginChangeEvent`]s.
///
/// # Errors
///
/// Returns [`PluginError::Watch`] if the underlying filesystem watcher
/// cannot be started.
pub fn watch(
    plugins_dir: &Path,
) -> PluginResult<(RecommendedWatcher, mpsc::UnboundedReceiver<PluginChangeEvent>)> {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else {
            return;
        };
        for path in &event.paths {
            if let Some(change) = classify(&event.kind, path) {
                if tx.send(change).is_err() {
                    return;
                }
            }
        }
    })
    .map_err(|err| PluginError::Watch(err.to_string()))?;

    watcher
        .watch(plugins_dir, RecursiveMode::Recursive)
        .map_err(|err| PluginError::Watch(err.to_string()))?;

    Ok((watcher, rx))
}

fn classify(kind: &EventKind, path: &Path) -> Option<PluginChangeEvent> {
    let is_manifest = path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILE_NAME);
    if !is_manifest {
        return None;
    }
    let plugin_dir = path.parent()?.to_path_buf();

    if kind.is_create() || kind.is_modify() {
        Some(PluginChangeEvent::Changed(plugin_dir))
    } else if kind.is_remove() {
        Some(PluginChangeEvent::Removed(plugin_dir))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn classify_ignores_non_manifest_files() {
        let path = Path::new("/plugins/demo/demo.wasm");
        assert!(classify(&EventKind::Create(CreateKind::File), path).is_none());
    }

    #[test]
    fn classify_reports_changed_on_create_and_modify() {
        let path = Path::new("/plugins/demo/Plugin.toml");
        assert!(matches!(
            classify(&EventKind::Create(CreateKind::File), path),
            Some(PluginChangeEvent::Changed(_))
        ));
        assert!(matches!(
            classify(&EventKind::Modify(ModifyKind::Any), path),
            Some(PluginChangeEvent::Changed(_))
        ));
    }

    #[test]
    fn classify_reports_removed_on_delete() {
        let path = Path::new("/plugins/demo/Plugin.toml");
        assert!(matches!(
            classify(&EventKind::Remove(RemoveKind::File), path),
            Some(PluginChangeEvent::Removed(_))
        ));
    }

    #[test]
    fn watch_of_missing_directory_errors() {
        let err = watch(Path::new("/nonexistent/plugins/path")).unwrap_err();
        assert!(matches!(err, PluginError::Watch(_)));
    }
}
