//! Plugin manifest types.
//!
//! A plugin manifest (`Plugin.toml`) describes a bundle's identity, entry
//! module, declared permissions, and per-call resource caps. Manifests are
//! loaded from disk during discovery and are immutable once a plugin is
//! loaded: changing permissions requires a reload.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default CPU-time cap applied to a single plugin call, in milliseconds.
pub const DEFAULT_CPU_TIME_MS: u64 = 5_000;

/// Default memory cap applied to a plugin instance, in 64 KiB WASM pages
/// (1024 pages = 64 MiB).
pub const DEFAULT_MEMORY_MAX_PAGES: u32 = 1024;

/// Default exported function Extism calls after instantiation, if present.
pub const DEFAULT_SETUP_FN: &str = "setup";

/// Default exported function Extism calls before the instance is dropped,
/// if present.
pub const DEFAULT_TEARDOWN_FN: &str = "teardown";

/// A plugin manifest loaded from `Plugin.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// The plugin's unique name, also used as its registry id.
    pub name: String,
    /// The semantic version of the plugin.
    pub version: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Path to the compiled WASM entry module, relative to the manifest
    /// unless absolute.
    pub entry: PathBuf,
    /// Capabilities this plugin declares it needs (`kv`, `http`, ...).
    /// Enforcement happens at the capability level when the plugin invokes
    /// a core API; this list only documents intent and lets the loader
    /// reject a call for a permission the manifest never declared.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Exported function called once after instantiation, if present in
    /// the module. Defaults to [`DEFAULT_SETUP_FN`].
    #[serde(default = "default_setup_fn")]
    pub setup_fn: String,
    /// Exported function called once before the instance is dropped, if
    /// present in the module. Defaults to [`DEFAULT_TEARDOWN_FN`].
    #[serde(default = "default_teardown_fn")]
    pub teardown_fn: String,
    /// Per-call CPU-time cap, in milliseconds. Best-effort: enforced as a
    /// wall-clock deadline around each call, since cooperative WASM
    /// execution has no native CPU-time accounting on every platform.
    #[serde(default = "default_cpu_time_ms")]
    pub cpu_time_ms: u64,
    /// Memory cap for the plugin instance, in 64 KiB WASM pages.
    #[serde(default = "default_memory_max_pages")]
    pub memory_max_pages: u32,
}

fn default_setup_fn() -> String {
    DEFAULT_SETUP_FN.to_string()
}

fn default_teardown_fn() -> String {
    DEFAULT_TEARDOWN_FN.to_string()
}

fn default_cpu_time_ms() -> u64 {
    DEFAULT_CPU_TIME_MS
}

fn default_memory_max_pages() -> u32 {
    DEFAULT_MEMORY_MAX_PAGES
}

impl PluginManifest {
    /// Whether this manifest declares the given permission string.
    #[must_use]
    pub fn declares(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Resolve the entry module path against `plugin_dir` if `entry` is
    /// relative.
    #[must_use]
    pub fn entry_path(&self, plugin_dir: &std::path::Path) -> PathBuf {
        if self.entry.is_absolute() {
            self.entry.clone()
        } else {
            plugin_dir.join(&self.entry)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
        name = "demo"
        version = "0.1.0"
        entry = "demo.wasm"
        permissions = ["kv"]
        "#
    }

    #[test]
    fn parses_minimal_manifest_with_defaults() {
        let manifest: PluginManifest = toml::from_str(sample_toml()).unwrap();
        assert_eq!(manifest.name, "demo");
        assert_eq!(manifest.setup_fn, DEFAULT_SETUP_FN);
        assert_eq!(manifest.teardown_fn, DEFAULT_TEARDOWN_FN);
        assert_eq!(manifest.cpu_time_ms, DEFAULT_CPU_TIME_MS);
        assert_eq!(manifest.memory_max_pages, DEFAULT_MEMORY_MAX_PAGES);
    }

    #[test]
    fn declares_checks_permission_list() {
        let manifest: PluginManifest = toml::from_str(sample_toml()).unwrap();
        assert!(manifest.declares("kv"));
        assert!(!manifest.declares("http"));
    }

    #[test]
    fn entry_path_resolves_relative_against_plugin_dir() {
        let manifest: PluginManifest = toml::from_str(sample_toml()).unwrap();
        let dir = std::path::Path::new("/plugins/demo");
        assert_eq!(manifest.entry_path(dir), dir.join("demo.wasm"));
    }

    #[test]
    fn entry_path_preserves_absolute_entry() {
        let mut manifest: PluginManifest = toml::from_str(sample_toml()).unwrap();
        manifest.entry = PathBuf::from("/abs/demo.wasm");
        let dir = std::path::Path::new("/plugins/demo");
        assert_eq!(manifest.entry_path(dir), PathBuf::from("/abs/demo.wasm"));
    }
}
