//! Plugin manifest discovery from a directory.
//!
//! Scans a plugin directory for subdirectories containing a `Plugin.toml`,
//! so the plugin host can be pointed at `<data_root>/plugins` and pick up
//! every bundle dropped there.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};
use crate::manifest::PluginManifest;

/// Standard plugin manifest file name.
pub const MANIFEST_FILE_NAME: &str = "Plugin.toml";

/// Discover every plugin manifest under `dir`.
///
/// Each immediate subdirectory containing a `Plugin.toml` is treated as
/// one plugin bundle. A manifest that fails to parse is logged as a
/// warning and skipped rather than aborting discovery for the rest of
/// the directory. Returns `(manifest, plugin_dir)` pairs.
pub fn discover_manifests(dir: &Path) -> Vec<(PluginManifest, PathBuf)> {
    let mut found = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), %err, "failed to read plugin directory");
            return found;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let manifest_path = path.join(MANIFEST_FILE_NAME);
        if !manifest_path.exists() {
            continue;
        }
        match load_manifest(&manifest_path) {
            Ok(manifest) => {
                debug!(
                    path = %manifest_path.display(),
                    plugin = %manifest.name,
                    "discovered plugin manifest"
                );
                found.push((manifest, path));
            }
            Err(err) => {
                warn!(path = %manifest_path.display(), %err, "failed to load plugin manifest");
            }
        }
    }

    found
}

/// Load and parse a single `Plugin.toml` from `path`.
///
/// # Errors
///
/// Returns [`PluginError::ManifestInvalid`] if the file cannot be read or
/// does not parse as a valid manifest.
pub fn load_manifest(path: &Path) -> PluginResult<PluginManifest> {
    let content = std::fs::read_to_string(path).map_err(|err| PluginError::ManifestInvalid {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    toml::from_str(&content).map_err(|err| PluginError::ManifestInvalid {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_plugin(dir: &Path, name: &str, toml: &str) {
        let plugin_dir = dir.join(name);
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(plugin_dir.join(MANIFEST_FILE_NAME), toml).unwrap();
    }

    #[test]
    fn discovers_valid_manifests_and_skips_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin(
            tmp.path(),
            "good",
            r#"name = "good"
            version = "0.1.0"
            entry = "good.wasm""#,
        );
        write_plugin(tmp.path(), "bad", "not valid toml {{{");

        let found = discover_manifests(tmp.path());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.name, "good");
    }

    #[test]
    fn discovery_of_missing_directory_returns_empty() {
        let found = discover_manifests(Path::new("/nonexistent/plugins/path"));
        assert!(found.is_empty());
    }

    #[test]
    fn load_manifest_reports_path_on_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(MANIFEST_FILE_NAME);
        fs::write(&path, "not valid toml {{{").unwrap();

        let err = load_manifest(&path).unwrap_err();
        match err {
            PluginError::ManifestInvalid { path: p, .. } => assert_eq!(p, path),
            _ => panic!("expected ManifestInvalid"),
        }
    }
}
