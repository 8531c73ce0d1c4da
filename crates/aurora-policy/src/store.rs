//! The policy file and the gate that enforces it.
//!
//! The policy is process-wide and reloadable on disk. A capability is
//! authorized iff the master flag and the named feature flag are both
//! true. The gate is consulted on every privileged call; a denial raises
//! [`PolicyError::NotAuthorized`] before any side effect runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{PolicyError, PolicyResult};

/// Capability names recognized by this workstation, per the operator
/// policy file's documented schema.
pub const KNOWN_CAPABILITIES: &[&str] = &[
    "control_mouse_keyboard",
    "vision_agent",
    "vision_streaming",
    "stealth_browsing",
    "captcha_bypass",
    "plugin_system",
    "local_inference",
    "proxy_rotation",
];

/// The on-disk policy document (`config/operator_enabled.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Master switch. When false, every capability is denied regardless
    /// of the `features` map.
    pub operator_enabled: bool,
    /// Per-capability feature flags.
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

impl Policy {
    /// A conservative default: everything off.
    #[must_use]
    pub fn locked_down() -> Self {
        Self {
            operator_enabled: false,
            features: HashMap::new(),
        }
    }

    /// Whether `capability` is authorized under this policy.
    #[must_use]
    pub fn is_authorized(&self, capability: &str) -> bool {
        self.operator_enabled && self.features.get(capability).copied().unwrap_or(false)
    }

    fn load_from_path(path: &Path) -> PolicyResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| PolicyError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Process-wide authorization gate.
///
/// Holds the current policy behind a `RwLock` and, when constructed with
/// [`PolicyGate::watch`], keeps it in sync with the on-disk file as the
/// operator edits it.
pub struct PolicyGate {
    policy: Arc<RwLock<Policy>>,
    path: Option<PathBuf>,
    _watcher: Option<RecommendedWatcher>,
}

impl PolicyGate {
    /// A gate over a fixed, in-memory policy (no file, no hot reload).
    /// Primarily useful for tests and embedding.
    #[must_use]
    pub fn from_policy(policy: Policy) -> Self {
        Self {
            policy: Arc::new(RwLock::new(policy)),
            path: None,
            _watcher: None,
        }
    }

    /// Load the policy from `path` without watching it for changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let path = path.as_ref().to_path_buf();
        let policy = Policy::load_from_path(&path)?;
        Ok(Self {
            policy: Arc::new(RwLock::new(policy)),
            path: Some(path),
            _watcher: None,
        })
    }

    /// Load the policy from `path` and keep it reloaded as the file
    /// changes on disk.
    ///
    /// Parse failures during a reload are logged at `warn` and leave the
    /// previously-loaded policy in effect; the gate never degrades to an
    /// all-allow state on a bad edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails or the filesystem
    /// watcher cannot be started.
    pub fn watch(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let path = path.as_ref().to_path_buf();
        let policy = Policy::load_from_path(&path)?;
        let shared = Arc::new(RwLock::new(policy));

        let watched = shared.clone();
        let watched_path = path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else {
                return;
            };
            if !event.kind.is_modify() && !event.kind.is_create() {
                return;
            }
            match Policy::load_from_path(&watched_path) {
                Ok(fresh) => {
                    if let Ok(mut guard) = watched.write() {
                        *guard = fresh;
                        info!(path = %watched_path.display(), "policy reloaded");
                    }
                }
                Err(err) => {
                    warn!(path = %watched_path.display(), %err, "policy reload failed, keeping previous policy");
                }
            }
        })?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            policy: shared,
            path: Some(path),
            _watcher: Some(watcher),
        })
    }

    /// Force a synchronous reload from disk, bypassing the watcher.
    ///
    /// # Errors
    ///
    /// Returns an error if this gate has no backing file, or the file
    /// cannot be read or parsed.
    pub fn reload(&self) -> PolicyResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let fresh = Policy::load_from_path(path)?;
        match self.policy.write() {
            Ok(mut guard) => {
                *guard = fresh;
                Ok(())
            }
            Err(_) => {
                error!("policy lock poisoned during reload");
                Ok(())
            }
        }
    }

    /// Authorize `capability`, returning an error before any side effect
    /// runs if it is not granted.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NotAuthorized`] if the master flag or the
    /// capability's feature flag is false.
    pub fn authorize(&self, capability: &str) -> PolicyResult<()> {
        let authorized = self
            .policy
            .read()
            .map(|p| p.is_authorized(capability))
            .unwrap_or(false);
        if authorized {
            Ok(())
        } else {
            Err(PolicyError::NotAuthorized {
                capability: capability.to_string(),
            })
        }
    }

    /// A snapshot of the current policy, for status/doctor commands.
    #[must_use]
    pub fn snapshot(&self) -> Policy {
        self.policy
            .read()
            .map(|p| p.clone())
            .unwrap_or_else(|_| Policy::locked_down())
    }
}

impl std::fmt::Debug for PolicyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyGate")
            .field("path", &self.path)
            .field("watching", &self._watcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_policy(dir: &tempfile::TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("operator_enabled.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(yaml.as_bytes()).unwrap();
        path
    }

    #[test]
    fn master_flag_gates_everything() {
        let policy = Policy {
            operator_enabled: false,
            features: [("control_mouse_keyboard".to_string(), true)]
                .into_iter()
                .collect(),
        };
        let gate = PolicyGate::from_policy(policy);
        assert!(gate.authorize("control_mouse_keyboard").is_err());
    }

    #[test]
    fn both_flags_true_authorizes() {
        let policy = Policy {
            operator_enabled: true,
            features: [("vision_agent".to_string(), true)].into_iter().collect(),
        };
        let gate = PolicyGate::from_policy(policy);
        assert!(gate.authorize("vision_agent").is_ok());
        assert!(gate.authorize("stealth_browsing").is_err());
    }

    #[test]
    fn unknown_capability_denied_by_default() {
        let policy = Policy {
            operator_enabled: true,
            features: HashMap::new(),
        };
        let gate = PolicyGate::from_policy(policy);
        assert!(gate.authorize("anything").is_err());
    }

    #[test]
    fn load_and_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_policy(
            &dir,
            "operator_enabled: true\nfeatures:\n  captcha_bypass: false\n",
        );
        let gate = PolicyGate::load(&path).unwrap();
        assert!(gate.authorize("captcha_bypass").is_err());

        write_policy(
            &dir,
            "operator_enabled: true\nfeatures:\n  captcha_bypass: true\n",
        );
        gate.reload().unwrap();
        assert!(gate.authorize("captcha_bypass").is_ok());
    }
}
