//! Error taxonomy for the plugin host.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while discovering, loading, calling, or
/// unloading a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The manifest file could not be read or parsed.
    #[error("failed to read manifest at {path}: {message}")]
    ManifestInvalid {
        /// Path to the offending manifest.
        path: PathBuf,
        /// Parse or read error message.
        message: String,
    },
    /// The operator's policy does not authorize `plugin_system`.
    #[error("plugin system is not authorized by policy: {0}")]
    NotAuthorized(String),
    /// A requested permission is not declared in the plugin's manifest.
    #[error("plugin '{plugin}' has no declared permission '{permission}'")]
    PermissionNotDeclared {
        /// The plugin id.
        plugin: String,
        /// The permission that was requested but not declared.
        permission: String,
    },
    /// No plugin with the given id is registered.
    #[error("plugin not found: {0}")]
    NotFound(String),
    /// A plugin with the given id is already registered.
    #[error("plugin already registered: {0}")]
    AlreadyRegistered(String),
    /// Building or instantiating the WASM sandbox failed.
    #[error("failed to build plugin sandbox for '{plugin}': {message}")]
    SandboxBuild {
        /// The plugin id.
        plugin: String,
        /// The underlying Extism/Wasm error.
        message: String,
    },
    /// A plugin call exceeded its resource-limit scope.
    #[error("plugin '{plugin}' exceeded its resource limit during '{function}'")]
    ResourceLimitExceeded {
        /// The plugin id.
        plugin: String,
        /// The exported function that was called.
        function: String,
    },
    /// The exported function call itself failed inside the guest.
    #[error("plugin '{plugin}' call to '{function}' failed: {message}")]
    CallFailed {
        /// The plugin id.
        plugin: String,
        /// The exported function that was called.
        function: String,
        /// The underlying error message.
        message: String,
    },
    /// Filesystem error watching the plugin directory.
    #[error("plugin directory watch failed: {0}")]
    Watch(String),
}

impl PluginError {
    /// Classify this error under the cross-cutting [`aurora_core::ErrorKind`]
    /// taxonomy, so callers can apply the shared propagation policy instead
    /// of matching on every variant here.
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        use aurora_core::ErrorKind;
        match self {
            Self::ManifestInvalid { .. } => ErrorKind::Validation,
            Self::NotAuthorized(_) => ErrorKind::PermissionDenied,
            Self::PermissionNotDeclared { .. } => ErrorKind::PermissionDenied,
            Self::NotFound(_) | Self::AlreadyRegistered(_) => ErrorKind::Validation,
            Self::SandboxBuild { .. } => ErrorKind::Resource,
            Self::ResourceLimitExceeded { .. } => ErrorKind::Timeout,
            Self::CallFailed { .. } => ErrorKind::Protocol,
            Self::Watch(_) => ErrorKind::Resource,
        }
    }
}

/// Convenience result alias for plugin host operations.
pub type PluginResult<T> = Result<T, PluginError>;
