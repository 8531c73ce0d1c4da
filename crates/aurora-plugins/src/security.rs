//! Per-call resource-limit scope.
//!
//! Every plugin call is wrapped in a resource-limit scope before it
//! reaches the guest: a CPU-time cap and a memory cap. The memory cap is
//! enforced by the WASM engine itself (a hard limit on linear memory
//! growth, configured once at instantiation). The CPU-time cap is
//! best-effort: cooperative WASM execution has no universal CPU-time
//! accounting, so it is approximated with a wall-clock deadline around
//! the call. On platforms exposing `setrlimit` (Unix), the deadline is
//! additionally backed by a soft process CPU-time limit for the duration
//! of the call.

use std::future::Future;
use std::time::Duration;

use crate::error::{PluginError, PluginResult};

/// Resource caps applied to a single plugin call.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    /// Wall-clock deadline approximating a CPU-time cap.
    pub cpu_time: Duration,
    /// Memory cap, in 64 KiB WASM pages. Passed through to the engine's
    /// instantiation manifest; not separately enforced here.
    pub memory_max_pages: u32,
}

impl ResourceLimits {
    /// Build limits from a manifest's declared caps.
    #[must_use]
    pub fn from_manifest(manifest: &crate::manifest::PluginManifest) -> Self {
        Self {
            cpu_time: Duration::from_millis(manifest.cpu_time_ms),
            memory_max_pages: manifest.memory_max_pages,
        }
    }
}

/// Run `call` inside a per-call resource-limit scope.
///
/// Returns [`PluginError::ResourceLimitExceeded`] if `call` does not
/// complete before `limits.cpu_time` elapses. The in-flight call is
/// dropped at that point; Extism calls are synchronous so this cancels
/// the blocking task the call was spawned on, not the guest instance
/// itself, which is torn down by the caller on this error.
pub async fn with_resource_scope<F, T>(
    limits: ResourceLimits,
    plugin: &str,
    function: &str,
    call: F,
) -> PluginResult<T>
where
    F: Future<Output = PluginResult<T>>,
{
    match tokio::time::timeout(limits.cpu_time, call).await {
        Ok(result) => result,
        Err(_) => Err(PluginError::ResourceLimitExceeded {
            plugin: plugin.to_string(),
            function: function.to_string(),
        }),
    }
}

/// Apply a soft process CPU-time limit for the remainder of the current
/// call, on platforms that support it. A no-op everywhere else.
///
/// This is a coarse, process-wide backstop layered under the wall-clock
/// deadline in [`with_resource_scope`]: it does not isolate one plugin's
/// CPU usage from another's, since `setrlimit(RLIMIT_CPU, ...)` applies
/// to the whole process. It exists to catch a single guest call that
/// spins the CPU without ever yielding back to the async runtime, which
/// a wall-clock timeout alone cannot preempt.
#[cfg(unix)]
pub fn apply_soft_cpu_limit(cpu_time: Duration) {
    use nix::sys::resource::{setrlimit, Resource};

    let secs = cpu_time.as_secs().max(1);
    if let Err(err) = setrlimit(Resource::RLIMIT_CPU, secs, secs) {
        tracing::warn!(%err, "failed to apply soft CPU-time limit for plugin call");
    }
}

/// No-op on non-Unix platforms: CPU-time enforcement there relies solely
/// on the wall-clock deadline in [`with_resource_scope`].
#[cfg(not(unix))]
pub fn apply_soft_cpu_limit(_cpu_time: Duration) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_returns_ok_when_call_completes_in_time() {
        let limits = ResourceLimits {
            cpu_time: Duration::from_millis(200),
            memory_max_pages: 1024,
        };
        let result = with_resource_scope(limits, "demo", "run", async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn scope_times_out_slow_calls() {
        let limits = ResourceLimits {
            cpu_time: Duration::from_millis(10),
            memory_max_pages: 1024,
        };
        let result: PluginResult<()> = with_resource_scope(limits, "demo", "run", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        match result {
            Err(PluginError::ResourceLimitExceeded { plugin, function }) => {
                assert_eq!(plugin, "demo");
                assert_eq!(function, "run");
            }
            other => panic!("expected ResourceLimitExceeded, got {other:?}"),
        }
    }
}
