//! Mock implementations of the cross-cutting traits, for tests in
//! other crates that need a collaborator without standing up the real
//! thing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aurora_cache::{RemoteCache, StorageError, StorageResult};
use aurora_kernel::Subsystem;
use aurora_telemetry::{ComponentHealth, ComponentStatus, HealthCheck};

/// An [`aurora_telemetry::HealthCheck`] that always reports the same
/// fixed status, for exercising the Heartbeat Supervisor without a
/// real component behind it.
pub struct MockHealthCheck {
    name: String,
    status: Mutex<ComponentHealth>,
}

impl MockHealthCheck {
    /// A check named `name` that starts out healthy.
    #[must_use]
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Mutex::new(ComponentHealth { status: ComponentStatus::Healthy, detail: String::new() }),
        }
    }

    /// Replace the status this check reports on the next poll.
    pub fn set_status(&self, status: ComponentStatus, detail: impl Into<String>) {
        if let Ok(mut guard) = self.status.lock() {
            *guard = ComponentHealth { status, detail: detail.into() };
        }
    }
}

#[async_trait]
impl HealthCheck for MockHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health(&self) -> ComponentHealth {
        self.status.lock().map(|g| g.clone()).unwrap_or(ComponentHealth {
            status: ComponentStatus::Error,
            detail: "mock health check lock poisoned".to_string(),
        })
    }
}

/// An [`aurora_kernel::Subsystem`] that records every `start`/`stop`
/// call and can be made to fail either one, for exercising Control
/// Plane lifecycle ordering without a real component behind it.
pub struct MockSubsystem {
    name: String,
    /// Number of times `start` has been called.
    pub starts: Arc<AtomicUsize>,
    /// Number of times `stop` has been called.
    pub stops: Arc<AtomicUsize>,
    fail_start: bool,
    fail_stop: bool,
}

impl MockSubsystem {
    /// A subsystem named `name` whose `start`/`stop` always succeed.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            starts: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
            fail_start: false,
            fail_stop: false,
        }
    }

    /// Make `start` return `Err`.
    #[must_use]
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Make `stop` return `Err`.
    #[must_use]
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }
}

#[async_trait]
impl Subsystem for MockSubsystem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), String> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(format!("{} refused to start", self.name));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(format!("{} refused to stop", self.name));
        }
        Ok(())
    }
}

/// An in-memory [`aurora_cache::RemoteCache`], for exercising the
/// cache manager's remote tier without a network dependency. Values
/// can be queued to simulate an always-miss or transiently-failing
/// remote.
#[derive(Default)]
pub struct MockRemoteCache {
    data: Mutex<std::collections::HashMap<(String, String), Vec<u8>>>,
    fail_next: Mutex<VecDeque<()>>,
}

impl MockRemoteCache {
    /// An empty remote cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next remote call fail with
    /// [`StorageError::Connection`].
    pub fn fail_next_call(&self) {
        if let Ok(mut queue) = self.fail_next.lock() {
            queue.push_back(());
        }
    }

    fn take_failure(&self) -> bool {
        self.fail_next.lock().map(|mut q| q.pop_front().is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl RemoteCache for MockRemoteCache {
    async fn remote_get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        if self.take_failure() {
            return Err(StorageError::Connection("mock remote unavailable".to_string()));
        }
        let data = self.data.lock().map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.get(&(namespace.to_string(), key.to_string())).cloned())
    }

    async fn remote_set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        if self.take_failure() {
            return Err(StorageError::Connection("mock remote unavailable".to_string()));
        }
        let mut data = self.data.lock().map_err(|e| StorageError::Internal(e.to_string()))?;
        data.insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn remote_delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        if self.take_failure() {
            return Err(StorageError::Connection("mock remote unavailable".to_string()));
        }
        let mut data = self.data.lock().map_err(|e| StorageError::Internal(e.to_string()))?;
        data.remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_health_check_reports_set_status() {
        let check = MockHealthCheck::healthy("widget");
        assert_eq!(check.health().await.status, ComponentStatus::Healthy);
        check.set_status(ComponentStatus::Error, "boom");
        let health = check.health().await;
        assert_eq!(health.status, ComponentStatus::Error);
        assert_eq!(health.detail, "boom");
    }

    #[tokio::test]
    async fn mock_subsystem_records_calls_and_can_fail() {
        let sub = MockSubsystem::new("widget").failing_stop();
        sub.start().await.expect("start should succeed");
        assert!(sub.stop().await.is_err());
        assert_eq!(sub.starts.load(Ordering::SeqCst), 1);
        assert_eq!(sub.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mock_remote_cache_roundtrips_and_can_be_made_to_fail() {
        let remote = MockRemoteCache::new();
        remote.remote_set("ns", "k", b"v".to_vec()).await.unwrap();
        assert_eq!(remote.remote_get("ns", "k").await.unwrap(), Some(b"v".to_vec()));

        remote.fail_next_call();
        assert!(remote.remote_get("ns", "k").await.is_err());
        // failure was one-shot; the next call succeeds again
        assert_eq!(remote.remote_get("ns", "k").await.unwrap(), Some(b"v".to_vec()));
    }
}
