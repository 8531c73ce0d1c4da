//! The Control Plane (C9): ordered subsystem lifecycle, idempotent
//! emergency stop, and the metrics snapshot/history ring.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aurora_audit::{AuditEvent, AuditSink};
use aurora_events::ReasoningStream;
use aurora_telemetry::HeartbeatSupervisor;
use futures::future::join_all;
use sysinfo::System;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{KernelError, KernelResult};
use crate::metrics::{HistoryRing, KernelSnapshot, DEFAULT_HISTORY_CAPACITY};
use crate::subsystem::Subsystem;

/// Owns ordered startup/shutdown of every other component, idempotent
/// emergency stop, and the on-demand metrics snapshot.
///
/// Subsystems are registered in dependency order (Policy before Audit
/// before Cache, ...). [`Self::start_all`] walks that order forward;
/// [`Self::stop_all`] walks it in reverse. [`Self::emergency_stop`] is a
/// distinct, idempotent path: it stops every subsystem concurrently
/// rather than in order, since the goal is to halt side effects as fast
/// as possible, not to preserve teardown ordering.
pub struct ControlPlane {
    subsystems: std::sync::Mutex<Vec<Arc<dyn Subsystem>>>,
    reasoning: Arc<ReasoningStream>,
    heartbeat: Arc<HeartbeatSupervisor>,
    audit: AuditSink,
    stopped: AtomicBool,
    sys: Mutex<System>,
    history: Mutex<HistoryRing>,
}

impl ControlPlane {
    /// Build a Control Plane over already-constructed collaborators. No
    /// subsystems are registered yet; call [`Self::register`] for each,
    /// in dependency order, before [`Self::start_all`].
    #[must_use]
    pub fn new(reasoning: Arc<ReasoningStream>, heartbeat: Arc<HeartbeatSupervisor>, audit: AuditSink) -> Self {
        Self {
            subsystems: std::sync::Mutex::new(Vec::new()),
            reasoning,
            heartbeat,
            audit,
            stopped: AtomicBool::new(false),
            sys: Mutex::new(System::new()),
            history: Mutex::new(HistoryRing::new(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    /// Override the default 300-sample (5 minute at 1Hz) history ring
    /// capacity.
    #[must_use]
    pub fn with_history_capacity(self, capacity: usize) -> Self {
        Self { history: Mutex::new(HistoryRing::new(capacity)), ..self }
    }

    /// Register a subsystem at the end of the startup order. Must be
    /// called before [`Self::start_all`]; registering after startup has
    /// begun does not retroactively start it.
    pub fn register(&self, subsystem: Arc<dyn Subsystem>) {
        self.subsystems.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(subsystem);
    }

    fn snapshot_subsystems(&self) -> Vec<Arc<dyn Subsystem>> {
        self.subsystems.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Whether [`Self::emergency_stop`] has fired and not yet been
    /// cleared by [`Self::restart`]. Submission paths elsewhere in the
    /// process should consult this before forwarding a call.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Reject with [`KernelError::Stopped`] if an emergency stop is in
    /// effect; otherwise succeed. A convenience for callers that hold an
    /// `Arc<ControlPlane>` and want a one-line guard before submission.
    pub fn guard_running(&self) -> KernelResult<()> {
        if self.is_stopped() {
            return Err(KernelError::Stopped);
        }
        Ok(())
    }

    /// Start every registered subsystem, in registration order. Stops
    /// on the first failure without attempting the remaining
    /// subsystems, mirroring the dependency order those registrations
    /// express.
    pub async fn start_all(&self) -> KernelResult<()> {
        for subsystem in self.snapshot_subsystems() {
            info!(subsystem = subsystem.name(), "starting subsystem");
            subsystem.start().await.map_err(|detail| {
                self.audit.emit(
                    AuditEvent::system("kernel.start_failed", detail.as_str())
                        .with_meta("subsystem", subsystem.name()),
                );
                KernelError::StartFailed { name: subsystem.name().to_string(), detail }
            })?;
            self.audit.emit(AuditEvent::system("kernel.started", subsystem.name()));
        }
        Ok(())
    }

    /// Stop every registered subsystem, in reverse registration order.
    /// Unlike [`Self::emergency_stop`], a failure does not halt the
    /// walk: every subsystem gets a stop attempt, and the first failure
    /// encountered is returned after all have been tried.
    pub async fn stop_all(&self) -> KernelResult<()> {
        let mut first_err = None;
        for subsystem in self.snapshot_subsystems().into_iter().rev() {
            info!(subsystem = subsystem.name(), "stopping subsystem");
            if let Err(detail) = subsystem.stop().await {
                warn!(subsystem = subsystem.name(), detail = %detail, "subsystem failed to stop");
                self.audit.emit(
                    AuditEvent::system("kernel.stop_failed", detail.as_str()).with_meta("subsystem", subsystem.name()),
                );
                first_err.get_or_insert(KernelError::StopFailed {
                    name: subsystem.name().to_string(),
                    detail,
                });
            } else {
                self.audit.emit(AuditEvent::system("kernel.stopped", subsystem.name()));
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Idempotent emergency stop. The first call broadcasts an
    /// `emergency_stop` event to every reasoning subscriber, then stops
    /// every registered subsystem concurrently, awaiting all before
    /// returning. Subsequent calls are no-ops that return `Ok(())`
    /// immediately. After this returns, [`Self::is_stopped`] is `true`
    /// regardless of whether every subsystem stopped cleanly.
    pub async fn emergency_stop(&self, reason: impl Into<String> + Send) -> KernelResult<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let reason = reason.into();
        warn!(reason = reason.as_str(), "emergency stop triggered");
        self.reasoning.broadcast_emergency_stop(reason.clone());
        self.audit.emit(AuditEvent::system("kernel.emergency_stop", reason.as_str()));

        let subsystems = self.snapshot_subsystems();
        let results = join_all(subsystems.iter().map(|s| async move {
            let outcome = s.stop().await;
            (s.name().to_string(), outcome)
        }))
        .await;

        let mut first_err = None;
        for (name, outcome) in results {
            match outcome {
                Ok(()) => self.audit.emit(AuditEvent::system("kernel.stopped", name.as_str())),
                Err(detail) => {
                    warn!(subsystem = %name, detail = %detail, "subsystem failed to stop during emergency stop");
                    self.audit.emit(
                        AuditEvent::system("kernel.stop_failed", detail.as_str()).with_meta("subsystem", name.as_str()),
                    );
                    first_err.get_or_insert(KernelError::StopFailed { name, detail });
                },
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Clear the emergency-stop flag and re-run [`Self::start_all`].
    /// Does nothing to the flag if no stop was in effect, but still
    /// re-runs startup — restart is also how a fresh process brings
    /// every subsystem up the first time.
    pub async fn restart(&self) -> KernelResult<()> {
        self.stopped.store(false, Ordering::SeqCst);
        self.audit.emit(AuditEvent::system("kernel.restart", "restarting subsystems"));
        self.start_all().await
    }

    /// Produce a fresh [`KernelSnapshot`] (host metrics plus component
    /// health), push it onto the bounded history ring, and return it.
    pub async fn metrics_snapshot(&self) -> KernelSnapshot {
        let system = {
            let mut sys = self.sys.lock().await;
            aurora_telemetry::sample_system_metrics(&mut sys)
        };
        let health = self.heartbeat.snapshot().await;
        let snapshot = KernelSnapshot { timestamp: aurora_core::Timestamp::now(), system, health };

        let mut history = self.history.lock().await;
        history.push(snapshot.clone());
        snapshot
    }

    /// The retained metrics history, oldest first.
    pub async fn metrics_history(&self) -> Vec<KernelSnapshot> {
        self.history.lock().await.to_vec()
    }

    /// Spawn a task that calls [`Self::metrics_snapshot`] on `period`,
    /// feeding the history ring without a caller having to poll. The
    /// default Control Plane metrics cadence named in spec §4.9 is one
    /// second.
    pub fn spawn_metrics_sampler(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let _ = self.metrics_snapshot().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use aurora_audit::AuditSink;
    use aurora_telemetry::HeartbeatSupervisor;

    use super::*;
    use crate::subsystem::test_support::RecordingSubsystem;

    async fn new_plane() -> (ControlPlane, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let audit = AuditSink::open(dir.path(), "kernel").await.expect("open audit sink");
        let reasoning = Arc::new(ReasoningStream::new());
        let heartbeat = Arc::new(HeartbeatSupervisor::new(Vec::new(), audit.clone(), audit.clone()));
        (ControlPlane::new(reasoning, heartbeat, audit), dir)
    }

    #[tokio::test]
    async fn start_all_runs_in_registration_order() {
        let (plane, _dir) = new_plane().await;
        let starts_a = Arc::new(AtomicUsize::new(0));
        let starts_b = Arc::new(AtomicUsize::new(0));
        plane.register(Arc::new(RecordingSubsystem {
            name: "a",
            starts: starts_a.clone(),
            stops: Arc::new(AtomicUsize::new(0)),
            fail_start: false,
            fail_stop: false,
        }));
        plane.register(Arc::new(RecordingSubsystem {
            name: "b",
            starts: starts_b.clone(),
            stops: Arc::new(AtomicUsize::new(0)),
            fail_start: false,
            fail_stop: false,
        }));

        plane.start_all().await.expect("all subsystems start");
        assert_eq!(starts_a.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(starts_b.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn start_all_stops_at_first_failure() {
        let (plane, _dir) = new_plane().await;
        let starts_b = Arc::new(AtomicUsize::new(0));
        plane.register(Arc::new(RecordingSubsystem {
            name: "a",
            starts: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
            fail_start: true,
            fail_stop: false,
        }));
        plane.register(Arc::new(RecordingSubsystem {
            name: "b",
            starts: starts_b.clone(),
            stops: Arc::new(AtomicUsize::new(0)),
            fail_start: false,
            fail_stop: false,
        }));

        let err = plane.start_all().await.expect_err("first subsystem refuses");
        assert!(matches!(err, KernelError::StartFailed { name, .. } if name == "a"));
        assert_eq!(starts_b.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn emergency_stop_is_idempotent_and_sets_flag() {
        let (plane, _dir) = new_plane().await;
        let stops = Arc::new(AtomicUsize::new(0));
        plane.register(Arc::new(RecordingSubsystem {
            name: "a",
            starts: Arc::new(AtomicUsize::new(0)),
            stops: stops.clone(),
            fail_start: false,
            fail_stop: false,
        }));

        assert!(!plane.is_stopped());
        plane.emergency_stop("operator halted").await.expect("stop succeeds");
        assert!(plane.is_stopped());
        assert_eq!(stops.load(AtomicOrdering::SeqCst), 1);

        plane.emergency_stop("called again").await.expect("second call is a no-op");
        assert_eq!(stops.load(AtomicOrdering::SeqCst), 1);
        assert!(plane.guard_running().is_err());
    }

    #[tokio::test]
    async fn restart_clears_the_flag_and_restarts() {
        let (plane, _dir) = new_plane().await;
        let starts = Arc::new(AtomicUsize::new(0));
        plane.register(Arc::new(RecordingSubsystem {
            name: "a",
            starts: starts.clone(),
            stops: Arc::new(AtomicUsize::new(0)),
            fail_start: false,
            fail_stop: false,
        }));

        plane.emergency_stop("halt").await.expect("stop succeeds");
        assert!(plane.is_stopped());
        plane.restart().await.expect("restart succeeds");
        assert!(!plane.is_stopped());
        assert_eq!(starts.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn metrics_snapshot_feeds_history() {
        let (plane, _dir) = new_plane().await;
        plane.metrics_snapshot().await;
        plane.metrics_snapshot().await;
        assert_eq!(plane.metrics_history().await.len(), 2);
    }
}
