//! The Input Queue (C10): a single global worker that executes mouse and
//! keyboard actions strictly sequentially across the whole process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use aurora_audit::{AuditEvent, AuditSink};
use aurora_core::{new_id, retry_with_backoff, BackoffPolicy};
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::action::{is_failsafe_corner, InputAction};
use crate::backend::InputBackend;
use crate::error::{InputError, InputResult};

const FAILSAFE_MARGIN: i32 = 2;

/// Terminal or in-flight state of one queued input task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTaskStatus {
    /// Waiting for the single worker to reach it.
    Queued,
    /// The worker is currently executing it.
    Running,
    /// Completed without error.
    Completed,
    /// Failed after exhausting retries, or hit the failsafe.
    Failed(String),
}

/// A point-in-time snapshot of the queue's operational health.
#[derive(Debug, Clone)]
pub struct InputQueueHealth {
    /// Tasks currently waiting for the worker.
    pub queue_depth: usize,
    /// Whether the worker is currently executing a task.
    pub running: bool,
    /// Total tasks ever submitted.
    pub total: u64,
    /// Times the worker loop has been restarted by an external supervisor
    /// (the Control Plane's Heartbeat Supervisor owns the crash-recovery
    /// loop; this queue only counts what it's told).
    pub restarts: u64,
    /// The most recent error message, if any task has failed.
    pub last_error: Option<String>,
}

struct Entry {
    status: InputTaskStatus,
}

/// The strictly serialized, single-worker Input Queue.
pub struct InputQueue {
    backend: Arc<dyn InputBackend>,
    tx: mpsc::UnboundedSender<(String, InputAction)>,
    tasks: Mutex<HashMap<String, Entry>>,
    audit: AuditSink,
    stopped: AtomicBool,
    total: AtomicU64,
    restarts: AtomicU64,
    queued: AtomicU64,
    running_flag: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl InputQueue {
    /// Build the queue and spawn its single worker task.
    #[must_use]
    pub fn new(backend: Arc<dyn InputBackend>, audit: AuditSink) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Arc::new(Self {
            backend,
            tx,
            tasks: Mutex::new(HashMap::new()),
            audit,
            stopped: AtomicBool::new(false),
            total: AtomicU64::new(0),
            restarts: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            running_flag: AtomicBool::new(false),
            last_error: Mutex::new(None),
        });
        tokio::spawn(Arc::clone(&queue).run_worker(rx));
        queue
    }

    /// Queue an action, returning its task id immediately.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Stopped`] if an emergency stop is in effect.
    pub async fn submit(&self, action: InputAction) -> InputResult<String> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(InputError::Stopped);
        }

        let id = new_id();
        self.tasks.lock().await.insert(id.clone(), Entry { status: InputTaskStatus::Queued });
        self.total.fetch_add(1, Ordering::SeqCst);
        self.queued.fetch_add(1, Ordering::SeqCst);

        if self.tx.send((id.clone(), action)).is_err() {
            warn!(task_id = %id, "input worker gone, task left queued");
        }

        Ok(id)
    }

    /// Look up a task's current status.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::UnknownTask`] if `id` was never submitted.
    pub async fn status(&self, id: &str) -> InputResult<InputTaskStatus> {
        self.tasks.lock().await.get(id).map(|e| e.status.clone()).ok_or(InputError::UnknownTask)
    }

    /// A snapshot of queue depth, running state, and error counters.
    pub async fn health(&self) -> InputQueueHealth {
        InputQueueHealth {
            queue_depth: self.queued.load(Ordering::SeqCst) as usize,
            running: self.running_flag.load(Ordering::SeqCst),
            total: self.total.load(Ordering::SeqCst),
            restarts: self.restarts.load(Ordering::SeqCst),
            last_error: self.last_error.lock().await.clone(),
        }
    }

    /// Reject further submissions. In-flight work finishes; it is not
    /// forcibly killed (the backend has no subprocess to kill).
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Record that an external supervisor restarted this queue's worker.
    pub fn record_restart(&self) {
        self.restarts.fetch_add(1, Ordering::SeqCst);
    }

    async fn run_worker(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<(String, InputAction)>) {
        while let Some((id, action)) = rx.recv().await {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            self.running_flag.store(true, Ordering::SeqCst);
            self.execute_one(&id, action).await;
            self.running_flag.store(false, Ordering::SeqCst);
        }
    }

    async fn execute_one(&self, id: &str, action: InputAction) {
        {
            let mut tasks = self.tasks.lock().await;
            if let Some(entry) = tasks.get_mut(id) {
                entry.status = InputTaskStatus::Running;
            }
        }

        let result = self.execute_with_retries(&action).await;

        let status = match &result {
            Ok(()) => InputTaskStatus::Completed,
            Err(err) => InputTaskStatus::Failed(err.to_string()),
        };

        if let Err(err) = &result {
            *self.last_error.lock().await = Some(err.to_string());
            self.audit.emit(
                AuditEvent::system("input_task.failed", format!("task {id} failed: {err}"))
                    .with_meta("kind", err.kind().to_string()),
            );
        } else {
            self.audit.emit(AuditEvent::system("input_task.completed", format!("task {id} completed")));
        }

        let mut tasks = self.tasks.lock().await;
        if let Some(entry) = tasks.get_mut(id) {
            entry.status = status;
        }
    }

    /// Authorize-then-run one action, retrying transient backend failures
    /// with [`BackoffPolicy::default_broker`]. A failsafe trigger is a
    /// distinct, non-retried error class.
    async fn execute_with_retries(&self, action: &InputAction) -> InputResult<()> {
        if let Some((x, y)) = corner_coordinates(action) {
            let (w, h) = self.backend.screen_size();
            if is_failsafe_corner(x, y, w, h, FAILSAFE_MARGIN) {
                return Err(InputError::Failsafe(format!("pointer target ({x}, {y}) is in the failsafe corner")));
            }
        }

        retry_with_backoff(BackoffPolicy::default_broker(), || async { self.run_backend(action).await }).await
    }

    async fn run_backend(&self, action: &InputAction) -> InputResult<()> {
        match action {
            InputAction::MouseMove { x, y } => self.backend.move_to(*x, *y).await,
            InputAction::MouseClick { x, y, button } => self.backend.click_at(*x, *y, *button).await,
            InputAction::KeyboardType { text } => self.backend.type_text(text).await,
        }
    }
}

fn corner_coordinates(action: &InputAction) -> Option<(i32, i32)> {
    match action {
        InputAction::MouseMove { x, y } | InputAction::MouseClick { x, y, .. } => Some((*x, *y)),
        InputAction::KeyboardType { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingBackend {
        calls: AtomicUsize,
        fail_times: usize,
        screen: (i32, i32),
    }

    #[async_trait::async_trait]
    impl InputBackend for CountingBackend {
        async fn move_to(&self, _x: i32, _y: i32) -> InputResult<()> {
            self.maybe_fail()
        }
        async fn click_at(&self, _x: i32, _y: i32, _button: crate::action::MouseButton) -> InputResult<()> {
            self.maybe_fail()
        }
        async fn type_text(&self, _text: &str) -> InputResult<()> {
            self.maybe_fail()
        }
        fn screen_size(&self) -> (i32, i32) {
            self.screen
        }
    }

    impl CountingBackend {
        fn maybe_fail(&self) -> InputResult<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                Err(InputError::Backend("transient".to_string()))
            } else {
                Ok(())
            }
        }
    }

    async fn sink() -> AuditSink {
        let dir = tempfile::tempdir().unwrap();
        AuditSink::open(dir.path(), "input").await.unwrap()
    }

    #[tokio::test]
    async fn completes_after_transient_failures() {
        let backend = Arc::new(CountingBackend { calls: AtomicUsize::new(0), fail_times: 1, screen: (1920, 1080) });
        let queue = InputQueue::new(backend, sink().await);
        let id = queue.submit(InputAction::MouseMove { x: 500, y: 500 }).await.unwrap();

        for _ in 0..50 {
            if let Ok(InputTaskStatus::Completed) = queue.status(&id).await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("task never completed");
    }

    #[tokio::test]
    async fn failsafe_corner_is_rejected_without_retry() {
        let backend = Arc::new(CountingBackend { calls: AtomicUsize::new(0), fail_times: 0, screen: (1920, 1080) });
        let queue = InputQueue::new(backend, sink().await);
        let id = queue.submit(InputAction::MouseMove { x: 0, y: 0 }).await.unwrap();

        for _ in 0..50 {
            match queue.status(&id).await {
                Ok(InputTaskStatus::Failed(msg)) => {
                    assert!(msg.contains("failsafe"));
                    return;
                },
                _ => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        panic!("task never failed");
    }

    #[tokio::test]
    async fn stop_rejects_further_submissions() {
        let backend = Arc::new(CountingBackend { calls: AtomicUsize::new(0), fail_times: 0, screen: (1920, 1080) });
        let queue = InputQueue::new(backend, sink().await);
        queue.stop();
        let result = queue.submit(InputAction::KeyboardType { text: "hi".to_string() }).await;
        assert!(matches!(result, Err(InputError::Stopped)));
    }

    #[tokio::test]
    async fn unknown_task_reports_unknown() {
        let backend = Arc::new(CountingBackend { calls: AtomicUsize::new(0), fail_times: 0, screen: (1920, 1080) });
        let queue = InputQueue::new(backend, sink().await);
        assert!(matches!(queue.status("nope").await, Err(InputError::UnknownTask)));
    }
}
