//! The reasoning stream: an append-only ring of reasoning steps, grouped
//! into contexts, fanned out to bounded-channel subscribers.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use aurora_core::{new_id, Timestamp};
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::error::{EventsError, EventsResult};
use crate::event::{
    ContextStatus, ReasoningContext, ReasoningLevel, ReasoningStep, StepBuilder, StreamEvent,
};

/// Default size of the in-memory step ring.
pub const DEFAULT_RING_CAPACITY: usize = 1000;

/// Default bounded-channel capacity handed to new subscribers.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;

struct Inner {
    ring: VecDeque<ReasoningStep>,
    ring_capacity: usize,
    contexts: HashMap<String, ReasoningContext>,
    default_context: Option<String>,
    subscribers: Vec<mpsc::Sender<Arc<StreamEvent>>>,
}

/// Append-only reasoning stream shared across the planner, executor, and
/// anything else narrating its work.
///
/// Share one instance behind an `Arc` across tasks; all methods take
/// `&self`.
pub struct ReasoningStream {
    inner: Mutex<Inner>,
    console_min_level: Option<ReasoningLevel>,
    persist_dir: Option<PathBuf>,
}

impl ReasoningStream {
    /// Create a stream with the default ring capacity and no console
    /// output or persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ring_capacity(DEFAULT_RING_CAPACITY)
    }

    /// Create a stream with a custom ring capacity.
    #[must_use]
    pub fn with_ring_capacity(ring_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ring: VecDeque::with_capacity(ring_capacity.min(4096)),
                ring_capacity,
                contexts: HashMap::new(),
                default_context: None,
                subscribers: Vec::new(),
            }),
            console_min_level: None,
            persist_dir: None,
        }
    }

    /// Emit steps at or above `level` to the `tracing` console as well as
    /// the stream.
    #[must_use]
    pub fn with_console_level(mut self, level: ReasoningLevel) -> Self {
        self.console_min_level = Some(level);
        self
    }

    /// Serialize each context to `<dir>/<context_id>.json` when it ends.
    #[must_use]
    pub fn with_persist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persist_dir = Some(dir.into());
        self
    }

    /// Begin a new reasoning context. If no context is currently the
    /// implicit default, this one becomes it.
    #[must_use]
    pub fn begin_context(&self, description: impl Into<String>) -> String {
        let id = new_id();
        let ctx = ReasoningContext::new(id.clone(), description.into());
        #[allow(clippy::unwrap_used)]
        let mut inner = self.inner.lock().unwrap();
        inner.contexts.insert(id.clone(), ctx);
        if inner.default_context.is_none() {
            inner.default_context = Some(id.clone());
        }
        id
    }

    /// End a context, persist it if a persist directory is configured,
    /// and notify subscribers.
    pub async fn end_context(&self, context_id: &str, status: ContextStatus) -> EventsResult<()> {
        let ctx = {
            #[allow(clippy::unwrap_used)]
            let mut inner = self.inner.lock().unwrap();
            let ctx = inner
                .contexts
                .get_mut(context_id)
                .ok_or_else(|| EventsError::UnknownContext(context_id.to_string()))?;
            ctx.status = status;
            ctx.ended_at = Some(Timestamp::now());
            if inner.default_context.as_deref() == Some(context_id) {
                inner.default_context = None;
            }
            ctx.clone()
        };

        if let Some(dir) = self.persist_dir.clone() {
            self.persist(&ctx, &dir).await?;
        }

        self.broadcast(StreamEvent::ContextEnded {
            context_id: context_id.to_string(),
            status,
        });
        Ok(())
    }

    async fn persist(&self, ctx: &ReasoningContext, dir: &PathBuf) -> EventsResult<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| EventsError::Persist {
                context_id: ctx.id.clone(),
                path: dir.display().to_string(),
                source,
            })?;
        let path = dir.join(format!("{}.json", ctx.id));
        let json = serde_json::to_vec_pretty(ctx).map_err(|source| EventsError::Serialize {
            context_id: ctx.id.clone(),
            source,
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| EventsError::Persist {
                context_id: ctx.id.clone(),
                path: path.display().to_string(),
                source,
            })
    }

    /// Record a reasoning step. If the builder names no context, the
    /// step attaches to the current implicit default context, if any.
    /// Returns the step's id.
    pub fn add_step(&self, builder: StepBuilder) -> String {
        let id = new_id();
        let step = builder.build(id.clone());
        self.emit_console(&step);

        #[allow(clippy::unwrap_used)]
        let mut inner = self.inner.lock().unwrap();
        let context_id = step.context_id.clone().or_else(|| inner.default_context.clone());
        if let Some(cid) = &context_id {
            if let Some(ctx) = inner.contexts.get_mut(cid) {
                ctx.steps.push(step.clone());
            }
        }

        if inner.ring.len() >= inner.ring_capacity {
            inner.ring.pop_front();
        }
        inner.ring.push_back(step.clone());

        let event = Arc::new(StreamEvent::Step(step));
        inner.subscribers.retain(|tx| match tx.try_send(Arc::clone(&event)) {
            Ok(()) => true,
            Err(_) => {
                warn!("dropping lagging reasoning stream subscriber");
                false
            },
        });

        id
    }

    fn emit_console(&self, step: &ReasoningStep) {
        let Some(min) = self.console_min_level else {
            return;
        };
        if step.level < min {
            return;
        }
        match step.level {
            ReasoningLevel::Debug => trace!(component = %step.component, "{}", step.thought),
            ReasoningLevel::Info => debug!(component = %step.component, "{}", step.thought),
            ReasoningLevel::Warning => warn!(component = %step.component, "{}", step.thought),
            ReasoningLevel::Error | ReasoningLevel::Critical => {
                error!(component = %step.component, "{}", step.thought);
            },
        }
    }

    /// Subscribe with the default bounded-channel capacity.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::Receiver<Arc<StreamEvent>> {
        self.subscribe_with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    /// Subscribe with a custom bounded-channel capacity. If the
    /// subscriber falls behind and the channel fills up, a later publish
    /// will drop it rather than block.
    #[must_use]
    pub fn subscribe_with_capacity(&self, capacity: usize) -> mpsc::Receiver<Arc<StreamEvent>> {
        let (tx, rx) = mpsc::channel(capacity);
        #[allow(clippy::unwrap_used)]
        self.inner.lock().unwrap().subscribers.push(tx);
        rx
    }

    /// Broadcast an emergency stop to every subscriber. Called by the
    /// Control Plane; does not itself track idempotency.
    pub fn broadcast_emergency_stop(&self, reason: impl Into<String>) {
        self.broadcast(StreamEvent::EmergencyStop { reason: reason.into() });
    }

    fn broadcast(&self, event: StreamEvent) {
        let event = Arc::new(event);
        #[allow(clippy::unwrap_used)]
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|tx| tx.try_send(Arc::clone(&event)).is_ok());
    }

    /// The most recent `limit` steps across all contexts, oldest first.
    #[must_use]
    pub fn recent_steps(&self, limit: usize) -> Vec<ReasoningStep> {
        #[allow(clippy::unwrap_used)]
        let inner = self.inner.lock().unwrap();
        inner.ring.iter().rev().take(limit).rev().cloned().collect()
    }

    /// Snapshot a context by id, if it exists.
    #[must_use]
    pub fn context(&self, context_id: &str) -> Option<ReasoningContext> {
        #[allow(clippy::unwrap_used)]
        self.inner.lock().unwrap().contexts.get(context_id).cloned()
    }

    /// The id of the context currently acting as the implicit default,
    /// if any context is active.
    #[must_use]
    pub fn default_context(&self) -> Option<String> {
        #[allow(clippy::unwrap_used)]
        self.inner.lock().unwrap().default_context.clone()
    }

    /// Current subscriber count.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        #[allow(clippy::unwrap_used)]
        self.inner.lock().unwrap().subscribers.len()
    }
}

impl Default for ReasoningStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn steps_attach_to_default_context() {
        let stream = ReasoningStream::new();
        let ctx_id = stream.begin_context("investigate flaky test");
        stream.add_step(StepBuilder::new("planner", "looking at logs"));
        let ctx = stream.context(&ctx_id).expect("context exists");
        assert_eq!(ctx.steps.len(), 1);
    }

    #[tokio::test]
    async fn ring_is_bounded() {
        let stream = ReasoningStream::with_ring_capacity(2);
        stream.add_step(StepBuilder::new("a", "one"));
        stream.add_step(StepBuilder::new("a", "two"));
        stream.add_step(StepBuilder::new("a", "three"));
        let recent = stream.recent_steps(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].thought, "two");
        assert_eq!(recent[1].thought, "three");
    }

    #[tokio::test]
    async fn subscriber_receives_steps_and_is_dropped_on_overflow() {
        let stream = ReasoningStream::new();
        let mut rx = stream.subscribe_with_capacity(1);
        stream.add_step(StepBuilder::new("a", "one"));
        let event = rx.recv().await.expect("event delivered");
        match &*event {
            StreamEvent::Step(step) => assert_eq!(step.thought, "one"),
            other => panic!("unexpected event: {other:?}"),
        }

        // Fill the channel without draining it, then publish again: the
        // subscriber should be dropped rather than block the publisher.
        stream.add_step(StepBuilder::new("a", "two"));
        stream.add_step(StepBuilder::new("a", "three"));
        assert_eq!(stream.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn end_context_persists_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stream = ReasoningStream::new().with_persist_dir(dir.path());
        let ctx_id = stream.begin_context("persist me");
        stream.add_step(StepBuilder::new("planner", "done"));
        stream.end_context(&ctx_id, ContextStatus::Completed).await.expect("end_context");

        let path = dir.path().join(format!("{ctx_id}.json"));
        let contents = tokio::fs::read_to_string(&path).await.expect("read persisted context");
        assert!(contents.contains("\"status\": \"completed\""));
    }

    #[tokio::test]
    async fn emergency_stop_reaches_subscribers() {
        let stream = ReasoningStream::new();
        let mut rx = stream.subscribe();
        stream.broadcast_emergency_stop("operator halted");
        let event = rx.recv().await.expect("event delivered");
        assert!(matches!(&*event, StreamEvent::EmergencyStop { reason } if reason == "operator halted"));
    }
}
