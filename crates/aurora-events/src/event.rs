//! Reasoning step/context types shared between the stream and its
//! subscribers.

use std::collections::HashMap;

use aurora_core::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a reasoning step, mirroring standard log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningLevel {
    /// Fine-grained internal detail.
    Debug,
    /// Normal progress narration.
    Info,
    /// A recoverable problem worth surfacing.
    Warning,
    /// An action failed.
    Error,
    /// The workflow itself is in jeopardy.
    Critical,
}

impl Default for ReasoningLevel {
    fn default() -> Self {
        Self::Info
    }
}

/// A single recorded thought in a reasoning chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// Immutable step id.
    pub id: String,
    /// When the step was recorded.
    pub timestamp: Timestamp,
    /// Severity.
    pub level: ReasoningLevel,
    /// Component that produced the step (e.g. `"planner"`, `"executor"`).
    pub component: String,
    /// The thought itself.
    pub thought: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    /// Alternatives the component considered and rejected.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Data sources consulted to reach this thought.
    #[serde(default)]
    pub data_sources: Vec<String>,
    /// Why this thought was reached, if distinct from `thought`.
    #[serde(default)]
    pub rationale: Option<String>,
    /// What the component intends to do next.
    #[serde(default)]
    pub next_steps: Vec<String>,
    /// Free-form structured metadata.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// The reasoning context this step belongs to, if any.
    #[serde(default)]
    pub context_id: Option<String>,
}

/// Builder-style constructor for [`ReasoningStep`] so callers don't have
/// to fill every optional field by hand.
pub struct StepBuilder {
    component: String,
    thought: String,
    level: ReasoningLevel,
    confidence: f32,
    alternatives: Vec<String>,
    data_sources: Vec<String>,
    rationale: Option<String>,
    next_steps: Vec<String>,
    metadata: HashMap<String, Value>,
    context_id: Option<String>,
}

impl StepBuilder {
    /// Start building a step for `component`'s `thought`.
    #[must_use]
    pub fn new(component: impl Into<String>, thought: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            thought: thought.into(),
            level: ReasoningLevel::Info,
            confidence: 1.0,
            alternatives: Vec::new(),
            data_sources: Vec::new(),
            rationale: None,
            next_steps: Vec::new(),
            metadata: HashMap::new(),
            context_id: None,
        }
    }

    /// Set the severity level.
    #[must_use]
    pub fn level(mut self, level: ReasoningLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the confidence, clamped to `[0, 1]`.
    #[must_use]
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Record alternatives that were considered and rejected.
    #[must_use]
    pub fn alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Record data sources consulted.
    #[must_use]
    pub fn data_sources(mut self, data_sources: Vec<String>) -> Self {
        self.data_sources = data_sources;
        self
    }

    /// Explain why, if distinct from the thought text.
    #[must_use]
    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Record intended next steps.
    #[must_use]
    pub fn next_steps(mut self, next_steps: Vec<String>) -> Self {
        self.next_steps = next_steps;
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach this step to a specific reasoning context.
    #[must_use]
    pub fn context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    pub(crate) fn build(self, id: String) -> ReasoningStep {
        ReasoningStep {
            id,
            timestamp: Timestamp::now(),
            level: self.level,
            component: self.component,
            thought: self.thought,
            confidence: self.confidence,
            alternatives: self.alternatives,
            data_sources: self.data_sources,
            rationale: self.rationale,
            next_steps: self.next_steps,
            metadata: self.metadata,
            context_id: self.context_id,
        }
    }
}

/// Lifecycle state of a [`ReasoningContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    /// Still accepting steps.
    Active,
    /// Finished successfully.
    Completed,
    /// Finished with a failure.
    Failed,
    /// Ended before completion.
    Cancelled,
}

/// A named span of reasoning steps bracketed by `begin_context`/
/// `end_context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningContext {
    /// Context id.
    pub id: String,
    /// What this context is reasoning about.
    pub task_description: String,
    /// When the context began.
    pub started_at: Timestamp,
    /// When the context ended, if it has.
    #[serde(default)]
    pub ended_at: Option<Timestamp>,
    /// Current status.
    pub status: ContextStatus,
    /// Steps recorded so far, in arrival order.
    #[serde(default)]
    pub steps: Vec<ReasoningStep>,
}

impl ReasoningContext {
    pub(crate) fn new(id: String, task_description: String) -> Self {
        Self {
            id,
            task_description,
            started_at: Timestamp::now(),
            ended_at: None,
            status: ContextStatus::Active,
            steps: Vec::new(),
        }
    }
}

/// Events delivered to stream subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// A new reasoning step was recorded.
    Step(ReasoningStep),
    /// A context reached a terminal state.
    ContextEnded {
        /// The context that ended.
        context_id: String,
        /// Its terminal status.
        status: ContextStatus,
    },
    /// The Control Plane issued an emergency stop.
    EmergencyStop {
        /// Human-readable reason.
        reason: String,
    },
}
