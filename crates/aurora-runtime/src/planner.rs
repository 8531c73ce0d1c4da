//! The Autonomous Planner (C7): goal → action list via the LLM Router,
//! driven through the Action Executor, with per-action recovery and
//! auto-verification.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aurora_core::{new_id, OperatorId, TaskClass, Timestamp};
use aurora_events::{ContextStatus, ReasoningLevel, ReasoningStream, StepBuilder};
use aurora_llm::{LlmRequest, LlmRouter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::action::{auto_verify, Action, ActionResult};
use crate::error::{RuntimeError, RuntimeResult};
use crate::executor::ActionExecutor;

/// Default ceiling on how many actions one workflow may execute.
pub const DEFAULT_ACTION_BUDGET: usize = 50;
/// Default depth of the rolling goal/result history kept per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;
/// How many substitute actions recovery asks the LLM Router for.
const RECOVERY_ATTEMPTS: usize = 3;

/// Lifecycle state of a [`Workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// The plan is being produced.
    Planning,
    /// Actions are being executed in order.
    Executing,
    /// Auto-verification is running against the last action.
    Verifying,
    /// Every action ran (or was skipped) without an unrecovered failure.
    Completed,
    /// Recovery was exhausted for some action; the workflow stopped.
    Failed,
    /// Reserved for a future pause/resume control surface.
    Paused,
}

/// One action plus its recorded outcome inside a [`Workflow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// The action that ran.
    pub action: Action,
    /// Its result, once executed.
    pub result: Option<ActionResult>,
    /// Whether this step was a recovery substitute for a prior failure.
    #[serde(default)]
    pub is_recovery: bool,
}

/// The unit of work the planner owns end to end: a goal, the plan it
/// produced, and the running ledger of what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique id.
    pub id: String,
    /// The original natural-language goal.
    pub original_request: String,
    /// Current lifecycle state.
    pub status: WorkflowStatus,
    /// The ordered action plan, including recovery substitutes appended
    /// in place of a failed action.
    pub steps: Vec<WorkflowStep>,
    /// Index of the next action to execute.
    pub current_index: usize,
    /// How many actions completed (auto-verify passed or not attempted).
    pub completed_count: usize,
    /// How many actions failed even after recovery.
    pub failed_count: usize,
    /// Ordered human-readable narration of planning/execution/verify.
    pub reasoning_chain: Vec<String>,
    /// Set once the workflow reaches a terminal state.
    pub final_error: Option<String>,
    /// When the workflow was created.
    pub created_at: Timestamp,
    /// When the workflow reached a terminal state.
    pub completed_at: Option<Timestamp>,
}

impl Workflow {
    fn new(original_request: String) -> Self {
        Self {
            id: new_id(),
            original_request,
            status: WorkflowStatus::Planning,
            steps: Vec::new(),
            current_index: 0,
            completed_count: 0,
            failed_count: 0,
            reasoning_chain: Vec::new(),
            final_error: None,
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    fn note(&mut self, message: impl Into<String>) {
        self.reasoning_chain.push(message.into());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntry {
    goal: String,
    result: String,
    timestamp: Timestamp,
}

/// A bounded rolling history of goal/result pairs per session,
/// independent of the Reasoning Stream's ring buffer. Gives the
/// `verify` action kind recent context beyond the current workflow.
struct ConversationWindow {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl ConversationWindow {
    fn new(capacity: usize) -> Self {
        Self { capacity, entries: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    async fn record(&self, goal: &str, result: &str) {
        let mut entries = self.entries.lock().await;
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(HistoryEntry { goal: goal.to_string(), result: result.to_string(), timestamp: Timestamp::now() });
    }

    async fn recent_text(&self, limit: usize) -> String {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .rev()
            .take(limit)
            .map(|entry| format!("- goal: {}\n  result: {}", entry.goal, entry.result))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Drives a goal through Plan → Execute → Auto-verify → Persist.
pub struct AutonomousPlanner {
    llm: Arc<LlmRouter>,
    executor: Arc<ActionExecutor>,
    reasoning: Arc<ReasoningStream>,
    history: ConversationWindow,
    persist_dir: PathBuf,
    action_budget: usize,
    operator: OperatorId,
    active_workflows: AtomicUsize,
}

impl AutonomousPlanner {
    /// Build a planner wired to the Action Executor, LLM Router, and
    /// Reasoning Stream, persisting terminal workflows under
    /// `persist_dir`.
    pub fn new(
        llm: Arc<LlmRouter>,
        executor: Arc<ActionExecutor>,
        reasoning: Arc<ReasoningStream>,
        persist_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            llm,
            executor,
            reasoning,
            history: ConversationWindow::new(DEFAULT_HISTORY_CAPACITY),
            persist_dir: persist_dir.into(),
            action_budget: DEFAULT_ACTION_BUDGET,
            operator: OperatorId::system(),
            active_workflows: AtomicUsize::new(0),
        }
    }

    /// Override the default action budget (50).
    #[must_use]
    pub fn with_action_budget(mut self, budget: usize) -> Self {
        self.action_budget = budget;
        self
    }

    /// Run a goal to completion, returning the terminal [`Workflow`].
    pub async fn run(&self, goal: &str) -> RuntimeResult<Workflow> {
        self.active_workflows.fetch_add(1, Ordering::SeqCst);
        let outcome = self.run_inner(goal).await;
        self.active_workflows.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    /// How many workflows this planner is currently driving.
    #[must_use]
    pub fn active_workflow_count(&self) -> usize {
        self.active_workflows.load(Ordering::SeqCst)
    }

    async fn run_inner(&self, goal: &str) -> RuntimeResult<Workflow> {
        let context_id = self.reasoning.begin_context(format!("plan: {goal}"));
        let mut workflow = Workflow::new(goal.to_string());

        let plan = self.plan(goal, &context_id).await;
        workflow.steps = plan.into_iter().map(|action| WorkflowStep { action, result: None, is_recovery: false }).collect();
        workflow.status = WorkflowStatus::Executing;

        let mut index = 0;
        while index < workflow.steps.len() {
            let action = workflow.steps[index].action.clone();
            self.reasoning.add_step(
                StepBuilder::new("planner", format!("executing {} ({})", action.kind(), index + 1))
                    .context(context_id.clone()),
            );

            let history = self.history.recent_text(10).await;
            let result = self.executor.execute(&action, &self.operator, &history).await;
            self.history.record(goal, &result_summary(&result)).await;

            if result.is_ok() {
                workflow.steps[index].result = Some(result.clone());
                workflow.completed_count += 1;
                self.auto_verify_step(&mut workflow, &action, &result, &context_id);
                index += 1;
                continue;
            }

            workflow.note(format!("action {} failed: {}", action.kind(), result.error.clone().unwrap_or_default()));
            match self.recover(&workflow, &action, goal, &context_id).await {
                Some((recovered_action, recovered_result)) => {
                    workflow.steps[index].result = Some(result);
                    workflow.steps.insert(
                        index + 1,
                        WorkflowStep { action: recovered_action.clone(), result: Some(recovered_result.clone()), is_recovery: true },
                    );
                    workflow.completed_count += 1;
                    self.auto_verify_step(&mut workflow, &recovered_action, &recovered_result, &context_id);
                    index += 2;
                },
                None => {
                    workflow.steps[index].result = Some(result);
                    workflow.failed_count += 1;
                    workflow.status = WorkflowStatus::Failed;
                    workflow.final_error = Some(format!("recovery exhausted for action {}", action.kind()));
                    workflow.note("recovery exhausted, workflow failed");
                    break;
                },
            }
        }

        if workflow.status != WorkflowStatus::Failed {
            workflow.status = WorkflowStatus::Completed;
        }
        workflow.current_index = index.min(workflow.steps.len());
        workflow.completed_at = Some(Timestamp::now());

        self.reasoning
            .end_context(
                &context_id,
                if workflow.status == WorkflowStatus::Completed { ContextStatus::Completed } else { ContextStatus::Failed },
            )
            .await
            .ok();

        self.persist(&workflow).await?;
        Ok(workflow)
    }

    async fn plan(&self, goal: &str, context_id: &str) -> Vec<Action> {
        let prompt = planner_prompt(goal);
        let request = LlmRequest::new(prompt).with_task_class(TaskClass::Reasoning);
        let response = self.llm.generate(&request).await;

        self.reasoning.add_step(
            StepBuilder::new("planner", "produced a plan").level(ReasoningLevel::Info).context(context_id.to_string()),
        );

        match parse_action_plan(&response.output_text) {
            Ok(actions) if !actions.is_empty() => actions.into_iter().take(self.action_budget).collect(),
            _ => {
                warn!(goal, "plan parse failed, falling back to a single cli_execute action");
                vec![Action::CliExecute { command: goal.to_string(), timeout_sec: None }]
            },
        }
    }

    fn auto_verify_step(&self, workflow: &mut Workflow, action: &Action, result: &ActionResult, context_id: &str) {
        if matches!(action, Action::Verify { .. }) {
            return;
        }
        let (passed, reason) = auto_verify(action, result);
        workflow.note(format!("auto-verify {}: {} ({})", action.kind(), passed, reason));
        self.reasoning.add_step(
            StepBuilder::new("planner", format!("auto-verify {}: {reason}", action.kind()))
                .level(if passed { ReasoningLevel::Info } else { ReasoningLevel::Warning })
                .context(context_id.to_string()),
        );
    }

    async fn recover(
        &self,
        workflow: &Workflow,
        failed_action: &Action,
        goal: &str,
        context_id: &str,
    ) -> Option<(Action, ActionResult)> {
        let history = self.history.recent_text(10).await;
        let prompt = recovery_prompt(goal, failed_action, &history);
        let request = LlmRequest::new(prompt).with_task_class(TaskClass::Reasoning);
        let response = self.llm.generate(&request).await;

        let candidates = parse_action_plan(&response.output_text).unwrap_or_default();
        for candidate in candidates.into_iter().take(RECOVERY_ATTEMPTS) {
            self.reasoning.add_step(
                StepBuilder::new("planner", format!("recovery attempt: {}", candidate.kind())).context(context_id.to_string()),
            );
            let result = self.executor.execute(&candidate, &self.operator, &history).await;
            if result.is_ok() {
                info!(workflow_id = %workflow.id, kind = candidate.kind(), "recovery succeeded");
                return Some((candidate, result));
            }
        }
        None
    }

    async fn persist(&self, workflow: &Workflow) -> RuntimeResult<()> {
        tokio::fs::create_dir_all(&self.persist_dir).await.map_err(RuntimeError::Io)?;
        let path = self.persist_dir.join(format!("{}.json", workflow.id));
        let body = serde_json::to_vec_pretty(workflow).map_err(|err| RuntimeError::Serialization(err.to_string()))?;
        tokio::fs::write(path, body).await.map_err(RuntimeError::Io)
    }
}

fn result_summary(result: &ActionResult) -> String {
    if result.is_ok() {
        result.data.to_string()
    } else {
        result.error.clone().unwrap_or_else(|| "unknown error".to_string())
    }
}

fn planner_prompt(goal: &str) -> String {
    format!(
        "You are planning actions for an autonomous workstation. The closed action \
         vocabulary is: web_navigate, web_click, web_type, web_extract, cli_execute, \
         file_read, file_write, file_delete, screenshot, vision_analyze, mouse_click, \
         mouse_move, keyboard_type, wait, verify. Respond with ONLY a JSON array of \
         action objects, each with a \"kind\" field and kind-specific parameters.\n\n\
         Goal: {goal}"
    )
}

fn recovery_prompt(goal: &str, failed_action: &Action, history: &str) -> String {
    format!(
        "An action failed while pursuing a goal. Propose up to {RECOVERY_ATTEMPTS} \
         substitute actions as a JSON array, in the same closed action vocabulary, \
         most likely to succeed first.\n\nGoal: {goal}\nFailed action kind: {}\n\
         Recent history:\n{history}",
        failed_action.kind()
    )
}

/// Parse a tolerant JSON-array plan out of `text`: extracts the first
/// top-level `[...]` even when surrounded by prose, per spec.md §4.7.
fn parse_action_plan(text: &str) -> RuntimeResult<Vec<Action>> {
    let start = text.find('[').ok_or_else(|| RuntimeError::PlanParse("no '[' found".to_string()))?;
    let end = matching_bracket(text, start).ok_or_else(|| RuntimeError::PlanParse("unbalanced '['".to_string()))?;
    let slice = &text[start..=end];
    let raw: Vec<Value> = serde_json::from_str(slice).map_err(|err| RuntimeError::PlanParse(err.to_string()))?;
    raw.into_iter()
        .map(|value| serde_json::from_value(value).map_err(|err| RuntimeError::PlanParse(err.to_string())))
        .collect()
}

fn matching_bracket(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            },
            _ => {},
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_surrounded_by_prose() {
        let text = "Here is the plan:\n[{\"kind\":\"wait\",\"seconds\":1}]\nHope that helps!";
        let actions = parse_action_plan(text).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::Wait { seconds: 1 }));
    }

    #[test]
    fn rejects_text_with_no_array() {
        assert!(parse_action_plan("no plan here").is_err());
    }

    #[test]
    fn matching_bracket_handles_nested_arrays() {
        let text = "[[1,2],[3,4]]";
        assert_eq!(matching_bracket(text, 0), Some(text.len() - 1));
    }
}
