//! `aurora autonomous` — drive a single goal through the Autonomous
//! Planner to completion, wiring up the minimum collaborators it needs.

use std::sync::Arc;

use anyhow::Result;
use aurora_audit::{AuditEvent, AuditSink};
use aurora_config::AuroraConfig;
use aurora_events::ReasoningStream;
use aurora_input::{EnigoBackend, InputQueue};
use aurora_policy::PolicyGate;
use aurora_runtime::{ActionExecutor, AutonomousPlanner, LlmVerifier};

use crate::commands::llm::build_router;
use crate::theme::Theme;

/// Run `goal` to completion and print the terminal workflow summary.
pub async fn run(config: &AuroraConfig, goal: &str) -> Result<()> {
    let policy_path = config.paths.policy_path();
    let logs_dir = config.paths.logs_path();
    let policy_audit = AuditSink::open(&logs_dir, "policy").await?;
    let gate = Arc::new(PolicyGate::load(&policy_path).unwrap_or_else(|err| {
        policy_audit.emit(
            AuditEvent::system("policy.parse_failed", format!("{err}"))
                .with_meta("policy_path", policy_path.display().to_string()),
        );
        PolicyGate::from_policy(aurora_policy::Policy::locked_down())
    }));

    let executor_audit = AuditSink::open(&logs_dir, "executor").await?;
    let input_audit = AuditSink::open(&logs_dir, "input").await?;

    let backend = Arc::new(EnigoBackend::new((1920, 1080)));
    let input = InputQueue::new(backend, input_audit);

    // Shares the same provider-family resolution as `aurora llm generate`,
    // including the always-available local Ollama fallback so `verify`
    // has something to call even with zero cloud credentials configured.
    let router = Arc::new(build_router(config));
    let verifier = Arc::new(LlmVerifier::new(Arc::clone(&router)));

    let executor = Arc::new(ActionExecutor::new(
        gate,
        input,
        verifier,
        executor_audit,
        logs_dir.join("screenshots"),
    ));

    let reasoning = Arc::new(ReasoningStream::new());
    let planner = AutonomousPlanner::new(router, executor, reasoning, logs_dir.join("workflows"));

    let workflow = planner.run(goal).await?;
    println!("{}", Theme::header(&format!("workflow {} — {:?}", workflow.id, workflow.status)));
    println!(
        "{} completed, {} failed, of {} steps",
        workflow.completed_count,
        workflow.failed_count,
        workflow.steps.len()
    );
    if let Some(error) = &workflow.final_error {
        println!("{}", Theme::error(error));
    }
    Ok(())
}
