//! `aurora input` — submit an input-control action and poll its status.

use std::sync::Arc;

use anyhow::Result;
use aurora_audit::{AuditEvent, AuditSink};
use aurora_config::AuroraConfig;
use aurora_input::{EnigoBackend, InputAction, InputQueue, MouseButton};
use aurora_policy::PolicyGate;
use clap::Subcommand;

use crate::theme::Theme;

const CAPABILITY: &str = "control_mouse_keyboard";
const DEFAULT_SCREEN_SIZE: (i32, i32) = (1920, 1080);

/// `aurora input <command>`.
#[derive(Subcommand)]
pub enum InputCommand {
    /// Click at absolute screen coordinates.
    Click {
        /// Horizontal coordinate.
        x: i32,
        /// Vertical coordinate.
        y: i32,
    },
    /// Move the pointer to absolute screen coordinates.
    Move {
        /// Horizontal coordinate.
        x: i32,
        /// Vertical coordinate.
        y: i32,
    },
    /// Type literal text at the current input focus.
    Type {
        /// Text to type.
        text: String,
    },
}

/// Authorize, submit, and poll an [`InputCommand`] to completion.
pub async fn dispatch(config: &AuroraConfig, command: InputCommand) -> Result<()> {
    let policy_path = config.paths.policy_path();
    let policy_audit = AuditSink::open(config.paths.logs_path(), "policy").await?;
    let gate = PolicyGate::load(&policy_path).unwrap_or_else(|err| {
        policy_audit.emit(
            AuditEvent::system("policy.parse_failed", format!("{err}"))
                .with_meta("policy_path", policy_path.display().to_string()),
        );
        PolicyGate::from_policy(aurora_policy::Policy::locked_down())
    });
    if let Err(error) = gate.authorize(CAPABILITY) {
        println!("{}", Theme::error(&format!("unauthorized: {error}")));
        return Ok(());
    }

    let action = match command {
        InputCommand::Click { x, y } => InputAction::MouseClick { x, y, button: MouseButton::Left },
        InputCommand::Move { x, y } => InputAction::MouseMove { x, y },
        InputCommand::Type { text } => InputAction::KeyboardType { text },
    };

    let audit = AuditSink::open(config.paths.logs_path(), "input").await?;
    let backend = Arc::new(EnigoBackend::new(DEFAULT_SCREEN_SIZE));
    let queue = InputQueue::new(backend, audit);

    let id = queue.submit(action).await?;
    println!("{}", Theme::success(&format!("submitted input task {id}")));

    use aurora_input::InputTaskStatus;
    loop {
        let status = queue.status(&id).await?;
        let terminal = matches!(status, InputTaskStatus::Completed | InputTaskStatus::Failed(_));
        if terminal {
            println!("{}", Theme::info(&format!("{id}: {status:?}")));
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    let health = queue.health().await;
    println!("queue depth: {}, total submitted: {}", health.queue_depth, health.total);
    Ok(())
}
