//! The Action Executor (C6): dispatches one typed [`Action`] to the
//! subsystem that owns its side effect, gates privileged kinds behind
//! the Policy Gate, and always emits an audit event.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use aurora_audit::{AuditEvent, AuditSink};
use aurora_core::{OperatorId, Timestamp};
use aurora_input::{InputAction, InputQueue, MouseButton as InputMouseButton};
use aurora_policy::PolicyGate;
use aurora_tools::{file_delete, file_read, file_write, run_cli_execute};
use serde_json::{json, Value};
use tracing::warn;

use crate::action::{Action, ActionResult};
use crate::browser::BrowserDriver;
use crate::error::RuntimeResult;
use crate::verifier::Verifier;
use crate::vision::{capture_screen, detect_elements, ocr_text, screenshot_path};

/// The capability an [`Action`] kind is gated behind, if any.
#[must_use]
pub fn required_capability(action: &Action) -> Option<&'static str> {
    match action {
        Action::MouseClick { .. } | Action::MouseMove { .. } | Action::KeyboardType { .. } => {
            Some("control_mouse_keyboard")
        },
        Action::Screenshot { .. } | Action::VisionAnalyze { .. } => Some("vision_agent"),
        Action::WebNavigate { .. } | Action::WebClick { .. } | Action::WebType { .. } | Action::WebExtract { .. } => {
            Some("stealth_browsing")
        },
        Action::CliExecute { .. }
        | Action::FileRead { .. }
        | Action::FileWrite { .. }
        | Action::FileDelete { .. }
        | Action::Wait { .. }
        | Action::Verify { .. } => None,
    }
}

/// Dispatches every [`Action`] kind, wiring in the browser, vision,
/// input, CLI/file, and LLM subsystems.
pub struct ActionExecutor {
    policy: Arc<PolicyGate>,
    browser: BrowserDriver,
    input: Arc<InputQueue>,
    verifier: Arc<dyn Verifier>,
    audit: AuditSink,
    screenshot_dir: PathBuf,
}

impl ActionExecutor {
    /// Build an executor wired to already-constructed subsystems.
    pub fn new(
        policy: Arc<PolicyGate>,
        input: Arc<InputQueue>,
        verifier: Arc<dyn Verifier>,
        audit: AuditSink,
        screenshot_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { policy, browser: BrowserDriver::new(), input, verifier, audit, screenshot_dir: screenshot_dir.into() }
    }

    /// Dispatch `action`, recording timing and an audit event
    /// regardless of outcome. Never returns `Err`: failures are carried
    /// in [`ActionResult::error`], per the "does not raise" contract.
    /// `history` is only consulted by the `verify` kind.
    pub async fn execute(&self, action: &Action, operator: &OperatorId, history: &str) -> ActionResult {
        let started_at = Timestamp::now();
        let started = Instant::now();

        let outcome = self.dispatch(action, history).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = match outcome {
            Ok(data) => ActionResult::ok(started_at, duration_ms, data),
            Err(err) => ActionResult::failed(started_at, duration_ms, err.to_string()),
        };

        self.audit.emit(
            AuditEvent::operator(operator.as_str(), action.kind(), "action executed")
                .with_meta("duration_ms", duration_ms)
                .with_meta("ok", result.is_ok()),
        );

        result
    }

    async fn dispatch(&self, action: &Action, history: &str) -> RuntimeResult<Value> {
        if let Some(capability) = required_capability(action) {
            self.policy.authorize(capability)?;
        }

        match action {
            Action::WebNavigate { url, wait_ms } => {
                let (final_url, title) = self.browser.navigate(url, *wait_ms).await?;
                Ok(json!({ "url": final_url, "title": title }))
            },
            Action::WebClick { selector } => {
                self.browser.click(selector).await?;
                Ok(json!({ "ok": true }))
            },
            Action::WebType { selector, text } => {
                self.browser.type_into(selector, text).await?;
                Ok(json!({ "ok": true }))
            },
            Action::WebExtract { selector } => {
                let text = self.browser.extract(selector).await?;
                Ok(json!({ "text": text }))
            },
            Action::CliExecute { command, timeout_sec } => {
                let timeout = timeout_sec.unwrap_or(aurora_tools::DEFAULT_TIMEOUT_SEC);
                let result = run_cli_execute(command, timeout, None).await?;
                Ok(json!({
                    "stdout": result.stdout,
                    "stderr": result.stderr,
                    "returncode": result.returncode,
                }))
            },
            Action::FileRead { path } => {
                let content = file_read(Path::new(path)).await?;
                Ok(json!({ "content": content }))
            },
            Action::FileWrite { path, content } => {
                let bytes_written = file_write(Path::new(path), content).await?;
                Ok(json!({ "bytes_written": bytes_written }))
            },
            Action::FileDelete { path } => {
                file_delete(Path::new(path)).await?;
                Ok(json!({ "ok": true }))
            },
            Action::Screenshot { region } => {
                let path = screenshot_path(&self.screenshot_dir, &aurora_core::new_id());
                capture_screen(&path, region.as_ref()).await?;
                Ok(json!({ "path": path, "timestamp": Timestamp::now() }))
            },
            Action::VisionAnalyze { region, detect_elements: want_elements } => {
                let path = screenshot_path(&self.screenshot_dir, &aurora_core::new_id());
                capture_screen(&path, region.as_ref()).await?;
                let ocr_text = ocr_text(&path).await?;
                let ui_elements = if *want_elements { detect_elements(&path).await? } else { Vec::new() };
                Ok(json!({
                    "ocr_text": ocr_text,
                    "ui_elements": ui_elements,
                    "screenshot_path": path,
                }))
            },
            Action::MouseClick { x, y, button } => {
                let button = parse_button(button.as_deref());
                let id = self.input.submit(InputAction::MouseClick { x: *x, y: *y, button }).await?;
                Ok(json!({ "task_id": id }))
            },
            Action::MouseMove { x, y } => {
                let id = self.input.submit(InputAction::MouseMove { x: *x, y: *y }).await?;
                Ok(json!({ "task_id": id }))
            },
            Action::KeyboardType { text } => {
                let id = self.input.submit(InputAction::KeyboardType { text: text.clone() }).await?;
                Ok(json!({ "task_id": id }))
            },
            Action::Wait { seconds } => {
                tokio::time::sleep(std::time::Duration::from_secs(*seconds)).await;
                Ok(json!({ "waited_seconds": seconds }))
            },
            Action::Verify { condition } => self.verifier.verify(condition, history).await,
        }
    }
}

fn parse_button(raw: Option<&str>) -> InputMouseButton {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("right") => InputMouseButton::Right,
        Some("middle") => InputMouseButton::Middle,
        Some(other) if other != "left" => {
            warn!(button = other, "unknown mouse button, defaulting to left");
            InputMouseButton::Left
        },
        _ => InputMouseButton::Left,
    }
}
