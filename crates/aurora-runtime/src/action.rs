//! The closed Action vocabulary the Action Executor dispatches (spec §4.6).

use std::collections::HashMap;

use aurora_core::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A screen region, used by `screenshot` and `vision_analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenRegion {
    /// Left edge, in pixels.
    pub x: i32,
    /// Top edge, in pixels.
    pub y: i32,
    /// Width, in pixels.
    pub width: i32,
    /// Height, in pixels.
    pub height: i32,
}

/// The smallest unit of observable side effect a workflow performs.
///
/// This is a closed vocabulary, not an open tool-calling surface: a
/// planner emits one of these exact fourteen kinds, the executor
/// dispatches it, nothing registers new kinds at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Drive the browser to `url`, then wait `wait_ms` before returning.
    WebNavigate {
        /// Destination URL.
        url: String,
        /// Milliseconds to wait after navigation before returning.
        #[serde(default)]
        wait_ms: Option<u64>,
    },
    /// Click the first element matching `selector`.
    WebClick {
        /// CSS selector.
        selector: String,
    },
    /// Type `text` into the first element matching `selector`.
    WebType {
        /// CSS selector.
        selector: String,
        /// Text to type.
        text: String,
    },
    /// Read the inner text of the first element matching `selector`.
    WebExtract {
        /// CSS selector.
        selector: String,
    },
    /// Run `command` as a subprocess with a wall-clock `timeout_sec`.
    CliExecute {
        /// Shell command line.
        command: String,
        /// Wall-clock timeout in seconds.
        #[serde(default)]
        timeout_sec: Option<u64>,
    },
    /// Read the full contents of `path`.
    FileRead {
        /// Filesystem path.
        path: String,
    },
    /// Write `content` to `path`.
    FileWrite {
        /// Filesystem path.
        path: String,
        /// Content to write.
        content: String,
    },
    /// Delete `path`.
    FileDelete {
        /// Filesystem path.
        path: String,
    },
    /// Capture a frame, optionally cropped to `region`.
    Screenshot {
        /// Optional crop region; the full screen/viewport otherwise.
        #[serde(default)]
        region: Option<ScreenRegion>,
    },
    /// OCR plus a layout heuristic over a captured frame.
    VisionAnalyze {
        /// Optional crop region.
        #[serde(default)]
        region: Option<ScreenRegion>,
        /// Whether to also emit heuristic UI element bounding boxes.
        #[serde(default)]
        detect_elements: bool,
    },
    /// Click at absolute screen coordinates.
    MouseClick {
        /// Horizontal coordinate.
        x: i32,
        /// Vertical coordinate.
        y: i32,
        /// Which mouse button; defaults to the primary button.
        #[serde(default)]
        button: Option<String>,
    },
    /// Move the pointer to absolute screen coordinates.
    MouseMove {
        /// Horizontal coordinate.
        x: i32,
        /// Vertical coordinate.
        y: i32,
    },
    /// Type literal text at the current input focus.
    KeyboardType {
        /// Text to type.
        text: String,
    },
    /// Sleep for `seconds`.
    Wait {
        /// Seconds to sleep.
        seconds: u64,
    },
    /// Ask the LLM to judge a natural-language condition against recent
    /// reasoning history.
    Verify {
        /// The condition to check, in natural language.
        condition: String,
    },
}

impl Action {
    /// The `kind` discriminator, as it appears on the wire.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WebNavigate { .. } => "web_navigate",
            Self::WebClick { .. } => "web_click",
            Self::WebType { .. } => "web_type",
            Self::WebExtract { .. } => "web_extract",
            Self::CliExecute { .. } => "cli_execute",
            Self::FileRead { .. } => "file_read",
            Self::FileWrite { .. } => "file_write",
            Self::FileDelete { .. } => "file_delete",
            Self::Screenshot { .. } => "screenshot",
            Self::VisionAnalyze { .. } => "vision_analyze",
            Self::MouseClick { .. } => "mouse_click",
            Self::MouseMove { .. } => "mouse_move",
            Self::KeyboardType { .. } => "keyboard_type",
            Self::Wait { .. } => "wait",
            Self::Verify { .. } => "verify",
        }
    }
}

/// Outcome of one dispatched [`Action`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// When the executor started the action.
    pub started_at: Timestamp,
    /// Wall-clock duration.
    pub duration_ms: u64,
    /// Kind-specific result payload on success.
    #[serde(default)]
    pub data: Value,
    /// Populated on failure; the executor never raises, it records this.
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionResult {
    /// Whether this result represents success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Build a successful result from a structured payload.
    #[must_use]
    pub fn ok(started_at: Timestamp, duration_ms: u64, data: Value) -> Self {
        Self { started_at, duration_ms, data, error: None }
    }

    /// Build a failed result. The error is recorded, not raised.
    #[must_use]
    pub fn failed(started_at: Timestamp, duration_ms: u64, error: impl Into<String>) -> Self {
        Self { started_at, duration_ms, data: Value::Null, error: Some(error.into()) }
    }
}

/// Kind-specific auto-verify rule, run after every non-`verify` action.
///
/// Returns `(passed, reason)`; a failure is a warning signal recorded in
/// the reasoning chain, not an abort.
#[must_use]
pub fn auto_verify(action: &Action, result: &ActionResult) -> (bool, String) {
    if !result.is_ok() {
        return (false, result.error.clone().unwrap_or_else(|| "action failed".to_string()));
    }

    match action {
        Action::CliExecute { .. } => {
            let returncode = result.data.get("returncode").and_then(Value::as_i64);
            match returncode {
                Some(0) => (true, "returncode 0".to_string()),
                Some(other) => (false, format!("returncode {other}")),
                None => (false, "no returncode reported".to_string()),
            }
        },
        Action::FileWrite { .. } => {
            let wrote = result.data.get("bytes_written").and_then(Value::as_u64).is_some();
            if wrote {
                (true, "bytes_written present".to_string())
            } else {
                (false, "no bytes_written in result".to_string())
            }
        },
        Action::WebExtract { .. } => {
            let has_text = result.data.get("text").and_then(Value::as_str).is_some_and(|s| !s.is_empty());
            if has_text {
                (true, "non-empty extraction".to_string())
            } else {
                (false, "empty extraction".to_string())
            }
        },
        _ => (true, "no kind-specific rule, treated as passed".to_string()),
    }
}

/// Metadata carried alongside an action inside a workflow's plan — the
/// raw JSON fields an untyped planner response might include that don't
/// map onto [`Action`]'s fields, preserved for the reasoning log.
pub type ActionExtras = HashMap<String, Value>;
