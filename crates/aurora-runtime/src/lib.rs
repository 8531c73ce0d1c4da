//! Aurora Runtime: the Action Executor (C6) and Autonomous Planner (C7).
//!
//! This crate owns the closed [`Action`] vocabulary, the subsystems a
//! single action dispatches into (browser automation, desktop vision,
//! and — via `aurora-tools`/`aurora-input` — CLI/file/input), and the
//! planner that turns a goal into a sequence of actions, executes them,
//! recovers from failure, and auto-verifies each step.
//!
//! # Example
//!
//! ```rust,no_run
//! use aurora_runtime::action::Action;
//!
//! let action = Action::Wait { seconds: 1 };
//! assert_eq!(action.kind(), "wait");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod action;
pub mod browser;
pub mod error;
pub mod executor;
pub mod planner;
pub mod prelude;
pub mod verifier;
pub mod vision;

pub use action::{auto_verify, Action, ActionExtras, ActionResult, ScreenRegion};
pub use browser::BrowserDriver;
pub use error::{RuntimeError, RuntimeResult};
pub use executor::{required_capability, ActionExecutor};
pub use planner::{AutonomousPlanner, Workflow, WorkflowStatus, WorkflowStep, DEFAULT_ACTION_BUDGET};
pub use verifier::{LlmVerifier, Verifier};
pub use vision::{capture_screen, detect_elements, ocr_text, screenshot_path, UiElement};
