//! Commonly used types for convenient import.
//!
//! ```rust,no_run
//! use aurora_runtime::prelude::*;
//! ```

pub use crate::{
    auto_verify, Action, ActionExecutor, ActionExtras, ActionResult, AutonomousPlanner, BrowserDriver, RuntimeError,
    RuntimeResult, ScreenRegion, UiElement, Workflow, WorkflowStatus, WorkflowStep,
};
