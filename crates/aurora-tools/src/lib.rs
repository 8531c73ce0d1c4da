#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! The CLI Task Broker and the built-in file/process Action primitives.
//!
//! This crate owns two things: the per-agent, concurrency-1 broker that
//! runs external coding-agent CLIs (`claude`, `codex`, ...) as
//! subprocesses, and the plain `file_read`/`file_write`/`file_delete`/
//! `cli_execute` building blocks the Action Executor dispatches into.
//! The open-ended, LLM-facing tool-calling surface the teacher crate
//! exposed (glob/grep/edit/spawn-subagent) has no counterpart here: an
//! Action's kind is already a parsed, typed value, not a tool name an
//! LLM picks at runtime.

mod broker;
mod cli_execute;
mod error;
mod file_ops;

pub use broker::{
    command_template_env_var, load_command_templates_from_env, CliTaskBroker, CliTaskSnapshot,
    TaskStatus, DEFAULT_RING_CAPACITY, DEFAULT_TIMEOUT_SEC as BROKER_DEFAULT_TIMEOUT_SEC,
};
pub use cli_execute::{run_cli_execute, CliExecuteResult, DEFAULT_TIMEOUT_SEC, MAX_TIMEOUT_SEC};
pub use error::{ToolsError, ToolsResult};
pub use file_ops::{file_delete, file_read, file_write};
