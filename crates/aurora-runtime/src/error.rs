//! Runtime error types for the Action Executor and Autonomous Planner.

use thiserror::Error;

/// Errors that can occur while executing an action or running a plan.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A browser-automation step failed.
    #[error("browser error: {0}")]
    Browser(String),

    /// A screen-capture or OCR step failed.
    #[error("vision error: {0}")]
    Vision(String),

    /// The LLM Router rejected or failed a call.
    #[error("llm error: {0}")]
    Llm(#[from] aurora_llm::LlmError),

    /// The CLI Task Broker or a built-in file/process tool failed.
    #[error("tools error: {0}")]
    Tools(#[from] aurora_tools::ToolsError),

    /// The Input Queue rejected or failed a mouse/keyboard action.
    #[error("input error: {0}")]
    Input(#[from] aurora_input::InputError),

    /// A capability was not authorized by policy.
    #[error("policy error: {0}")]
    Policy(#[from] aurora_policy::PolicyError),

    /// A plan's action budget was exhausted.
    #[error("action budget exhausted after {executed} actions")]
    BudgetExhausted {
        /// How many actions ran before the budget was hit.
        executed: usize,
    },

    /// The planner could not parse an action plan out of the LLM's reply.
    #[error("plan parse error: {0}")]
    PlanParse(String),

    /// An unknown action or plan id was requested.
    #[error("unknown id: {0}")]
    UnknownId(String),

    /// Serialization of runtime state failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An I/O operation (e.g. persisting plan state) failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Map to the cross-cutting error taxonomy used for propagation
    /// decisions (retry locally, bubble to caller, or treat as fatal).
    #[must_use]
    pub fn kind(&self) -> aurora_core::ErrorKind {
        match self {
            Self::Browser(_) => aurora_core::ErrorKind::Transport,
            Self::Vision(_) => aurora_core::ErrorKind::Transport,
            Self::Llm(err) => err.kind(),
            Self::Tools(err) => err.kind(),
            Self::Input(err) => err.kind(),
            Self::Policy(err) => err.kind(),
            Self::BudgetExhausted { .. } => aurora_core::ErrorKind::Resource,
            Self::PlanParse(_) => aurora_core::ErrorKind::Protocol,
            Self::UnknownId(_) => aurora_core::ErrorKind::Validation,
            Self::Serialization(_) => aurora_core::ErrorKind::Protocol,
            Self::Io(_) => aurora_core::ErrorKind::Resource,
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
