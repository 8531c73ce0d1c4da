//! The task-class taxonomy shared by the LLM Router's provider preference
//! table and the autonomous planner's routing of sub-goals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classifies an LLM request so the router can consult a per-class
/// provider preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskClass {
    /// General multi-step reasoning; the planner's own default.
    Reasoning,
    /// Writing new code.
    CodeGeneration,
    /// Reviewing or critiquing existing code.
    CodeReview,
    /// Open-ended analysis of text, data, or logs.
    Analysis,
    /// Free-form conversational exchange.
    Conversation,
    /// Condensing long input into a shorter form.
    Summarization,
    /// A request destined for the CLI task broker rather than a chat model.
    CliCommand,
    /// Requests that need a large context window.
    LongContext,
    /// Numeric or symbolic computation.
    Math,
}

impl TaskClass {
    /// All known task classes, in the order they appear in configuration
    /// examples. Used to validate a preference table covers every class.
    #[must_use]
    pub fn all() -> &'static [TaskClass] {
        &[
            Self::Reasoning,
            Self::CodeGeneration,
            Self::CodeReview,
            Self::Analysis,
            Self::Conversation,
            Self::Summarization,
            Self::CliCommand,
            Self::LongContext,
            Self::Math,
        ]
    }

    /// The class used when a request omits `task_class` or names one the
    /// preference table has no entry for.
    #[must_use]
    pub fn default_fallback() -> Self {
        Self::Reasoning
    }
}

impl Default for TaskClass {
    fn default() -> Self {
        Self::default_fallback()
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reasoning => "reasoning",
            Self::CodeGeneration => "code_generation",
            Self::CodeReview => "code_review",
            Self::Analysis => "analysis",
            Self::Conversation => "conversation",
            Self::Summarization => "summarization",
            Self::CliCommand => "cli_command",
            Self::LongContext => "long_context",
            Self::Math => "math",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fallback_is_reasoning() {
        assert_eq!(TaskClass::default(), TaskClass::Reasoning);
    }

    #[test]
    fn all_contains_every_variant_once() {
        assert_eq!(TaskClass::all().len(), 9);
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(TaskClass::CodeGeneration.to_string(), "code_generation");
    }
}
