//! Identifiers shared across tasks, audit events, and the CLI broker.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a new random v4 UUID, rendered as a string.
///
/// Used for `CLITask`/`InputTask` ids and audit event ids, anywhere the
/// spec calls for an "opaque id (UUID)".
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The CLI agent a task is routed to (e.g. `claude`, `codex`).
///
/// Kept open-ended (`Other(String)`) rather than a closed enum: the broker
/// is configured with a set of agent binaries at startup and must accept
/// whatever the operator names in `aurora.toml`, not just the two agents
/// called out by name in the spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentTag {
    /// The `claude` CLI agent.
    Claude,
    /// The `codex` CLI agent.
    Codex,
    /// Any other agent binary named in configuration.
    Other(String),
}

impl Serialize for AgentTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AgentTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

impl fmt::Display for AgentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claude => f.write_str("claude"),
            Self::Codex => f.write_str("codex"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

impl From<&str> for AgentTag {
    fn from(value: &str) -> Self {
        match value {
            "claude" => Self::Claude,
            "codex" => Self::Codex,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Identifies the operator who authorized or issued a request.
///
/// Audit events record either the literal system actor or an operator id;
/// this newtype keeps the two from being confused with arbitrary strings
/// at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(String);

impl OperatorId {
    /// The reserved id used when an event was not caused by an operator
    /// action (heartbeat ticks, supervisor recovery, ...).
    #[must_use]
    pub fn system() -> Self {
        Self("system".to_string())
    }

    /// Wrap an operator-supplied identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn agent_tag_round_trips_known_names() {
        assert_eq!(AgentTag::from("claude"), AgentTag::Claude);
        assert_eq!(AgentTag::from("codex"), AgentTag::Codex);
        assert_eq!(AgentTag::from("gemini-cli").to_string(), "gemini-cli");
    }

    #[test]
    fn operator_id_system_is_stable() {
        assert_eq!(OperatorId::system().as_str(), "system");
    }
}
