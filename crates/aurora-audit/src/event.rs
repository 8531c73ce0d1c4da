//! The audit event record.

use std::collections::HashMap;

use aurora_core::{OperatorId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable audit record.
///
/// Serialized as one complete JSON object per line. Events are never
/// mutated or deleted once written; a subsystem that needs to correct
/// the record writes a new event rather than editing an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// UTC timestamp, millisecond precision.
    pub timestamp: Timestamp,
    /// `"system"` or an operator id.
    pub actor: String,
    /// Short action name (e.g. `"cli_task.completed"`, `"policy.denied"`).
    pub action: String,
    /// Free-text human-readable message.
    pub message: String,
    /// Arbitrary structured metadata (prompt hash, duration, exit code,
    /// `fallback_from`, ...).
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl AuditEvent {
    /// Build an event attributed to the system actor (heartbeat ticks,
    /// supervisor recovery, and other non-operator-initiated activity).
    #[must_use]
    pub fn system(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Timestamp::now(),
            actor: OperatorId::system().to_string(),
            action: action.into(),
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    /// Build an event attributed to a specific operator.
    #[must_use]
    pub fn operator(
        operator: &OperatorId,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Timestamp::now(),
            actor: operator.to_string(),
            action: action.into(),
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata field, builder-style.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Render as a single JSONL line, including the trailing newline.
    ///
    /// Never panics: a serialization failure (which should not be
    /// reachable for this type) falls back to a minimal escaped line
    /// rather than losing the event outright.
    #[must_use]
    pub fn to_jsonl_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(err) => {
                format!(
                    "{{\"timestamp\":\"{}\",\"actor\":\"system\",\"action\":\"audit.serialize_failed\",\"message\":\"{err}\",\"metadata\":{{}}}}\n",
                    self.timestamp
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_event_has_system_actor() {
        let event = AuditEvent::system("heartbeat.tick", "ok");
        assert_eq!(event.actor, "system");
    }

    #[test]
    fn jsonl_line_is_single_line_and_parses_back() {
        let event = AuditEvent::system("policy.denied", "capability denied")
            .with_meta("capability", "vision_agent");
        let line = event.to_jsonl_line();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        let parsed: AuditEvent = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed.action, "policy.denied");
        assert_eq!(parsed.metadata["capability"], "vision_agent");
    }
}
