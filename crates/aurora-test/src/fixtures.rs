//! Ready-made values for the cross-cutting types every crate's tests
//! otherwise have to construct by hand.

use aurora_core::{AgentTag, OperatorId, TaskClass};
use aurora_policy::{Policy, PolicyGate, KNOWN_CAPABILITIES};

/// A fresh, unique agent id string, the way `aurora_core::new_id`
/// produces one.
#[must_use]
pub fn test_agent_tag() -> AgentTag {
    AgentTag::Claude
}

/// A stable operator id for tests that need identity but not
/// uniqueness.
#[must_use]
pub fn test_operator_id() -> OperatorId {
    OperatorId::new("test-operator")
}

/// The task class most tests reach for when the specific class
/// doesn't matter.
#[must_use]
pub fn test_task_class() -> TaskClass {
    TaskClass::Reasoning
}

/// A [`Policy`] that authorizes every known capability. Opposite of
/// [`Policy::locked_down`].
#[must_use]
pub fn wide_open_policy() -> Policy {
    let mut policy = Policy::locked_down();
    policy.operator_enabled = true;
    for capability in KNOWN_CAPABILITIES {
        policy.features.insert((*capability).to_string(), true);
    }
    policy
}

/// A [`PolicyGate`] over [`wide_open_policy`], for tests exercising a
/// capability-gated code path without wiring up a policy file.
#[must_use]
pub fn wide_open_gate() -> PolicyGate {
    PolicyGate::from_policy(wide_open_policy())
}

/// A [`PolicyGate`] that authorizes nothing, the gate's own default.
#[must_use]
pub fn locked_down_gate() -> PolicyGate {
    PolicyGate::from_policy(Policy::locked_down())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_open_gate_authorizes_every_known_capability() {
        let gate = wide_open_gate();
        for capability in KNOWN_CAPABILITIES {
            assert!(gate.authorize(capability).is_ok());
        }
    }

    #[test]
    fn locked_down_gate_denies_everything() {
        let gate = locked_down_gate();
        for capability in KNOWN_CAPABILITIES {
            assert!(gate.authorize(capability).is_err());
        }
    }
}
