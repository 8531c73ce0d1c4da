//! Commonly used fixtures and mocks for convenient import.
//!
//! ```rust,no_run
//! use aurora_test::prelude::*;
//! ```

pub use crate::fixtures::{
    locked_down_gate, test_agent_tag, test_operator_id, test_task_class, wide_open_gate,
    wide_open_policy,
};
pub use crate::harness::{init_test_logging, temp_audit_sink};
pub use crate::mocks::{MockHealthCheck, MockRemoteCache, MockSubsystem};
