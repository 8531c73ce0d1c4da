//! Unified prelude for Aurora Pro.
//!
//! This crate provides a single import to bring in the commonly used
//! types from across the workstation. Use this when you need types
//! from multiple components without managing individual imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aurora_prelude::*;
//!
//! // Now you have access to types from:
//! // - aurora-core (ids, error taxonomy, retry, timestamps)
//! // - aurora-crypto (content hashing)
//! // - aurora-audit (audit sink, events)
//! // - aurora-policy (capability gate)
//! // - aurora-events (reasoning stream)
//! // - aurora-telemetry (logging, heartbeat, host metrics)
//! // - aurora-llm (router, providers)
//! // - aurora-tools (CLI broker, file/cli actions)
//! // - aurora-input (mouse/keyboard queue)
//! // - aurora-cache (three-tier cache manager)
//! // - aurora-runtime (action executor, autonomous planner)
//! // - aurora-kernel (control plane)
//! ```
//!
//! # Per-crate preludes
//!
//! If you only need types from one component, use its own prelude
//! instead:
//!
//! ```rust,ignore
//! use aurora_core::prelude::*;
//! use aurora_llm::prelude::*;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub use aurora_audit::prelude::*;
pub use aurora_cache::{
    CacheLookup, CacheManager, CacheTier, RemoteCache, StorageError, StorageResult, TierSelector,
    TierStatsSnapshot,
};
pub use aurora_core::prelude::*;
pub use aurora_crypto::prelude::*;
pub use aurora_events::prelude::*;
pub use aurora_input::{
    is_failsafe_corner, EnigoBackend, InputAction, InputBackend, InputError, InputQueue,
    InputResult, MouseButton,
};
pub use aurora_kernel::prelude::*;
pub use aurora_llm::prelude::*;
pub use aurora_policy::prelude::*;
pub use aurora_runtime::prelude::*;
pub use aurora_telemetry::prelude::*;
pub use aurora_tools::{
    file_delete, file_read, file_write, run_cli_execute, CliExecuteResult, CliTaskBroker,
    CliTaskSnapshot, TaskStatus, ToolsError, ToolsResult,
    DEFAULT_RING_CAPACITY as TOOLS_DEFAULT_RING_CAPACITY,
};
