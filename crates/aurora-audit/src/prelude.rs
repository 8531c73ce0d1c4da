//! Prelude module - commonly used types for convenient import.
//!
//! Use `use aurora_audit::prelude::*;` to import all essential types.

pub use crate::{AuditError, AuditEvent, AuditRegistry, AuditResult, AuditSink};
