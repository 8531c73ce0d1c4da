//! Commonly used types for convenient import.
//!
//! ```rust,no_run
//! use aurora_kernel::prelude::*;
//! ```

pub use crate::{ControlPlane, KernelError, KernelResult, KernelSnapshot, Subsystem};
