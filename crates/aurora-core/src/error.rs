//! Cross-cutting error-kind taxonomy.
//!
//! Every crate in this workspace defines its own `thiserror` error enum
//! (a policy error, an audit error, a runtime error, ...) because the
//! failure modes of each component are a different shape. What they share
//! is the propagation policy: `PermissionDenied` and `Validation` bubble
//! to the caller unchanged, `Transport`/`Timeout` are recovered locally,
//! `Protocol` triggers a fallback, `Resource` disables a capability, and
//! `Fatal` triggers supervisor backoff-and-reenter. `ErrorKind` is the
//! classification every per-crate error type maps onto via a `kind()`
//! method, so that policy can be implemented once, generically, instead of
//! matching on every concrete error type at every call site.

use std::fmt;

/// The seven abstract error kinds named in the error handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The Policy Gate refused a capability.
    PermissionDenied,
    /// Bad inputs, unknown ids, or a malformed request.
    Validation,
    /// Network or subprocess transport failure.
    Transport,
    /// A deadline was exceeded.
    Timeout,
    /// Unparseable provider or planner output.
    Protocol,
    /// A dependency is missing (no display, no binary on PATH, ...).
    Resource,
    /// A supervisor encountered an unrecoverable-in-place fault.
    Fatal,
}

impl ErrorKind {
    /// Whether this kind should bubble to the caller unchanged (403/400 at
    /// an HTTP boundary) rather than being retried or recovered locally.
    #[must_use]
    pub fn bubbles_to_caller(self) -> bool {
        matches!(self, Self::PermissionDenied | Self::Validation)
    }

    /// Whether a caller encountering this kind should retry locally
    /// (transport hiccups, timeouts) rather than treat it as terminal.
    #[must_use]
    pub fn is_locally_recoverable(self) -> bool {
        matches!(self, Self::Transport | Self::Timeout)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PermissionDenied => "permission_denied",
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Resource => "resource",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubbling_kinds() {
        assert!(ErrorKind::PermissionDenied.bubbles_to_caller());
        assert!(ErrorKind::Validation.bubbles_to_caller());
        assert!(!ErrorKind::Transport.bubbles_to_caller());
    }

    #[test]
    fn recoverable_kinds() {
        assert!(ErrorKind::Transport.is_locally_recoverable());
        assert!(ErrorKind::Timeout.is_locally_recoverable());
        assert!(!ErrorKind::Fatal.is_locally_recoverable());
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(ErrorKind::PermissionDenied.to_string(), "permission_denied");
    }
}
