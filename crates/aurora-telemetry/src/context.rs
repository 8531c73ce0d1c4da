//! Request context for correlating log lines and audit events that
//! belong to the same operation.

use tracing::Span;
use uuid::Uuid;

/// Carries a request/operation id through a call chain so every
/// `tracing` event emitted along the way can be correlated.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: Uuid,
    component: String,
    operation: Option<String>,
}

impl RequestContext {
    /// Start a context for work happening in `component`.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            component: component.into(),
            operation: None,
        }
    }

    /// Name the specific operation within the component.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// The correlation id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// A `tracing` span carrying this context's fields. Callers enter it
    /// for the duration of the correlated work:
    ///
    /// ```
    /// use aurora_telemetry::RequestContext;
    ///
    /// let ctx = RequestContext::new("cli_broker").with_operation("dispatch");
    /// let _guard = ctx.span().entered();
    /// tracing::info!("dispatching task");
    /// ```
    #[must_use]
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            request_id = %self.id,
            component = %self.component,
            operation = self.operation.as_deref().unwrap_or("-"),
        )
    }
}

/// An entered [`RequestContext`] span; dropping it exits the span.
pub type RequestGuard<'a> = tracing::span::Entered<'a>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_carries_component_and_operation() {
        let ctx = RequestContext::new("broker").with_operation("dispatch");
        let _guard = ctx.span().entered();
        assert_ne!(ctx.id(), Uuid::nil());
    }
}
