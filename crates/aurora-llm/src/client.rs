//! The per-family provider client trait.

use async_trait::async_trait;

use crate::error::LlmResult;
use crate::types::{LlmRequest, ProviderFamily, ProviderId, ProviderPricing, RawCompletion};

/// One configured provider's ability to turn a request into text.
///
/// Implementors speak exactly one HTTP (or subprocess) contract; the
/// router is what understands task-class preferences, fallback, and
/// bookkeeping.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// This client's provider id.
    fn id(&self) -> &ProviderId;

    /// Which wire contract family this client speaks.
    fn family(&self) -> ProviderFamily;

    /// Static per-1k-token pricing.
    fn pricing(&self) -> ProviderPricing;

    /// Run the request and return the raw generated text and whatever
    /// token counts the provider reports.
    async fn complete(&self, request: &LlmRequest) -> LlmResult<RawCompletion>;
}
