//! The `verify` action kind's judge, pluggable behind a trait per
//! Open Question (c): no ground-truth oracle is implemented or claimed,
//! only an LLM-backed default.

use async_trait::async_trait;
use aurora_llm::{LlmRequest, LlmRouter};
use serde_json::{json, Value};

use crate::error::{RuntimeError, RuntimeResult};

/// Judges a natural-language condition, returning a `{success, reason}`
/// payload.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Judge whether `condition` holds, given recent `history` context.
    async fn verify(&self, condition: &str, history: &str) -> RuntimeResult<Value>;
}

/// The default [`Verifier`]: asks the LLM Router to judge the condition
/// against recent reasoning/conversation history.
pub struct LlmVerifier {
    router: std::sync::Arc<LlmRouter>,
}

impl LlmVerifier {
    /// Wrap a router as a verifier.
    #[must_use]
    pub fn new(router: std::sync::Arc<LlmRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Verifier for LlmVerifier {
    async fn verify(&self, condition: &str, history: &str) -> RuntimeResult<Value> {
        let prompt = format!(
            "Judge whether the following condition currently holds, given the recent \
             history. Respond with ONLY a JSON object {{\"success\": bool, \"reason\": string}}.\n\n\
             Condition: {condition}\n\nRecent history:\n{history}"
        );
        let response = self.router.generate(&LlmRequest::new(prompt)).await;
        if let Some(error) = response.error {
            return Err(RuntimeError::Llm(aurora_llm::LlmError::ApiRequestFailed(error)));
        }
        Ok(serde_json::from_str(response.output_text.trim())
            .unwrap_or_else(|_| json!({ "success": false, "reason": response.output_text })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysTrue;

    #[async_trait]
    impl Verifier for AlwaysTrue {
        async fn verify(&self, _condition: &str, _history: &str) -> RuntimeResult<Value> {
            Ok(json!({ "success": true, "reason": "stub" }))
        }
    }

    #[tokio::test]
    async fn custom_verifier_is_pluggable() {
        let verifier = AlwaysTrue;
        let result = verifier.verify("anything", "").await.unwrap();
        assert_eq!(result["success"], json!(true));
    }
}
