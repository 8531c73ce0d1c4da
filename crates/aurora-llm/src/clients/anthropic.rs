//! Anthropic-family client, speaking the `/v1/messages` contract.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::types::{
    LlmRequest, ProviderFamily, ProviderId, ProviderPricing, ProviderSpec, RawCompletion,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic-compatible client.
pub struct AnthropicClient {
    http: Client,
    spec: ProviderSpec,
}

impl AnthropicClient {
    /// Build a client from its static configuration.
    #[must_use]
    pub fn new(spec: ProviderSpec) -> Self {
        Self { http: Client::new(), spec }
    }

    fn api_key(&self) -> LlmResult<String> {
        let var = self.spec.api_key_env.as_deref().unwrap_or("ANTHROPIC_API_KEY");
        env::var(var)
            .map_err(|_| LlmError::ApiKeyNotConfigured { provider: self.spec.id.to_string() })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn id(&self) -> &ProviderId {
        &self.spec.id
    }

    fn family(&self) -> ProviderFamily {
        ProviderFamily::AnthropicCompatible
    }

    fn pricing(&self) -> ProviderPricing {
        self.spec.pricing
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult<RawCompletion> {
        let api_key = self.api_key()?;
        let url = self.spec.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        let mut body = serde_json::json!({
            "model": self.spec.model,
            "max_tokens": request.max_tokens.unwrap_or(4096),
            "temperature": request.temperature,
            "messages": [{"role": "user", "content": request.prompt}],
        });
        if let Some(system) = &request.system_prompt {
            body["system"] = Value::String(system.clone());
        }

        let response = self
            .http
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: AnthropicResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let text = parsed.content.into_iter().map(|c| c.text).collect::<Vec<_>>().join("");

        Ok(RawCompletion {
            text,
            input_tokens: Some(parsed.usage.input_tokens),
            output_tokens: Some(parsed.usage.output_tokens),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
