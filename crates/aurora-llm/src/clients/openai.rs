//! OpenAI-family client, speaking the `/v1/chat/completions` contract.
//!
//! Also used for `gpt-4`-style entries that point at self-hosted
//! OpenAI-compatible gateways (vLLM, LM Studio) via `base_url`.

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

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible client.
pub struct OpenAiClient {
    http: Client,
    spec: ProviderSpec,
}

impl OpenAiClient {
    /// Build a client from its static configuration.
    #[must_use]
    pub fn new(spec: ProviderSpec) -> Self {
        Self { http: Client::new(), spec }
    }

    fn api_key(&self) -> LlmResult<String> {
        let var = self.spec.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY");
        env::var(var)
            .map_err(|_| LlmError::ApiKeyNotConfigured { provider: self.spec.id.to_string() })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn id(&self) -> &ProviderId {
        &self.spec.id
    }

    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenAiCompatible
    }

    fn pricing(&self) -> ProviderPricing {
        self.spec.pricing
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult<RawCompletion> {
        let api_key = self.api_key()?;
        let url = self.spec.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        let mut messages: Vec<Value> = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": request.prompt}));

        let mut body = serde_json::json!({
            "model": self.spec.model,
            "messages": messages,
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = Value::from(max_tokens);
        }

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: OpenAiResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("empty choices array".to_string()))?;

        Ok(RawCompletion {
            text,
            input_tokens: parsed.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: parsed.usage.as_ref().map(|u| u.completion_tokens),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
