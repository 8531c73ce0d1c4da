//! Ollama-family client, speaking the local `/api/generate` contract.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::types::{
    LlmRequest, ProviderFamily, ProviderId, ProviderPricing, ProviderSpec, RawCompletion,
};

const DEFAULT_BASE_URL: &str = "http://localhost:11434/api/generate";

/// Local Ollama-compatible client. No API key is required.
pub struct OllamaClient {
    http: Client,
    spec: ProviderSpec,
}

impl OllamaClient {
    /// Build a client from its static configuration.
    #[must_use]
    pub fn new(spec: ProviderSpec) -> Self {
        Self { http: Client::new(), spec }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn id(&self) -> &ProviderId {
        &self.spec.id
    }

    fn family(&self) -> ProviderFamily {
        ProviderFamily::OllamaCompatible
    }

    fn pricing(&self) -> ProviderPricing {
        self.spec.pricing
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult<RawCompletion> {
        let url = self.spec.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        let mut prompt = request.prompt.clone();
        if let Some(system) = &request.system_prompt {
            prompt = format!("{system}\n\n{prompt}");
        }

        let body = serde_json::json!({
            "model": self.spec.model,
            "prompt": prompt,
            "temperature": request.temperature,
            "stream": false,
        });

        let response = self.http.post(url).json(&body).send().await?.error_for_status()?;

        let parsed: OllamaResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(RawCompletion {
            text: parsed.response,
            input_tokens: parsed.prompt_eval_count,
            output_tokens: parsed.eval_count,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}
