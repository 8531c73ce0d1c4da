//! Google-family client, speaking the `:generateContent` contract.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::types::{
    LlmRequest, ProviderFamily, ProviderId, ProviderPricing, ProviderSpec, RawCompletion,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google-compatible client.
pub struct GoogleClient {
    http: Client,
    spec: ProviderSpec,
}

impl GoogleClient {
    /// Build a client from its static configuration.
    #[must_use]
    pub fn new(spec: ProviderSpec) -> Self {
        Self { http: Client::new(), spec }
    }

    fn api_key(&self) -> LlmResult<String> {
        let var = self.spec.api_key_env.as_deref().unwrap_or("GOOGLE_API_KEY");
        env::var(var)
            .map_err(|_| LlmError::ApiKeyNotConfigured { provider: self.spec.id.to_string() })
    }

    fn endpoint(&self) -> String {
        self.spec.base_url.clone().unwrap_or_else(|| {
            format!("{DEFAULT_BASE_URL}/{}:generateContent", self.spec.model)
        })
    }
}

#[async_trait]
impl LlmClient for GoogleClient {
    fn id(&self) -> &ProviderId {
        &self.spec.id
    }

    fn family(&self) -> ProviderFamily {
        ProviderFamily::GoogleCompatible
    }

    fn pricing(&self) -> ProviderPricing {
        self.spec.pricing
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult<RawCompletion> {
        let api_key = self.api_key()?;

        let mut prompt_text = request.prompt.clone();
        if let Some(system) = &request.system_prompt {
            prompt_text = format!("{system}\n\n{prompt_text}");
        }

        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt_text}]}],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            },
        });

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: GoogleResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse("no candidates returned".to_string()))?;

        // Google's contract named in the HTTP surface doesn't include a
        // usage block; the router falls back to whitespace estimation.
        Ok(RawCompletion { text, input_tokens: None, output_tokens: None })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: GoogleContent,
}

#[derive(Debug, Deserialize)]
struct GoogleContent {
    parts: Vec<GooglePart>,
}

#[derive(Debug, Deserialize)]
struct GooglePart {
    text: String,
}
