//! Provider identity, pricing, and the request/response shapes the
//! router exchanges with callers.

use std::collections::HashMap;
use std::fmt;

use aurora_core::{TaskClass, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one configured provider (e.g. `"claude-sonnet-4-5"`,
/// `"ollama-llama3.2"`).
///
/// The provider set is a configuration artifact, not a closed enum —
/// operators add or remove entries in `aurora.toml` without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Wrap a provider name.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The HTTP contract family a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// Anthropic `/v1/messages`.
    AnthropicCompatible,
    /// OpenAI `/v1/chat/completions`.
    OpenAiCompatible,
    /// Google `:generateContent`.
    GoogleCompatible,
    /// Ollama `/api/generate`.
    OllamaCompatible,
    /// A local coding-agent CLI invoked as a subprocess.
    CodeCli,
}

/// Static per-1k-token USD pricing for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderPricing {
    /// USD per 1000 input tokens.
    pub input_cost_per_1k: f64,
    /// USD per 1000 output tokens.
    pub output_cost_per_1k: f64,
}

impl ProviderPricing {
    /// Providers with no meaningful per-token cost (local inference).
    pub const FREE: Self = Self { input_cost_per_1k: 0.0, output_cost_per_1k: 0.0 };

    /// Cost in USD for the given token counts.
    #[must_use]
    pub fn cost_usd(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (f64::from(input_tokens) / 1000.0) * self.input_cost_per_1k
            + (f64::from(output_tokens) / 1000.0) * self.output_cost_per_1k
    }
}

/// Static configuration for one provider, as read from `aurora.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// The provider's id.
    pub id: ProviderId,
    /// Which HTTP contract family it speaks.
    pub family: ProviderFamily,
    /// Model name/tag passed in requests.
    pub model: String,
    /// Base URL override (local endpoints, self-hosted gateways).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key, if the family needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Static pricing.
    pub pricing: ProviderPricing,
}

/// A request to the LLM Router.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The prompt text.
    pub prompt: String,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional max tokens to generate.
    pub max_tokens: Option<u32>,
    /// Optional task class, used for provider preference selection.
    pub task_class: Option<TaskClass>,
    /// Optional explicit provider override, bypassing selection.
    pub preferred_provider: Option<ProviderId>,
    /// Optional maximum acceptable rolling-average cost per request.
    pub cost_ceiling_usd: Option<f64>,
    /// Optional maximum acceptable rolling-average latency.
    pub latency_ceiling_ms: Option<u64>,
}

impl LlmRequest {
    /// Start a request with just a prompt; all other fields use their
    /// defaults (temperature 0.7, no ceilings, no task class).
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: 0.7,
            max_tokens: None,
            task_class: None,
            preferred_provider: None,
            cost_ceiling_usd: None,
            latency_ceiling_ms: None,
        }
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens to generate.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the task class used for provider preference selection.
    #[must_use]
    pub fn with_task_class(mut self, task_class: TaskClass) -> Self {
        self.task_class = Some(task_class);
        self
    }

    /// Force a specific provider, bypassing selection.
    #[must_use]
    pub fn with_preferred_provider(mut self, provider: impl Into<ProviderId>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    /// Cap the rolling-average cost per request a candidate may have.
    #[must_use]
    pub fn with_cost_ceiling(mut self, ceiling_usd: f64) -> Self {
        self.cost_ceiling_usd = Some(ceiling_usd);
        self
    }

    /// Cap the rolling-average latency a candidate may have.
    #[must_use]
    pub fn with_latency_ceiling(mut self, ceiling_ms: u64) -> Self {
        self.latency_ceiling_ms = Some(ceiling_ms);
        self
    }
}

/// The router's response to a [`LlmRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The provider that ultimately produced `output_text`.
    pub provider: ProviderId,
    /// Generated text.
    pub output_text: String,
    /// Input tokens, from the provider when available, else estimated.
    pub input_tokens: u32,
    /// Output tokens, from the provider when available, else estimated.
    pub output_tokens: u32,
    /// Wall-clock latency of the call.
    pub latency_ms: u64,
    /// Cost in USD, derived from `pricing` and token counts.
    pub cost_usd: f64,
    /// When the response was produced.
    pub timestamp: Timestamp,
    /// Populated when every candidate provider failed; `output_text` is
    /// empty in that case.
    #[serde(default)]
    pub error: Option<String>,
    /// Extra context, e.g. `fallback_from` naming the provider that was
    /// tried and failed first.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

/// A raw completion from a provider client, before the router attaches
/// latency, cost, and a timestamp.
#[derive(Debug, Clone)]
pub struct RawCompletion {
    /// Generated text.
    pub text: String,
    /// Input tokens reported by the provider, if any.
    pub input_tokens: Option<u32>,
    /// Output tokens reported by the provider, if any.
    pub output_tokens: Option<u32>,
}

/// Estimate a token count from whitespace-split word count when a
/// provider doesn't report one, per the router's bookkeeping rule.
#[must_use]
pub fn estimate_tokens(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let estimate = (words as f64 * 1.3).round() as u32;
    estimate.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_computes_cost() {
        let pricing = ProviderPricing { input_cost_per_1k: 3.0, output_cost_per_1k: 15.0 };
        let cost = pricing.cost_usd(1000, 500);
        assert!((cost - 10.5).abs() < 1e-9);
    }

    #[test]
    fn free_pricing_is_zero() {
        assert_eq!(ProviderPricing::FREE.cost_usd(10_000, 10_000), 0.0);
    }

    #[test]
    fn token_estimate_uses_word_count_times_1_3() {
        assert_eq!(estimate_tokens("one two three four"), 5);
    }

    #[test]
    fn request_builder_sets_fields() {
        let req = LlmRequest::new("hi")
            .with_task_class(TaskClass::Reasoning)
            .with_cost_ceiling(0.5);
        assert_eq!(req.task_class, Some(TaskClass::Reasoning));
        assert_eq!(req.cost_ceiling_usd, Some(0.5));
    }
}
