//! `aurora llm` — one-shot LLM Router completions from the command line.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use aurora_config::AuroraConfig;
use aurora_llm::{
    AnthropicClient, GoogleClient, LlmClient, LlmRequest, LlmRouter, OllamaClient, OpenAiClient,
    ProviderFamily, ProviderId, ProviderPricing, ProviderSpec,
};
use clap::Subcommand;

use crate::theme::Theme;

/// `aurora llm <command>`.
#[derive(Subcommand)]
pub enum LlmCommand {
    /// Generate a completion from the provider best suited to the
    /// default task class, or a named provider with `--provider`.
    Generate {
        /// The prompt text.
        prompt: String,
        /// Force a specific provider id instead of router selection.
        #[arg(long)]
        provider: Option<String>,
    },
}

/// Run an [`LlmCommand`], building an [`LlmRouter`] from the provider
/// families present in `config`.
pub async fn dispatch(config: &AuroraConfig, command: LlmCommand) -> Result<()> {
    match command {
        LlmCommand::Generate { prompt, provider } => generate(config, &prompt, provider.as_deref()).await,
    }
}

/// Build an [`LlmRouter`] for every provider family configured in
/// `config.providers.entries`, plus an always-available local Ollama
/// fallback (unless the operator already configured one) so `verify`
/// and local-inference task classes have somewhere to route even with
/// zero cloud credentials configured. Shared by `aurora llm generate`,
/// the `aurora run` daemon, and `aurora autonomous`.
pub(crate) fn build_router(config: &AuroraConfig) -> LlmRouter {
    let mut clients = build_clients(config);
    if !config.providers.entries.contains_key("vllm") && !config.providers.entries.contains_key("ollama") {
        let (family, default_model, id_prefix, api_key_env, pricing) =
            resolve_family("ollama").expect("\"ollama\" is always a recognized family");
        let spec = ProviderSpec {
            id: ProviderId::new(format!("{id_prefix}{default_model}")),
            family,
            model: default_model.to_string(),
            base_url: None,
            api_key_env: api_key_env.map(str::to_string),
            pricing,
        };
        clients.push(Arc::new(OllamaClient::new(spec)));
    }
    LlmRouter::new(clients, HashMap::new(), Vec::new())
}

/// Build one client per recognized provider family present in
/// `config.providers.entries`. Each family's model defaults to the
/// primary model named for it, overridable per-entry via
/// `[providers.<family>] model = "..."` to select one of the
/// alternates [`resolve_family`] documents.
fn build_clients(config: &AuroraConfig) -> Vec<Arc<dyn LlmClient>> {
    let mut clients: Vec<Arc<dyn LlmClient>> = Vec::new();
    for family_name in config.providers.entries.keys() {
        let Some((family, default_model, id_prefix, api_key_env, pricing)) = resolve_family(family_name) else {
            continue;
        };
        let entry = &config.providers.entries[family_name];
        let model = entry.model.clone().unwrap_or_else(|| default_model.to_string());
        let id = format!("{id_prefix}{model}");
        let spec = ProviderSpec {
            id: ProviderId::new(id),
            family,
            model,
            base_url: entry.base_url.clone(),
            api_key_env: api_key_env.map(str::to_string),
            pricing,
        };
        let client: Arc<dyn LlmClient> = match family {
            ProviderFamily::AnthropicCompatible => Arc::new(AnthropicClient::new(spec)),
            ProviderFamily::OpenAiCompatible => Arc::new(OpenAiClient::new(spec)),
            ProviderFamily::GoogleCompatible => Arc::new(GoogleClient::new(spec)),
            ProviderFamily::OllamaCompatible | ProviderFamily::CodeCli => Arc::new(OllamaClient::new(spec)),
        };
        clients.push(client);
    }
    clients
}

/// Map a configured provider family name to its Aurora Pro defaults:
/// `(family, default model, provider-id prefix, API key env var,
/// pricing)`.
///
/// Alternate models an operator can select via `[providers.<family>]
/// model = "..."`:
/// - `anthropic`: `claude-sonnet-4-5` (default), `claude-opus-4`
/// - `openai`: `gpt-4-turbo` (default), `gpt-4`
/// - `google`: `gemini-pro` (default), `gemini-flash`
/// - `vllm`/`ollama`: `qwen2.5` (default), `llama3.2`, `codellama`
fn resolve_family(
    name: &str,
) -> Option<(ProviderFamily, &'static str, &'static str, Option<&'static str>, ProviderPricing)> {
    match name {
        "anthropic" => Some((
            ProviderFamily::AnthropicCompatible,
            "claude-sonnet-4-5",
            "",
            Some("ANTHROPIC_API_KEY"),
            ProviderPricing { input_cost_per_1k: 0.003, output_cost_per_1k: 0.015 },
        )),
        "openai" => Some((
            ProviderFamily::OpenAiCompatible,
            "gpt-4-turbo",
            "",
            Some("OPENAI_API_KEY"),
            ProviderPricing { input_cost_per_1k: 0.01, output_cost_per_1k: 0.03 },
        )),
        "google" => Some((
            ProviderFamily::GoogleCompatible,
            "gemini-pro",
            "",
            Some("GOOGLE_API_KEY"),
            ProviderPricing { input_cost_per_1k: 0.0005, output_cost_per_1k: 0.0015 },
        )),
        "vllm" | "ollama" => Some((
            ProviderFamily::OllamaCompatible,
            "qwen2.5",
            "ollama-",
            None,
            ProviderPricing::FREE,
        )),
        _ => None,
    }
}

async fn generate(config: &AuroraConfig, prompt: &str, provider: Option<&str>) -> Result<()> {
    let router = build_router(config);
    let mut request = LlmRequest::new(prompt);
    if let Some(provider) = provider {
        request = request.with_preferred_provider(ProviderId::new(provider));
    }

    let response = router.generate(&request).await;
    if let Some(error) = &response.error {
        println!("{}", Theme::error(&format!("{} ({})", error, response.provider)));
    } else {
        println!("{}", Theme::header(&format!("{} — {}ms", response.provider, response.latency_ms)));
        println!("{}", response.output_text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_family_defaults_match_the_documented_provider_table() {
        let (_, model, prefix, _, _) = resolve_family("anthropic").unwrap();
        assert_eq!((model, prefix), ("claude-sonnet-4-5", ""));
        let (_, model, prefix, _, _) = resolve_family("openai").unwrap();
        assert_eq!((model, prefix), ("gpt-4-turbo", ""));
        let (_, model, prefix, _, _) = resolve_family("google").unwrap();
        assert_eq!((model, prefix), ("gemini-pro", ""));
        let (_, model, prefix, _, _) = resolve_family("ollama").unwrap();
        assert_eq!((model, prefix), ("qwen2.5", "ollama-"));
        let (_, model, prefix, _, _) = resolve_family("vllm").unwrap();
        assert_eq!((model, prefix), ("qwen2.5", "ollama-"));
        assert!(resolve_family("bedrock").is_none());
    }

    #[test]
    fn build_clients_honors_a_configured_alternate_model() {
        let mut config = AuroraConfig::default();
        config.providers.entries.insert(
            "anthropic".to_string(),
            aurora_config::ProviderEntry { model: Some("claude-opus-4".to_string()), ..Default::default() },
        );
        let clients = build_clients(&config);
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].id().as_str(), "claude-opus-4");
    }

    #[tokio::test]
    async fn build_router_always_has_a_local_fallback_with_zero_configured_providers() {
        let config = AuroraConfig::default();
        let router = build_router(&config);
        let request = LlmRequest::new("ping");
        let response = router.generate(&request).await;
        assert_eq!(response.provider.as_str(), "ollama-qwen2.5");
    }
}
