//! The LLM Router: provider selection by task class, protocol-failure
//! fallback, voting consensus, and per-provider bookkeeping.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use aurora_core::{TaskClass, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::client::LlmClient;
use crate::error::LlmResult;
use crate::types::{estimate_tokens, LlmRequest, LlmResponse, ProviderFamily, ProviderId};

const OUTCOME_WINDOW: usize = 20;
const MIN_SAMPLES_FOR_ERROR_RATE: usize = 10;
const ERROR_RATE_THRESHOLD: f64 = 0.5;

/// Rolling bookkeeping for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStats {
    /// Total calls attempted.
    pub requests: u64,
    /// Calls that returned a usable completion.
    pub successes: u64,
    /// Calls that failed at the transport/protocol level.
    pub errors: u64,
    /// Cumulative input tokens across successful calls.
    pub total_input_tokens: u64,
    /// Cumulative output tokens across successful calls.
    pub total_output_tokens: u64,
    /// Cumulative USD cost across successful calls.
    pub total_cost_usd: f64,
    /// Running average latency, successful calls only.
    pub avg_latency_ms: f64,
    /// Running average cost, successful calls only.
    pub avg_cost_usd: f64,
    /// When this provider was last called.
    #[serde(default)]
    pub last_used: Option<Timestamp>,
    /// Outcomes of the most recent calls (success/failure), bounded to
    /// [`OUTCOME_WINDOW`], for the error-rate selection rule.
    #[serde(default)]
    recent_outcomes: VecDeque<bool>,
}

impl ProviderStats {
    fn record_success(&mut self, latency_ms: u64, input_tokens: u32, output_tokens: u32, cost_usd: f64) {
        self.requests = self.requests.saturating_add(1);
        self.successes = self.successes.saturating_add(1);
        self.total_input_tokens = self.total_input_tokens.saturating_add(u64::from(input_tokens));
        self.total_output_tokens = self.total_output_tokens.saturating_add(u64::from(output_tokens));
        self.total_cost_usd += cost_usd;

        #[allow(clippy::cast_precision_loss)]
        let n = self.successes as f64;
        self.avg_latency_ms += (latency_ms as f64 - self.avg_latency_ms) / n;
        self.avg_cost_usd += (cost_usd - self.avg_cost_usd) / n;

        self.last_used = Some(Timestamp::now());
        self.push_outcome(true);
    }

    fn record_error(&mut self) {
        self.requests = self.requests.saturating_add(1);
        self.errors = self.errors.saturating_add(1);
        self.last_used = Some(Timestamp::now());
        self.push_outcome(false);
    }

    fn push_outcome(&mut self, ok: bool) {
        self.recent_outcomes.push_back(ok);
        if self.recent_outcomes.len() > OUTCOME_WINDOW {
            self.recent_outcomes.pop_front();
        }
    }

    /// Error rate across the recent-outcomes window.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.recent_outcomes.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let errors = self.recent_outcomes.iter().filter(|ok| !**ok).count() as f64;
        #[allow(clippy::cast_precision_loss)]
        let total = self.recent_outcomes.len() as f64;
        errors / total
    }

    fn has_enough_samples_for_error_rate(&self) -> bool {
        self.recent_outcomes.len() >= MIN_SAMPLES_FOR_ERROR_RATE
    }
}

/// The LLM Router.
pub struct LlmRouter {
    clients: HashMap<ProviderId, Arc<dyn LlmClient>>,
    preferences: HashMap<TaskClass, Vec<ProviderId>>,
    fallback_chain: Vec<ProviderId>,
    stats: RwLock<HashMap<ProviderId, ProviderStats>>,
    stats_path: Option<PathBuf>,
}

impl LlmRouter {
    /// Build a router from its configured clients, task-class preference
    /// table, and fallback chain.
    #[must_use]
    pub fn new(
        clients: Vec<Arc<dyn LlmClient>>,
        preferences: HashMap<TaskClass, Vec<ProviderId>>,
        fallback_chain: Vec<ProviderId>,
    ) -> Self {
        let clients = clients.into_iter().map(|c| (c.id().clone(), c)).collect();
        Self { clients, preferences, fallback_chain, stats: RwLock::new(HashMap::new()), stats_path: None }
    }

    /// Persist/load provider statistics at this path across restarts.
    #[must_use]
    pub fn with_stats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_path = Some(path.into());
        self
    }

    /// Load provider statistics from `stats_path`. A corrupt or missing
    /// file resets statistics to zero rather than failing startup.
    pub async fn load_stats(&self) {
        let Some(path) = &self.stats_path else { return };
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(loaded) => {
                    *self.stats.write().await = loaded;
                },
                Err(error) => {
                    warn!(%error, path = %path.display(), "corrupt provider stats file, resetting");
                },
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {},
            Err(error) => {
                warn!(%error, path = %path.display(), "failed to read provider stats file, resetting");
            },
        }
    }

    /// Persist provider statistics to `stats_path`, if configured.
    pub async fn save_stats(&self) -> LlmResult<()> {
        let Some(path) = &self.stats_path else { return Ok(()) };
        let stats = self.stats.read().await;
        let json = serde_json::to_vec_pretty(&*stats)
            .map_err(|e| crate::error::LlmError::ConfigError(e.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Snapshot of one provider's current statistics.
    pub async fn stats_for(&self, provider: &ProviderId) -> Option<ProviderStats> {
        self.stats.read().await.get(provider).cloned()
    }

    /// Select the best surviving candidate for `task_class` under the
    /// given cost/latency ceilings, per spec.md §4.5's selection rule.
    pub async fn select(
        &self,
        task_class: TaskClass,
        max_cost: Option<f64>,
        max_latency_ms: Option<u64>,
    ) -> Option<ProviderId> {
        let preferences = self
            .preferences
            .get(&task_class)
            .or_else(|| self.preferences.get(&TaskClass::default_fallback()));

        if let Some(preferences) = preferences {
            let stats = self.stats.read().await;
            for candidate in preferences {
                if !self.clients.contains_key(candidate) {
                    continue;
                }
                if let Some(s) = stats.get(candidate) {
                    if let Some(max_cost) = max_cost {
                        if s.avg_cost_usd > max_cost {
                            continue;
                        }
                    }
                    #[allow(clippy::cast_precision_loss)]
                    if let Some(max_latency) = max_latency_ms {
                        if s.avg_latency_ms > max_latency as f64 {
                            continue;
                        }
                    }
                    if s.has_enough_samples_for_error_rate() && s.error_rate() > ERROR_RATE_THRESHOLD {
                        continue;
                    }
                }
                return Some(candidate.clone());
            }
        }

        self.cheapest_local_provider()
    }

    fn cheapest_local_provider(&self) -> Option<ProviderId> {
        self.clients
            .values()
            .filter(|c| matches!(c.family(), ProviderFamily::OllamaCompatible | ProviderFamily::CodeCli))
            .min_by(|a, b| {
                a.pricing()
                    .input_cost_per_1k
                    .partial_cmp(&b.pricing().input_cost_per_1k)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|c| c.id().clone())
    }

    /// Generate a completion. Transport/protocol failures never surface
    /// as an `Err`: every candidate in the selection plus the fallback
    /// chain is tried in order, and if all fail the response carries a
    /// populated `error` and empty `output_text`.
    pub async fn generate(&self, request: &LlmRequest) -> LlmResponse {
        let started = Instant::now();
        let task_class = request.task_class.unwrap_or_default();

        let primary = match request.preferred_provider.clone() {
            Some(p) => Some(p),
            None => self.select(task_class, request.cost_ceiling_usd, request.latency_ceiling_ms).await,
        };

        let mut candidates = Vec::new();
        if let Some(p) = &primary {
            candidates.push(p.clone());
        }
        for p in &self.fallback_chain {
            if Some(p) != primary.as_ref() {
                candidates.push(p.clone());
            }
        }

        let mut tried = HashSet::new();
        let mut first_failure: Option<ProviderId> = None;

        for provider_id in candidates {
            if !tried.insert(provider_id.clone()) {
                continue;
            }
            let Some(client) = self.clients.get(&provider_id) else { continue };

            let attempt_start = Instant::now();
            match client.complete(request).await {
                Ok(raw) => {
                    #[allow(clippy::cast_possible_truncation)]
                    let latency_ms = attempt_start.elapsed().as_millis() as u64;
                    let input_tokens = raw.input_tokens.unwrap_or_else(|| estimate_tokens(&request.prompt));
                    let output_tokens = raw.output_tokens.unwrap_or_else(|| estimate_tokens(&raw.text));
                    let cost_usd = client.pricing().cost_usd(input_tokens, output_tokens);

                    self.stats
                        .write()
                        .await
                        .entry(provider_id.clone())
                        .or_default()
                        .record_success(latency_ms, input_tokens, output_tokens, cost_usd);

                    let mut metadata = HashMap::new();
                    if let Some(failed) = &first_failure {
                        metadata.insert("fallback_from".to_string(), Value::String(failed.to_string()));
                    }

                    return LlmResponse {
                        provider: provider_id,
                        output_text: raw.text,
                        input_tokens,
                        output_tokens,
                        latency_ms,
                        cost_usd,
                        timestamp: Timestamp::now(),
                        error: None,
                        metadata,
                    };
                },
                Err(error) => {
                    self.stats.write().await.entry(provider_id.clone()).or_default().record_error();
                    warn!(provider = %provider_id, %error, "provider call failed, trying fallback");
                    if first_failure.is_none() {
                        first_failure = Some(provider_id);
                    }
                },
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = started.elapsed().as_millis() as u64;
        let mut metadata = HashMap::new();
        if let Some(failed) = &first_failure {
            metadata.insert("fallback_from".to_string(), Value::String(failed.to_string()));
        }

        LlmResponse {
            provider: primary.unwrap_or_else(|| ProviderId::new("none")),
            output_text: String::new(),
            input_tokens: 0,
            output_tokens: 0,
            latency_ms,
            cost_usd: 0.0,
            timestamp: Timestamp::now(),
            error: Some("no configured provider produced a response".to_string()),
            metadata,
        }
    }

    /// Fan a prompt out to `providers` in parallel and return a
    /// consensus response: the most common first-100-character prefix
    /// among successful replies, tie-broken by arrival order.
    pub async fn vote(&self, prompt: &str, providers: &[ProviderId]) -> LlmResponse {
        let request = LlmRequest::new(prompt);

        let futures = providers.iter().filter_map(|id| {
            let client = self.clients.get(id)?.clone();
            let id = id.clone();
            let request = request.clone();
            Some(async move {
                let start = Instant::now();
                let result = client.complete(&request).await;
                (id, result, start.elapsed())
            })
        });

        let attempts = futures::future::join_all(futures).await;

        let mut successes: Vec<(ProviderId, String, f64, std::time::Duration)> = Vec::new();
        for (id, result, elapsed) in attempts {
            match result {
                Ok(raw) => {
                    let input_tokens = raw.input_tokens.unwrap_or_else(|| estimate_tokens(&request.prompt));
                    let output_tokens = raw.output_tokens.unwrap_or_else(|| estimate_tokens(&raw.text));
                    let cost_usd = self.clients.get(&id).map_or(0.0, |c| c.pricing().cost_usd(input_tokens, output_tokens));
                    self.stats.write().await.entry(id.clone()).or_default().record_success(
                        #[allow(clippy::cast_possible_truncation)]
                        { elapsed.as_millis() as u64 },
                        input_tokens,
                        output_tokens,
                        cost_usd,
                    );
                    successes.push((id, raw.text, cost_usd, elapsed));
                },
                Err(_) => {
                    self.stats.write().await.entry(id).or_default().record_error();
                },
            }
        }

        if successes.is_empty() {
            return LlmResponse {
                provider: ProviderId::new("none"),
                output_text: String::new(),
                input_tokens: 0,
                output_tokens: 0,
                latency_ms: 0,
                cost_usd: 0.0,
                timestamp: Timestamp::now(),
                error: Some("no provider produced a response to vote on".to_string()),
                metadata: HashMap::new(),
            };
        }

        let mut counts: Vec<(String, usize, usize)> = Vec::new();
        for (index, (_, text, _, _)) in successes.iter().enumerate() {
            let key = prefix_100(text);
            if let Some(entry) = counts.iter_mut().find(|(k, _, _)| *k == key) {
                entry.1 += 1;
            } else {
                counts.push((key, 1, index));
            }
        }
        let max_count = counts.iter().map(|(_, count, _)| *count).max().unwrap_or(0);
        let winner_key = counts
            .into_iter()
            .filter(|(_, count, _)| *count == max_count)
            .min_by_key(|(_, _, first_index)| *first_index)
            .map(|(key, _, _)| key)
            .unwrap_or_default();

        let (provider, text, cost_usd, elapsed) = successes
            .into_iter()
            .find(|(_, text, _, _)| prefix_100(text) == winner_key)
            .expect("winner key was derived from this set");

        let input_tokens = estimate_tokens(&request.prompt);
        let output_tokens = estimate_tokens(&text);
        LlmResponse {
            provider,
            output_text: text,
            input_tokens,
            output_tokens,
            #[allow(clippy::cast_possible_truncation)]
            latency_ms: elapsed.as_millis() as u64,
            cost_usd,
            timestamp: Timestamp::now(),
            error: None,
            metadata: HashMap::new(),
        }
    }
}

fn prefix_100(text: &str) -> String {
    text.chars().take(100).collect()
}

/// Load a provider stats table from disk for inspection/tooling, outside
/// a running router (e.g. a CLI `stats` subcommand).
pub async fn read_stats_file(path: &Path) -> LlmResult<HashMap<ProviderId, ProviderStats>> {
    let contents = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&contents).map_err(|e| crate::error::LlmError::ConfigError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, LlmResult as Result_};
    use crate::types::{ProviderPricing, RawCompletion};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        id: ProviderId,
        family: ProviderFamily,
        pricing: ProviderPricing,
        fail_times: usize,
        calls: AtomicUsize,
        reply: String,
    }

    #[async_trait]
    impl LlmClient for StubClient {
        fn id(&self) -> &ProviderId {
            &self.id
        }
        fn family(&self) -> ProviderFamily {
            self.family
        }
        fn pricing(&self) -> ProviderPricing {
            self.pricing
        }
        async fn complete(&self, _request: &LlmRequest) -> Result_<RawCompletion> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_times {
                return Err(LlmError::ApiRequestFailed("stub failure".to_string()));
            }
            Ok(RawCompletion { text: self.reply.clone(), input_tokens: Some(10), output_tokens: Some(5) })
        }
    }

    fn stub(id: &str, family: ProviderFamily, fail_times: usize, reply: &str) -> Arc<dyn LlmClient> {
        Arc::new(StubClient {
            id: ProviderId::new(id),
            family,
            pricing: ProviderPricing { input_cost_per_1k: 1.0, output_cost_per_1k: 2.0 },
            fail_times,
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
        })
    }

    #[tokio::test]
    async fn generate_falls_back_on_failure() {
        let claude = stub("claude-sonnet", ProviderFamily::AnthropicCompatible, usize::MAX, "");
        let gpt = stub("gpt-4-turbo", ProviderFamily::OpenAiCompatible, 0, "4");

        let mut prefs = HashMap::new();
        prefs.insert(TaskClass::Reasoning, vec![ProviderId::new("claude-sonnet")]);

        let router = LlmRouter::new(
            vec![claude, gpt],
            prefs,
            vec![ProviderId::new("claude-sonnet"), ProviderId::new("gpt-4-turbo")],
        );

        let response = router.generate(&LlmRequest::new("2+2=").with_task_class(TaskClass::Reasoning)).await;
        assert_eq!(response.provider.as_str(), "gpt-4-turbo");
        assert_eq!(response.metadata.get("fallback_from").and_then(Value::as_str), Some("claude-sonnet"));

        let claude_stats = router.stats_for(&ProviderId::new("claude-sonnet")).await.unwrap();
        assert_eq!(claude_stats.errors, 1);
    }

    #[tokio::test]
    async fn generate_reports_error_when_every_candidate_fails() {
        let only = stub("only", ProviderFamily::OllamaCompatible, usize::MAX, "");
        let mut prefs = HashMap::new();
        prefs.insert(TaskClass::Reasoning, vec![ProviderId::new("only")]);
        let router = LlmRouter::new(vec![only], prefs, vec![ProviderId::new("only")]);

        let response = router.generate(&LlmRequest::new("hi")).await;
        assert!(response.error.is_some());
        assert!(response.output_text.is_empty());
    }

    #[tokio::test]
    async fn select_skips_high_error_rate_provider() {
        let flaky = stub("flaky", ProviderFamily::AnthropicCompatible, usize::MAX, "");
        let backup = stub("backup", ProviderFamily::OllamaCompatible, 0, "ok");
        let mut prefs = HashMap::new();
        prefs.insert(TaskClass::Reasoning, vec![ProviderId::new("flaky"), ProviderId::new("backup")]);
        let router = LlmRouter::new(vec![flaky, backup], prefs, vec![]);

        for _ in 0..10 {
            router.generate(&LlmRequest::new("x").with_preferred_provider("flaky")).await;
        }

        let selected = router.select(TaskClass::Reasoning, None, None).await;
        assert_eq!(selected, Some(ProviderId::new("backup")));
    }

    #[tokio::test]
    async fn vote_picks_majority_prefix() {
        let a = stub("a", ProviderFamily::AnthropicCompatible, 0, "yes it works");
        let b = stub("b", ProviderFamily::OpenAiCompatible, 0, "yes it works");
        let c = stub("c", ProviderFamily::OllamaCompatible, 0, "no it doesn't");
        let router = LlmRouter::new(vec![a, b, c], HashMap::new(), vec![]);

        let response = router
            .vote("does it work?", &[ProviderId::new("a"), ProviderId::new("b"), ProviderId::new("c")])
            .await;
        assert_eq!(response.output_text, "yes it works");
    }
}
