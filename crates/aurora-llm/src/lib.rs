//! LLM Router: a configuration-driven set of provider clients behind a
//! single `generate`/`vote` surface with task-class routing, protocol
//! fallback, and cost/latency bookkeeping.
//!
//! The provider set is never a closed enum. Operators add, remove, or
//! repoint providers by editing [`ProviderSpec`] entries in
//! configuration; this crate only knows the handful of wire contract
//! families in [`ProviderFamily`].
//!
//! ```rust,no_run
//! use aurora_llm::prelude::*;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let spec = ProviderSpec {
//!     id: ProviderId::new("ollama-llama3"),
//!     family: ProviderFamily::OllamaCompatible,
//!     model: "llama3.2".to_string(),
//!     base_url: None,
//!     api_key_env: None,
//!     pricing: ProviderPricing::FREE,
//! };
//! let client: Arc<dyn LlmClient> = Arc::new(OllamaClient::new(spec));
//! let router = LlmRouter::new(vec![client], HashMap::new(), vec![]);
//!
//! let response = router.generate(&LlmRequest::new("2+2=")).await;
//! println!("{}", response.output_text);
//! # }
//! ```

mod client;
mod clients;
mod error;
pub mod prelude;
mod router;
mod types;

pub use client::LlmClient;
pub use clients::{AnthropicClient, CodeCliClient, GoogleClient, OllamaClient, OpenAiClient};
pub use error::{LlmError, LlmResult};
pub use router::{read_stats_file, LlmRouter, ProviderStats};
pub use types::{
    estimate_tokens, LlmRequest, LlmResponse, ProviderFamily, ProviderId, ProviderPricing,
    ProviderSpec, RawCompletion,
};
