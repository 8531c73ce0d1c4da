//! Commonly used types for convenient import.
//!
//! ```rust,no_run
//! use aurora_llm::prelude::*;
//!
//! # async fn example(router: LlmRouter) {
//! let response = router.generate(&LlmRequest::new("What is 2+2?")).await;
//! println!("{}", response.output_text);
//! # }
//! ```

pub use crate::{LlmError, LlmResult};

pub use crate::{LlmClient, LlmRouter, ProviderStats};

pub use crate::{AnthropicClient, CodeCliClient, GoogleClient, OllamaClient, OpenAiClient};

pub use crate::{
    estimate_tokens, LlmRequest, LlmResponse, ProviderFamily, ProviderId, ProviderPricing,
    ProviderSpec, RawCompletion,
};
