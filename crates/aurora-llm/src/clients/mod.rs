//! One module per provider HTTP (or subprocess) contract family.

mod anthropic;
mod code_cli;
mod google;
mod ollama;
mod openai;

pub use anthropic::AnthropicClient;
pub use code_cli::CodeCliClient;
pub use google::GoogleClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
