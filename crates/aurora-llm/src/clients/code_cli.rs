//! The "code CLI" shim family: a local coding-agent CLI invoked as a
//! subprocess and treated as just another provider by the router.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::types::{
    LlmRequest, ProviderFamily, ProviderId, ProviderPricing, ProviderSpec, RawCompletion,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs `spec.model` as argv[0] (shell-split from the provider's model
/// field, e.g. `"codex exec"`), pipes the prompt to stdin, and captures
/// stdout as the completion text. No token usage is ever reported; the
/// router estimates it from whitespace.
pub struct CodeCliClient {
    spec: ProviderSpec,
    timeout: Duration,
}

impl CodeCliClient {
    /// Build a client from its static configuration.
    #[must_use]
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec, timeout: DEFAULT_TIMEOUT }
    }

    /// Override the subprocess wall-clock timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, prompt: &str) -> io::Result<(String, String, i32)> {
        let mut parts = self.spec.model.split_whitespace();
        let program = parts.next().unwrap_or(self.spec.model.as_str());
        let args: Vec<&str> = parts.collect();

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        Ok((
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code().unwrap_or(-1),
        ))
    }
}

#[async_trait]
impl LlmClient for CodeCliClient {
    fn id(&self) -> &ProviderId {
        &self.spec.id
    }

    fn family(&self) -> ProviderFamily {
        ProviderFamily::CodeCli
    }

    fn pricing(&self) -> ProviderPricing {
        self.spec.pricing
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult<RawCompletion> {
        let mut prompt = request.prompt.clone();
        if let Some(system) = &request.system_prompt {
            prompt = format!("{system}\n\n{prompt}");
        }

        let result = tokio::time::timeout(self.timeout, self.run(&prompt)).await;
        let elapsed_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(Ok((stdout, _stderr, code))) if code == 0 => {
                Ok(RawCompletion { text: stdout, input_tokens: None, output_tokens: None })
            },
            Ok(Ok((_stdout, stderr, code))) => {
                Err(LlmError::ApiRequestFailed(format!("exit code {code}: {stderr}")))
            },
            Ok(Err(source)) => Err(LlmError::ApiRequestFailed(source.to_string())),
            Err(_elapsed) => {
                Err(LlmError::Timeout { provider: self.spec.id.to_string(), elapsed_ms })
            },
        }
    }
}
