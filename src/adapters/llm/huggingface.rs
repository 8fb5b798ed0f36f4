//! Hugging Face inference provider.
//!
//! Talks to the Hugging Face router's OpenAI-compatible chat completions
//! endpoint. Transient failures are retried with exponential backoff up to
//! the configured limit.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HuggingFaceConfig::new(api_key)
//!     .with_model("meta-llama/Llama-3.1-8B-Instruct");
//!
//! let provider = HuggingFaceProvider::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::ports::{
    CompletionRequest, CompletionResponse, FinishReason, LanguageModel, ModelError, PromptRole,
    ProviderInfo,
};

/// Configuration for the Hugging Face provider.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// API token for authentication.
    api_key: Secret<String>,
    /// Model identifier on the hub.
    pub model: String,
    /// Base URL of the OpenAI-compatible router.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl HuggingFaceConfig {
    /// Creates a configuration with the given API token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "meta-llama/Llama-3.1-8B-Instruct".to_string(),
            base_url: "https://router.huggingface.co/v1".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Hugging Face chat completions provider.
pub struct HuggingFaceProvider {
    config: HuggingFaceConfig,
    client: Client,
}

impl HuggingFaceProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: HuggingFaceConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::InvalidRequest(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> WireRequest {
        let mut messages = Vec::new();
        if let Some(ref prompt) = request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }
        for msg in &request.messages {
            messages.push(WireMessage {
                role: match msg.role {
                    PromptRole::System => "system",
                    PromptRole::User => "user",
                    PromptRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }
        WireRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, ModelError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&self.to_wire_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    ModelError::network(format!("connection failed: {e}"))
                } else {
                    ModelError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, ModelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(ModelError::AuthenticationFailed),
            400 => Err(ModelError::InvalidRequest(error_body)),
            429 | 500..=599 => Err(ModelError::unavailable(format!(
                "server error {status}: {error_body}"
            ))),
            _ => Err(ModelError::network(format!(
                "unexpected status {status}: {error_body}"
            ))),
        }
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, ModelError> {
        let response = self.handle_response_status(response).await?;
        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| ModelError::parse(format!("failed to parse response: {e}")))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::parse("no choices in response"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("error") => FinishReason::Error,
            _ => FinishReason::Stop,
        };

        Ok(CompletionResponse {
            content: choice.message.content,
            model: wire.model,
            finish_reason,
        })
    }
}

#[async_trait]
impl LanguageModel for HuggingFaceProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ModelError> {
        let mut attempt = 0;
        loop {
            let result = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(completion) => return Ok(completion),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    tracing::warn!(
                        error = %err,
                        attempt,
                        "completion attempt failed, retrying"
                    );
                    // 1s, 2s, 4s, ...
                    sleep(Duration::from_secs(1 << attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("huggingface", &self.config.model)
    }
}

// ----- wire types -----

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}
