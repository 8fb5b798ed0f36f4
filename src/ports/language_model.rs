//! Language model port - interface for LLM backends.
//!
//! Abstracts text generation behind a provider-agnostic request/response
//! pair so the controllers never couple to a specific API shape. All calls
//! are complete-before-return from the core's perspective; streaming is a
//! transport concern outside this port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for language model completions.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generates a completion for the given request.
    ///
    /// Implementations must either return a well-formed response or fail
    /// with a [`ModelError`]; the callers all have local fallbacks and no
    /// call may hang indefinitely (adapters own their timeouts).
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ModelError>;

    /// Backend identification for logs and diagnostics.
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Conversation messages (history plus the current prompt).
    pub messages: Vec<PromptMessage>,
    /// System prompt guiding model behavior.
    pub system_prompt: Option<String>,
    /// Bound on generated output length, in tokens.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: None,
        }
    }

    /// Appends a message.
    pub fn with_message(mut self, role: PromptRole, content: impl Into<String>) -> Self {
        self.messages.push(PromptMessage {
            role,
            content: content.into(),
        });
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Bounds the output length.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// A message in the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

/// Role of a prompt message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// Response from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated text.
    pub content: String,
    /// Model that produced it.
    pub model: String,
    /// Why generation stopped.
    pub finish_reason: FinishReason,
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop.
    Stop,
    /// Hit the max_tokens bound; output may be truncated.
    Length,
    /// Backend reported an error mid-generation.
    Error,
}

/// Backend identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g. "huggingface", "mock").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Language model backend errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Backend is unavailable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Request timed out on the adapter's clock.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ModelError {
    /// True when a retry may succeed without changing the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Network(_) | Self::Timeout { .. }
        )
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
