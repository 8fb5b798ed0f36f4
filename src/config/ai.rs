//! Language model configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;

/// Language model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which backend to use.
    #[serde(default)]
    pub provider: ModelBackend,

    /// API token for the hosted backend.
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failures.
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Token bound for final responses.
    #[serde(default = "default_max_response_tokens")]
    pub max_response_tokens: u32,
}

/// Language model backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    #[default]
    HuggingFace,
    /// Scripted responses only; local development without credentials.
    Mock,
}

impl AiConfig {
    /// Timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.provider == ModelBackend::HuggingFace && !self.has_api_key() {
            return Err(ConfigValidationError::MissingRequired("ai.api_key"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("ai.model"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ModelBackend::default(),
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            max_response_tokens: default_max_response_tokens(),
        }
    }
}

fn default_model() -> String {
    "meta-llama/Llama-3.1-8B-Instruct".to_string()
}

fn default_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    2
}

fn default_max_response_tokens() -> u32 {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_backend_requires_an_api_key() {
        let config = AiConfig::default();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingRequired("ai.api_key"))
        );
    }

    #[test]
    fn mock_backend_needs_no_key() {
        let config = AiConfig {
            provider: ModelBackend::Mock,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn key_presence_satisfies_validation() {
        let config = AiConfig {
            api_key: Some("hf_token".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }
}
