//! Retrieval configuration.

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Retrieval configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Precedent chunks fetched per retrieval.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Optional path to a JSON corpus file loaded into the in-memory
    /// retriever at startup.
    pub corpus_path: Option<String>,
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_k == 0 {
            return Err(ConfigValidationError::invalid_value(
                "retrieval.top_k",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            corpus_path: None,
        }
    }
}

fn default_top_k() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_top_k_is_invalid() {
        let config = RetrievalConfig {
            top_k: 0,
            corpus_path: None,
        };
        assert!(config.validate().is_err());
    }
}
