//! Conversation history storage configuration.

use serde::Deserialize;

use super::error::ConfigValidationError;

/// History store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per session.
    #[serde(default = "default_history_dir")]
    pub history_dir: String,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.history_dir.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("storage.history_dir"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_dir: default_history_dir(),
        }
    }
}

fn default_history_dir() -> String {
    "./conversation_history".to_string()
}
