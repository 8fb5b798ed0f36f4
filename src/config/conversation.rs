//! Conversation flow limits.

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Caps on the gathering and revalidation loop.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Maximum revalidation rounds per question.
    #[serde(default = "default_max_revalidation_attempts")]
    pub max_revalidation_attempts: u32,

    /// Maximum collected facts before the interview force-closes.
    #[serde(default = "default_max_facts")]
    pub max_facts: usize,
}

impl ConversationConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_facts == 0 {
            return Err(ConfigValidationError::invalid_value(
                "conversation.max_facts",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_revalidation_attempts: default_max_revalidation_attempts(),
            max_facts: default_max_facts(),
        }
    }
}

fn default_max_revalidation_attempts() -> u32 {
    2
}

fn default_max_facts() -> usize {
    10
}
