//! Application configuration.
//!
//! Type-safe configuration loaded from environment variables via the
//! `config` and `dotenvy` crates. Variables carry the `NYAYA_MITRA` prefix
//! and nest with double underscores:
//!
//! - `NYAYA_MITRA__SERVER__PORT=8000` -> `server.port`
//! - `NYAYA_MITRA__AI__API_KEY=hf_xxx` -> `ai.api_key`

mod ai;
mod conversation;
mod error;
mod retrieval;
mod server;
mod storage;

pub use ai::{AiConfig, ModelBackend};
pub use conversation::ConversationConfig;
pub use error::{ConfigError, ConfigValidationError};
pub use retrieval::RetrievalConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl AppConfig {
    /// Loads configuration from the environment (and `.env` in development).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("NYAYA_MITRA")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation across all sections.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.retrieval.validate()?;
        self.storage.validate()?;
        self.conversation.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
