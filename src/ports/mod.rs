//! Ports - interfaces the core consumes, implemented by adapters.

mod history_store;
mod language_model;
mod retriever;

pub use history_store::{HistoryStore, HistoryStoreError, SessionStatus, SessionSummary};
pub use language_model::{
    CompletionRequest, CompletionResponse, FinishReason, LanguageModel, ModelError, ProviderInfo,
    PromptMessage, PromptRole,
};
pub use retriever::{ChunkMetadata, RetrievedChunk, Retriever, RetrievalError};
