//! Service entrypoint: configuration, logging, wiring, and the HTTP server.

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use nyaya_mitra::adapters::http::{app_router, AppState};
use nyaya_mitra::adapters::llm::{HuggingFaceConfig, HuggingFaceProvider, MockModel};
use nyaya_mitra::adapters::retrieval::InMemoryRetriever;
use nyaya_mitra::adapters::storage::FileHistoryStore;
use nyaya_mitra::application::{TurnOptions, TurnProcessor};
use nyaya_mitra::config::{AppConfig, ModelBackend};
use nyaya_mitra::ports::{HistoryStore, LanguageModel, RetrievedChunk, Retriever};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    let model = build_model(&config)?;
    tracing::info!(
        provider = %model.provider_info().name,
        model = %model.provider_info().model,
        "language model configured"
    );

    let retriever = build_retriever(&config)?;
    let history: Arc<dyn HistoryStore> =
        Arc::new(FileHistoryStore::new(&config.storage.history_dir)?);

    let processor = TurnProcessor::new(
        model,
        retriever,
        history.clone(),
        TurnOptions {
            top_k: config.retrieval.top_k,
            max_response_tokens: config.ai.max_response_tokens,
            max_revalidation_attempts: config.conversation.max_revalidation_attempts,
            max_facts: config.conversation.max_facts,
        },
    );

    let state = AppState::new(Arc::new(processor), history);
    let router = app_router(state, config.server.request_timeout());

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

fn build_model(config: &AppConfig) -> Result<Arc<dyn LanguageModel>, Box<dyn std::error::Error>> {
    match config.ai.provider {
        ModelBackend::HuggingFace => {
            let api_key = config.ai.api_key.clone().unwrap_or_default();
            let hf = HuggingFaceConfig::new(api_key)
                .with_model(&config.ai.model)
                .with_base_url(&config.ai.base_url)
                .with_timeout(config.ai.timeout())
                .with_max_retries(config.ai.max_retries);
            Ok(Arc::new(HuggingFaceProvider::new(hf)?))
        }
        ModelBackend::Mock => {
            tracing::warn!("mock language model configured; responses are scripted");
            Ok(Arc::new(MockModel::new()))
        }
    }
}

fn build_retriever(
    config: &AppConfig,
) -> Result<Arc<dyn Retriever>, Box<dyn std::error::Error>> {
    let mut retriever = InMemoryRetriever::new();
    if let Some(ref path) = config.retrieval.corpus_path {
        let bytes = std::fs::read(path)?;
        let chunks: Vec<RetrievedChunk> = serde_json::from_slice(&bytes)?;
        tracing::info!(path = %path, chunks = chunks.len(), "precedent corpus loaded");
        retriever = retriever.with_chunks(chunks);
    } else {
        tracing::warn!("no precedent corpus configured; retrieval will return no context");
    }
    Ok(Arc::new(retriever))
}
