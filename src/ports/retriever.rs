//! Retriever port - interface to the precedent case store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for similarity search over the precedent corpus.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns the `top_k` most relevant chunks for the query.
    ///
    /// An unavailable backing store must yield `Ok(vec![])`, not an error;
    /// the core treats empty results as "insufficient context" and degrades
    /// its response accordingly. Errors are reserved for invalid requests.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>, RetrievalError>;
}

/// One retrieved precedent chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk text.
    pub content: String,
    /// Relevance score in [0, 1].
    pub score: f32,
    /// Document metadata.
    pub metadata: ChunkMetadata,
}

/// Metadata attached to a precedent chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChunkMetadata {
    /// Case or document title.
    pub title: String,
    /// Case category (e.g. "divorce", "domestic_violence").
    pub category: String,
    /// Source URL.
    pub url: String,
    /// Parent document id, when the chunk came from a split document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Retrieval errors (invalid requests only; outages yield empty results).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrievalError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_serializes_with_metadata() {
        let chunk = RetrievedChunk {
            content: "The court held...".into(),
            score: 0.91,
            metadata: ChunkMetadata {
                title: "A v. B".into(),
                category: "divorce".into(),
                url: "https://example.org/a-v-b".into(),
                parent_id: None,
            },
        };
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["metadata"]["title"], "A v. B");
        assert!(json["metadata"].get("parent_id").is_none());
    }
}
