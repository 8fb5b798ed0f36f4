//! In-memory keyword retriever.
//!
//! Scores corpus chunks by word overlap with the query across content,
//! title, and category. Stands in for a vector store in tests and local
//! runs; an empty corpus yields empty results, matching the port contract
//! that an unavailable store degrades rather than errors.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::ports::{RetrievalError, RetrievedChunk, Retriever};

/// Keyword-overlap retriever over an in-memory corpus.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRetriever {
    corpus: Vec<RetrievedChunk>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chunk to the corpus.
    pub fn with_chunk(mut self, chunk: RetrievedChunk) -> Self {
        self.corpus.push(chunk);
        self
    }

    /// Adds several chunks to the corpus.
    pub fn with_chunks(mut self, chunks: impl IntoIterator<Item = RetrievedChunk>) -> Self {
        self.corpus.extend(chunks);
        self
    }
}

fn words_of(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::InvalidQuery("empty query".to_string()));
        }
        let query_words = words_of(query);
        if query_words.is_empty() {
            return Err(RetrievalError::InvalidQuery(
                "query has no searchable words".to_string(),
            ));
        }

        let mut scored: Vec<(f32, RetrievedChunk)> = self
            .corpus
            .iter()
            .filter_map(|chunk| {
                let haystack = format!(
                    "{} {} {}",
                    chunk.content, chunk.metadata.title, chunk.metadata.category
                );
                let chunk_words = words_of(&haystack);
                let overlap = query_words.intersection(&chunk_words).count();
                if overlap == 0 {
                    return None;
                }
                let score = overlap as f32 / query_words.len() as f32;
                let mut hit = chunk.clone();
                hit.score = score.min(1.0);
                Some((score, hit))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, chunk)| chunk)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ChunkMetadata;

    fn chunk(title: &str, category: &str, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            content: content.into(),
            score: 0.0,
            metadata: ChunkMetadata {
                title: title.into(),
                category: category.into(),
                url: format!("https://example.org/{}", title.replace(' ', "-")),
                parent_id: None,
            },
        }
    }

    fn corpus() -> InMemoryRetriever {
        InMemoryRetriever::new()
            .with_chunk(chunk(
                "Cruelty as a ground",
                "divorce",
                "divorce may be granted on grounds of cruelty under section 13",
            ))
            .with_chunk(chunk(
                "Protection orders",
                "domestic_violence",
                "protection orders shield victims of domestic violence and abuse",
            ))
            .with_chunk(chunk(
                "Custody welfare principle",
                "child_custody",
                "custody of the child follows the welfare of the minor",
            ))
    }

    #[tokio::test]
    async fn relevant_chunks_rank_first() {
        let hits = corpus()
            .search("grounds for divorce due to cruelty", 5)
            .await
            .unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].metadata.title, "Cruelty as a ground");
    }

    #[tokio::test]
    async fn top_k_bounds_the_result() {
        let hits = corpus()
            .search("divorce custody violence of the child", 1)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn unrelated_query_yields_empty() {
        let hits = corpus().search("income tax refund delayed", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn empty_corpus_yields_empty_not_error() {
        let hits = InMemoryRetriever::new()
            .search("divorce advice", 5)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn blank_query_is_invalid() {
        let result = corpus().search("   ", 5).await;
        assert!(matches!(result, Err(RetrievalError::InvalidQuery(_))));
    }
}
