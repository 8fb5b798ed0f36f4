//! Final advice generation from the case record and retrieved precedents.
//!
//! Builds the grounded prompt (collected facts, precedent excerpts, recent
//! conversation), appends the legal disclaimer when the model omitted one,
//! and degrades to fixed text on empty context or backend failure. Total
//! function by design; a turn that reached generation always produces a
//! final response.

use std::sync::Arc;

use crate::domain::conversation::{ConversationSession, SourceRef};
use crate::ports::{
    CompletionRequest, FinishReason, LanguageModel, PromptRole, RetrievedChunk,
};

const GENERATION_SYSTEM_PROMPT: &str =
    "You are a knowledgeable legal assistant specialising in Indian family \
     law. Give practical, empathetic guidance grounded in the provided case \
     information and precedents. Cite relevant acts and sections where they \
     apply. Never invent case law.";

/// Fixed response when retrieval produced no usable context.
pub const NO_CONTEXT_RESPONSE: &str =
    "I'm sorry, I couldn't find sufficient reference material to answer your \
     question reliably. Your situation may need advice beyond what I can \
     provide here; please consider consulting a practising family law \
     advocate who can review the specifics of your case.";

const DISCLAIMER: &str =
    "\n\n---\nThis is general legal information, not a substitute for \
     professional legal advice. Please consult a qualified advocate for \
     guidance on your specific situation.";

/// Phrase whose presence means the model already included a disclaimer.
const DISCLAIMER_MARKER: &str = "not a substitute for";

/// How much of each precedent chunk goes into the prompt.
const CHUNK_EXCERPT_CHARS: usize = 500;

/// How many trailing conversation messages are included for continuity.
const RECENT_MESSAGE_COUNT: usize = 4;

/// Generates the final grounded response.
#[derive(Clone)]
pub struct AdviceGenerator {
    model: Arc<dyn LanguageModel>,
    max_tokens: u32,
}

impl AdviceGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, max_tokens: u32) -> Self {
        Self { model, max_tokens }
    }

    /// Produces the final advice text for the session.
    pub async fn generate(
        &self,
        session: &ConversationSession,
        chunks: &[RetrievedChunk],
    ) -> String {
        if chunks.is_empty() {
            tracing::warn!(
                session_id = %session.session_id(),
                "no precedent context retrieved, sending the degraded response"
            );
            return NO_CONTEXT_RESPONSE.to_string();
        }

        let prompt = self.build_prompt(session, chunks);
        let request = CompletionRequest::new()
            .with_system_prompt(GENERATION_SYSTEM_PROMPT)
            .with_message(PromptRole::User, prompt)
            .with_max_tokens(self.max_tokens);

        match self.model.complete(request).await {
            Ok(response) => {
                if response.finish_reason == FinishReason::Length {
                    tracing::warn!(
                        session_id = %session.session_id(),
                        model = %response.model,
                        "response hit the token bound and may be truncated"
                    );
                }
                with_disclaimer(response.content.trim())
            }
            Err(err) => {
                tracing::error!(
                    session_id = %session.session_id(),
                    error = %err,
                    "advice generation failed"
                );
                format!(
                    "I apologize, but I ran into a technical problem while \
                     preparing your answer ({err}). Please try asking again \
                     in a moment."
                )
            }
        }
    }

    fn build_prompt(&self, session: &ConversationSession, chunks: &[RetrievedChunk]) -> String {
        let mut prompt = format!(
            "USER'S QUESTION:\n{}\n\nCASE INFORMATION:\n{}\n\nRELEVANT PRECEDENTS:\n{}",
            session.root_query(),
            session.facts_rendering(),
            format_context(chunks),
        );

        let recent = session.recent_messages(RECENT_MESSAGE_COUNT);
        if !recent.is_empty() {
            prompt.push_str("\n\nRECENT CONVERSATION:\n");
            for (role, text) in recent {
                prompt.push_str(&format!("{role}: {text}\n"));
            }
        }

        prompt.push_str(
            "\nProvide clear, structured advice: the applicable law, the \
             user's options, and practical next steps.",
        );
        prompt
    }

    /// Deduplicated source references for the response envelope.
    pub fn sources_from(chunks: &[RetrievedChunk]) -> Vec<SourceRef> {
        let mut seen = std::collections::BTreeSet::new();
        chunks
            .iter()
            .filter(|chunk| seen.insert((chunk.metadata.title.clone(), chunk.metadata.url.clone())))
            .map(|chunk| SourceRef {
                title: chunk.metadata.title.clone(),
                url: chunk.metadata.url.clone(),
                category: chunk.metadata.category.clone(),
            })
            .collect()
    }
}

fn with_disclaimer(text: &str) -> String {
    if text.to_lowercase().contains(DISCLAIMER_MARKER) {
        text.to_string()
    } else {
        format!("{text}{DISCLAIMER}")
    }
}

fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let excerpt: String = chunk.content.chars().take(CHUNK_EXCERPT_CHARS).collect();
            format!(
                "[{}] {} (relevance: {:.0}%)\n{}",
                i + 1,
                chunk.metadata.title,
                chunk.score * 100.0,
                excerpt
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::MockModel;
    use crate::domain::foundation::SessionId;
    use crate::ports::ChunkMetadata;

    fn session() -> ConversationSession {
        let mut s = ConversationSession::new(
            SessionId::new("gen-test").unwrap(),
            "I want a divorce from my husband",
        );
        s.record_fact("marriage_date", "2015");
        s
    }

    fn chunk(title: &str, url: &str) -> RetrievedChunk {
        RetrievedChunk {
            content: "The court held that cruelty under Section 13(1)(ia)...".into(),
            score: 0.88,
            metadata: ChunkMetadata {
                title: title.into(),
                category: "divorce".into(),
                url: url.into(),
                parent_id: None,
            },
        }
    }

    #[tokio::test]
    async fn empty_context_yields_the_degraded_response_without_a_model_call() {
        let model = MockModel::new(); // any call would error
        let generator = AdviceGenerator::new(Arc::new(model), 1024);

        let text = generator.generate(&session(), &[]).await;
        assert_eq!(text, NO_CONTEXT_RESPONSE);
    }

    #[tokio::test]
    async fn disclaimer_is_appended_when_missing() {
        let model = MockModel::new().with_response("You can file under Section 13.");
        let generator = AdviceGenerator::new(Arc::new(model), 1024);

        let text = generator
            .generate(&session(), &[chunk("A v. B", "https://example.org/1")])
            .await;
        assert!(text.starts_with("You can file under Section 13."));
        assert!(text.contains("not a substitute for"));
    }

    #[tokio::test]
    async fn disclaimer_is_not_duplicated() {
        let model = MockModel::new().with_response(
            "You can file under Section 13. Note this is not a substitute for \
             professional legal advice.",
        );
        let generator = AdviceGenerator::new(Arc::new(model), 1024);

        let text = generator
            .generate(&session(), &[chunk("A v. B", "https://example.org/1")])
            .await;
        assert_eq!(text.matches("not a substitute for").count(), 1);
    }

    #[tokio::test]
    async fn backend_error_yields_an_apology() {
        let model = MockModel::new().with_unavailable();
        let generator = AdviceGenerator::new(Arc::new(model), 1024);

        let text = generator
            .generate(&session(), &[chunk("A v. B", "https://example.org/1")])
            .await;
        assert!(text.starts_with("I apologize"));
        assert!(text.contains("provider unavailable"));
    }

    #[test]
    fn sources_are_deduplicated_by_title_and_url() {
        let chunks = vec![
            chunk("A v. B", "https://example.org/1"),
            chunk("A v. B", "https://example.org/1"),
            chunk("C v. D", "https://example.org/2"),
        ];
        let sources = AdviceGenerator::sources_from(&chunks);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "A v. B");
        assert_eq!(sources[1].title, "C v. D");
    }

    #[test]
    fn context_truncates_long_chunks() {
        let mut long_chunk = chunk("A v. B", "https://example.org/1");
        long_chunk.content = "x".repeat(2000);
        let context = format_context(&[long_chunk]);
        assert!(context.len() < 700);
        assert!(context.contains("relevance: 88%"));
    }
}
