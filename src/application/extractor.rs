//! Answer extraction - turns a free-text reply into a stored fact value.
//!
//! Short replies to yes/no and gender questions resolve locally without a
//! model call. Everything else goes through one structured extraction call.
//! The component is total: a backend failure yields the raw reply verbatim
//! so the user's words are never lost mid-interview.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::analysis::parse_typed;
use crate::domain::gathering::{is_gender_key, match_short_form, normalize_gender};
use crate::ports::{CompletionRequest, LanguageModel, PromptRole};

const EXTRACTION_SYSTEM_PROMPT: &str =
    "You extract a single requested fact from a user's reply. Respond ONLY with valid JSON.";

/// Sentinel values the model may emit when the reply held nothing relevant.
const NOT_PROVIDED_MARKERS: &[&str] = &["not provided", "not_provided", "none", "n/a", ""];

#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    extracted_value: String,
}

/// Result of extracting one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedAnswer {
    /// The reply answered the question with this value.
    Value(String),
    /// The reply held no relevant information for the asked fact.
    NotProvided,
}

/// Extracts fact values from interview replies.
#[derive(Clone)]
pub struct AnswerExtractor {
    model: Arc<dyn LanguageModel>,
}

impl AnswerExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Extracts the value for `target_key` from the user's reply to `question`.
    pub async fn extract(
        &self,
        question: &str,
        answer: &str,
        target_key: &str,
    ) -> ExtractedAnswer {
        let answer = answer.trim();

        if let Some(value) = match_short_form(target_key, answer) {
            return ExtractedAnswer::Value(value);
        }

        let prompt = format!(
            "The user was asked: \"{question}\"\n\
             The fact being collected is: \"{target_key}\"\n\
             The user replied: \"{answer}\"\n\n\
             Extract the value that answers the question. Keep it concise.\n\
             If the reply contains nothing relevant to the asked fact, use \"NOT_PROVIDED\".\n\n\
             Respond with JSON only:\n{{\"extracted_value\": \"value or NOT_PROVIDED\"}}"
        );
        let request = CompletionRequest::new()
            .with_system_prompt(EXTRACTION_SYSTEM_PROMPT)
            .with_message(PromptRole::User, prompt)
            .with_max_tokens(256);

        let response = match self.model.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    target = target_key,
                    "extraction call failed, storing raw reply"
                );
                return ExtractedAnswer::Value(answer.to_string());
            }
        };

        let raw = match parse_typed::<RawExtraction>(&response.content) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    target = target_key,
                    "extraction payload unusable, storing raw reply"
                );
                return ExtractedAnswer::Value(answer.to_string());
            }
        };

        let value = raw.extracted_value.trim();
        let lowered = value.to_lowercase();
        if lowered == "not_provided" || NOT_PROVIDED_MARKERS.contains(&lowered.as_str()) {
            return ExtractedAnswer::NotProvided;
        }

        if is_gender_key(target_key) {
            ExtractedAnswer::Value(normalize_gender(value))
        } else {
            ExtractedAnswer::Value(value.to_string())
        }
    }
}
