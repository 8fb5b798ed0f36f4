//! Question generation for the information-gathering interview.
//!
//! One model call phrases a single, empathetic question for the next
//! needed fact. On any failure the component falls back to a template
//! built from the fact key, so a question is always produced.

use std::sync::Arc;

use crate::domain::analysis::titleize_key;
use crate::ports::{CompletionRequest, LanguageModel, PromptRole};

const QUESTION_SYSTEM_PROMPT: &str =
    "You are an empathetic legal intake assistant for Indian family law. \
     Ask exactly one clear question. Respond with the question text only.";

/// Generates interview questions, one fact at a time.
#[derive(Clone)]
pub struct QuestionGenerator {
    model: Arc<dyn LanguageModel>,
}

impl QuestionGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Phrases a question for `target_key`, given the interview context.
    ///
    /// Total function: backend failures yield [`fallback_question`].
    pub async fn generate(
        &self,
        target_key: &str,
        intent: Option<&str>,
        facts_rendering: &str,
    ) -> String {
        let intent = intent.unwrap_or("family law matter");
        let prompt = format!(
            "The user is seeking help with: {intent}\n\n\
             Information collected so far:\n{facts_rendering}\n\n\
             Ask ONE short, empathetic question to learn: {target_key}\n\
             Do not re-ask anything already collected. Do not give advice yet.\n\
             Reply with the question text only, no preamble."
        );
        let request = CompletionRequest::new()
            .with_system_prompt(QUESTION_SYSTEM_PROMPT)
            .with_message(PromptRole::User, prompt)
            .with_max_tokens(128);

        match self.model.complete(request).await {
            Ok(response) => {
                let question = clean_question(&response.content);
                if question.is_empty() {
                    fallback_question(target_key)
                } else {
                    question
                }
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    target = target_key,
                    "question generation failed, using template"
                );
                fallback_question(target_key)
            }
        }
    }
}

/// Template question used whenever generation fails.
pub fn fallback_question(target_key: &str) -> String {
    format!(
        "Could you please provide details about: {}?",
        titleize_key(target_key)
    )
}

/// Strips labels like "Question:" and surrounding quotes from model output.
fn clean_question(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some((prefix, rest)) = text.split_once(':') {
        // Only treat a short leading word as a label, not sentence text.
        if prefix.len() <= 12 && !prefix.contains(' ') {
            text = rest.trim();
        }
    }
    text.trim_matches('"').trim().to_string()
}
