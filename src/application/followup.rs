//! Follow-up handling after a final answer was delivered.
//!
//! A message arriving after advice was given is classified into one of five
//! intents; additions and corrections re-enter the analysis pipeline, while
//! clarifications and doubts get a direct reply grounded in the previous
//! answer. Classification failures take the conservative path and treat the
//! message as a clarification request, which never discards session state.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::analysis::parse_typed;
use crate::ports::{CompletionRequest, LanguageModel, PromptRole};

const CLASSIFY_SYSTEM_PROMPT: &str =
    "You classify follow-up messages in a legal advice conversation. \
     Respond ONLY with valid JSON.";

const REPLY_SYSTEM_PROMPT: &str =
    "You are a helpful legal assistant for Indian family law. The user is \
     asking about advice you already gave. Answer their specific question \
     using the previous response; do not start the consultation over.";

/// Canned reply when a direct clarification answer cannot be generated.
const CLARIFICATION_FALLBACK: &str =
    "I'd be happy to clarify. Could you tell me which part of my previous \
     response you would like me to explain further?";

/// Canned reply when a doubt response cannot be generated.
const DOUBT_FALLBACK: &str =
    "I understand your concern. The guidance I gave is based on the details \
     you shared and general provisions of Indian family law; for a decision \
     specific to your case, please consult a practising advocate. Is there a \
     particular point you would like me to reconsider?";

/// What a post-advice message is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupIntent {
    /// New facts about the same matter.
    NewInfoAddition,
    /// A correction to something previously stated.
    Correction,
    /// A request to explain the previous answer.
    ClarificationRequest,
    /// An unrelated fresh question.
    NewQuestion,
    /// The user disputes or doubts the previous answer.
    DoubtAboutResponse,
}

impl FollowupIntent {
    /// Whether this intent sends the turn back through analysis.
    pub fn requires_reprocessing(self) -> bool {
        matches!(
            self,
            Self::NewInfoAddition | Self::Correction | Self::NewQuestion
        )
    }
}

/// Classification of one follow-up message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowupClassification {
    pub intent: FollowupIntent,
    /// Free-text topic the classifier attributed the message to, if any.
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    intent_type: FollowupIntent,
    #[serde(default)]
    specific_topic: Option<String>,
}

/// Classifies and answers post-advice follow-ups.
#[derive(Clone)]
pub struct FollowupClassifier {
    model: Arc<dyn LanguageModel>,
}

impl FollowupClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Classifies a follow-up message against the conversation so far.
    ///
    /// Total function: any failure classifies as a clarification request,
    /// the only intent that cannot lose collected facts.
    pub async fn classify(
        &self,
        message: &str,
        previous_response: &str,
        facts_rendering: &str,
    ) -> FollowupClassification {
        let preview: String = previous_response.chars().take(600).collect();
        let prompt = format!(
            "Previous advice given (excerpt):\n{preview}\n\n\
             Case information on record:\n{facts_rendering}\n\n\
             The user now says:\n{message}\n\n\
             Classify the message as exactly one of:\n\
             - new_info_addition: new facts about the same matter\n\
             - correction: fixes something previously stated\n\
             - clarification_request: asks to explain the previous advice\n\
             - new_question: an unrelated fresh legal question\n\
             - doubt_about_response: disputes or doubts the advice\n\n\
             Respond with JSON only:\n\
             {{\"intent_type\": \"...\", \"specific_topic\": \"brief topic or null\"}}"
        );
        let request = CompletionRequest::new()
            .with_system_prompt(CLASSIFY_SYSTEM_PROMPT)
            .with_message(PromptRole::User, prompt)
            .with_max_tokens(256);

        let fallback = FollowupClassification {
            intent: FollowupIntent::ClarificationRequest,
            topic: None,
        };

        let response = match self.model.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "follow-up classification failed, assuming clarification");
                return fallback;
            }
        };

        match parse_typed::<RawClassification>(&response.content) {
            Ok(raw) => {
                tracing::info!(intent = ?raw.intent_type, "follow-up classified");
                FollowupClassification {
                    intent: raw.intent_type,
                    topic: raw.specific_topic.filter(|t| !t.trim().is_empty()),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "follow-up payload unusable, assuming clarification");
                fallback
            }
        }
    }

    /// Directly answers a clarification request about the previous response.
    pub async fn clarification_reply(&self, message: &str, previous_response: &str) -> String {
        self.direct_reply(message, previous_response, CLARIFICATION_FALLBACK)
            .await
    }

    /// Directly addresses a doubt about the previous response.
    pub async fn doubt_reply(&self, message: &str, previous_response: &str) -> String {
        self.direct_reply(message, previous_response, DOUBT_FALLBACK)
            .await
    }

    async fn direct_reply(
        &self,
        message: &str,
        previous_response: &str,
        fallback: &str,
    ) -> String {
        let request = CompletionRequest::new()
            .with_system_prompt(REPLY_SYSTEM_PROMPT)
            .with_message(
                PromptRole::User,
                format!(
                    "Previous response:\n{previous_response}\n\n\
                     The user's follow-up:\n{message}"
                ),
            )
            .with_max_tokens(512);

        match self.model.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => fallback.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "direct follow-up reply failed, using canned text");
                fallback.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::MockModel;

    #[tokio::test]
    async fn classifies_a_correction() {
        let model = MockModel::new().with_response(
            r#"{"intent_type": "correction", "specific_topic": "marriage year"}"#,
        );
        let classifier = FollowupClassifier::new(Arc::new(model));

        let classification = classifier
            .classify(
                "sorry, we actually married in 2016 not 2015",
                "Based on your 2015 marriage...",
                "- Marriage Date: 2015",
            )
            .await;

        assert_eq!(classification.intent, FollowupIntent::Correction);
        assert_eq!(classification.topic.as_deref(), Some("marriage year"));
        assert!(classification.intent.requires_reprocessing());
    }

    #[tokio::test]
    async fn classifies_a_doubt() {
        let model = MockModel::new()
            .with_response(r#"{"intent_type": "doubt_about_response", "specific_topic": null}"#);
        let classifier = FollowupClassifier::new(Arc::new(model));

        let classification = classifier
            .classify("are you sure that section applies to me?", "...", "...")
            .await;

        assert_eq!(classification.intent, FollowupIntent::DoubtAboutResponse);
        assert!(!classification.intent.requires_reprocessing());
    }

    #[tokio::test]
    async fn backend_error_assumes_clarification() {
        let model = MockModel::new().with_unavailable();
        let classifier = FollowupClassifier::new(Arc::new(model));

        let classification = classifier.classify("what does that mean?", "...", "...").await;
        assert_eq!(classification.intent, FollowupIntent::ClarificationRequest);
    }

    #[tokio::test]
    async fn unknown_label_assumes_clarification() {
        let model = MockModel::new()
            .with_response(r#"{"intent_type": "something_else", "specific_topic": null}"#);
        let classifier = FollowupClassifier::new(Arc::new(model));

        let classification = classifier.classify("hm", "...", "...").await;
        assert_eq!(classification.intent, FollowupIntent::ClarificationRequest);
    }

    #[tokio::test]
    async fn clarification_reply_uses_the_model_output() {
        let model = MockModel::new()
            .with_response("Section 13 covers the grounds for divorce; in your case...");
        let classifier = FollowupClassifier::new(Arc::new(model));

        let reply = classifier
            .clarification_reply("what is section 13?", "Under Section 13...")
            .await;
        assert!(reply.starts_with("Section 13 covers"));
    }

    #[tokio::test]
    async fn doubt_reply_falls_back_when_backend_is_down() {
        let model = MockModel::new().with_unavailable();
        let classifier = FollowupClassifier::new(Arc::new(model));

        let reply = classifier.doubt_reply("I don't believe this", "...").await;
        assert_eq!(reply, DOUBT_FALLBACK);
    }
}
