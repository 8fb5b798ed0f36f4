//! Turn processor - one user message in, one response envelope out.
//!
//! Loads (or creates) the session, routes the message through analysis,
//! the gathering interview, revalidation, retrieval, and generation, then
//! persists the session before returning. The only hard failures are
//! invalid input and storage errors; everything model-shaped degrades
//! locally inside the components.

use std::sync::Arc;

use crate::application::analyzer::IntentAnalyzer;
use crate::application::extractor::AnswerExtractor;
use crate::application::followup::{FollowupClassifier, FollowupIntent};
use crate::application::gathering::{GatherOutcome, GatheringController};
use crate::application::generation::AdviceGenerator;
use crate::application::question::QuestionGenerator;
use crate::application::revalidation::{RevalidationController, RevalidationOutcome};
use crate::domain::conversation::{
    route_after_analysis, ConversationSession, ResponseKind, TurnOutput, TurnState,
};
use crate::domain::foundation::SessionId;
use crate::ports::{HistoryStore, HistoryStoreError, LanguageModel, Retriever};

/// Upper bound on a single message, in characters.
pub const MAX_QUERY_CHARS: usize = 2000;

/// Reply sent when the intent is too vague to act on.
const CLARIFICATION_TEMPLATE: &str =
    "I want to make sure I understand your situation correctly. Could you \
     share a little more detail - what happened, and what kind of help you \
     are looking for?";

/// Tuning knobs for turn processing.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// Precedent chunks fetched per retrieval.
    pub top_k: usize,
    /// Token bound for the final response.
    pub max_response_tokens: u32,
    /// Cap on revalidation rounds per question.
    pub max_revalidation_attempts: u32,
    /// Cap on collected facts before the interview force-closes.
    pub max_facts: usize,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_response_tokens: 1024,
            max_revalidation_attempts: 2,
            max_facts: 10,
        }
    }
}

/// Turn-level errors surfaced to the transport.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("message must not be empty")]
    EmptyQuery,

    #[error("message exceeds {max} characters")]
    QueryTooLong { max: usize },

    #[error(transparent)]
    Storage(#[from] HistoryStoreError),
}

/// Processes complete conversation turns.
pub struct TurnProcessor {
    analyzer: IntentAnalyzer,
    gathering: GatheringController,
    revalidation: RevalidationController,
    followup: FollowupClassifier,
    generator: AdviceGenerator,
    retriever: Arc<dyn Retriever>,
    history: Arc<dyn HistoryStore>,
    options: TurnOptions,
}

impl TurnProcessor {
    /// Wires the controllers around the injected backends.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        retriever: Arc<dyn Retriever>,
        history: Arc<dyn HistoryStore>,
        options: TurnOptions,
    ) -> Self {
        let analyzer = IntentAnalyzer::new(model.clone());
        Self {
            gathering: GatheringController::new(
                AnswerExtractor::new(model.clone()),
                QuestionGenerator::new(model.clone()),
            ),
            revalidation: RevalidationController::new(analyzer.clone())
                .with_limits(options.max_revalidation_attempts, options.max_facts),
            followup: FollowupClassifier::new(model.clone()),
            generator: AdviceGenerator::new(model, options.max_response_tokens),
            analyzer,
            retriever,
            history,
            options,
        }
    }

    /// Processes one user message for the session.
    pub async fn process(
        &self,
        session_id: SessionId,
        query: &str,
    ) -> Result<TurnOutput, TurnError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TurnError::EmptyQuery);
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(TurnError::QueryTooLong {
                max: MAX_QUERY_CHARS,
            });
        }

        let mut session = match self.history.load(&session_id).await? {
            Some(session) => session,
            None => ConversationSession::new(session_id.clone(), query),
        };

        let resuming_interview =
            session.is_gathering_active() && session.current_question_target().is_some();
        let followup_candidate =
            !resuming_interview && !session.is_first_turn() && session.last_response().is_some();

        session.begin_turn(query);
        tracing::info!(
            session_id = %session_id,
            messages = session.message_log().len(),
            resuming_interview,
            "processing turn"
        );

        let output = if resuming_interview {
            self.run_interview(&mut session).await
        } else if followup_candidate {
            self.handle_followup(&mut session).await
        } else {
            self.analyze_and_route(&mut session, None, true).await
        };

        session.record_assistant_response(&output.response_text);
        if output.message_type == ResponseKind::FinalResponse {
            session.set_last_response(&output.response_text);
        }
        self.history.save(&session).await?;
        Ok(output)
    }

    /// Runs analysis on the (possibly overridden) query and routes the turn.
    ///
    /// `honor_sufficiency` is false on the reprocessing path so that changed
    /// facts can reopen the interview even after advice was already given.
    async fn analyze_and_route(
        &self,
        session: &mut ConversationSession,
        query_override: Option<String>,
        honor_sufficiency: bool,
    ) -> TurnOutput {
        let query = query_override.unwrap_or_else(|| session.current_query().to_string());
        let analysis = self.analyzer.analyze(&query, session.facts_collected()).await;

        let confidence = analysis.confidence;
        session.set_intent(&analysis.intent, confidence);
        session.merge_facts(analysis.facts_found);
        session.replace_needed(analysis.facts_still_needed);

        let route = route_after_analysis(
            confidence,
            session.facts_needed().is_empty(),
            honor_sufficiency && session.sufficiency_reached(),
        );
        match route {
            TurnState::Clarifying => TurnOutput::new(
                CLARIFICATION_TEMPLATE,
                ResponseKind::Clarification,
                session.facts_collected().clone(),
                session.facts_needed().to_vec(),
            ),
            TurnState::Gathering => self.run_interview(session).await,
            _ => self.retrieve_and_generate(session).await,
        }
    }

    /// Drives gathering and revalidation until the turn suspends on a
    /// question or proceeds to retrieval.
    async fn run_interview(&self, session: &mut ConversationSession) -> TurnOutput {
        loop {
            match self.gathering.gather_next(session).await {
                GatherOutcome::AskUser(question) => {
                    return TurnOutput::new(
                        question,
                        ResponseKind::InformationGathering,
                        session.facts_collected().clone(),
                        session.facts_needed().to_vec(),
                    );
                }
                GatherOutcome::Done => match self.revalidation.revalidate(session).await {
                    RevalidationOutcome::Sufficient => {
                        return self.retrieve_and_generate(session).await;
                    }
                    // Reopened with a non-empty queue; the next gathering
                    // step will ask, so the loop always terminates.
                    RevalidationOutcome::NeedsMore(_) => continue,
                },
            }
        }
    }

    /// Classifies and dispatches a message that arrived after final advice.
    async fn handle_followup(&self, session: &mut ConversationSession) -> TurnOutput {
        let message = session.current_query().to_string();
        let previous = session.last_response().unwrap_or_default().to_string();
        let classification = self
            .followup
            .classify(&message, &previous, &session.facts_rendering())
            .await;

        match classification.intent {
            FollowupIntent::ClarificationRequest => {
                let reply = self.followup.clarification_reply(&message, &previous).await;
                TurnOutput::new(
                    reply,
                    ResponseKind::FinalResponse,
                    session.facts_collected().clone(),
                    session.facts_needed().to_vec(),
                )
            }
            FollowupIntent::DoubtAboutResponse => {
                let reply = self.followup.doubt_reply(&message, &previous).await;
                TurnOutput::new(
                    reply,
                    ResponseKind::FinalResponse,
                    session.facts_collected().clone(),
                    session.facts_needed().to_vec(),
                )
            }
            FollowupIntent::NewQuestion => {
                session.reset_for_new_question();
                self.analyze_and_route(session, None, true).await
            }
            FollowupIntent::NewInfoAddition | FollowupIntent::Correction => {
                let composite = format!(
                    "{}\n\nFurther information from the user:\n{}",
                    session.composite_query(),
                    message
                );
                self.analyze_and_route(session, Some(composite), false).await
            }
        }
    }

    /// Fetches precedents and produces the final response.
    async fn retrieve_and_generate(&self, session: &mut ConversationSession) -> TurnOutput {
        session.mark_sufficient();

        let query = if session.current_query() == session.root_query() {
            session.root_query().to_string()
        } else {
            format!("{} {}", session.root_query(), session.current_query())
        };

        let chunks = match self.retriever.search(&query, self.options.top_k).await {
            Ok(chunks) => chunks,
            Err(err) => {
                tracing::warn!(
                    session_id = %session.session_id(),
                    error = %err,
                    "retrieval rejected the query, generating without context"
                );
                Vec::new()
            }
        };
        tracing::info!(
            session_id = %session.session_id(),
            chunks = chunks.len(),
            "retrieval complete"
        );

        let text = self.generator.generate(session, &chunks).await;
        let sources = AdviceGenerator::sources_from(&chunks);
        TurnOutput::new(
            text,
            ResponseKind::FinalResponse,
            session.facts_collected().clone(),
            session.facts_needed().to_vec(),
        )
        .with_sources(sources)
    }
}
