//! Information-gathering controller - the one-question-per-turn interview.
//!
//! Each call ingests the reply to the previously asked question (if any),
//! then either asks for the next needed fact or reports the interview done.
//! Forward progress is the invariant: an ingested fact is never re-queued,
//! and a reply that did not answer the question still retires its target
//! (the reply text is preserved under the additional-info key). Internal
//! faults close the interview rather than wedge it.

use crate::application::extractor::{AnswerExtractor, ExtractedAnswer};
use crate::application::question::QuestionGenerator;
use crate::domain::conversation::ConversationSession;
use crate::domain::gathering::is_gender_key;

/// Outcome of one gathering step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatherOutcome {
    /// The interview continues; ask the user this question and suspend.
    AskUser(String),
    /// Every queued fact is resolved; move on to revalidation.
    Done,
}

#[derive(Debug, thiserror::Error)]
enum GatherFault {
    #[error("question target set without pending question text")]
    MissingPendingQuestion,
}

/// Drives the fact-gathering interview over a session.
#[derive(Clone)]
pub struct GatheringController {
    extractor: AnswerExtractor,
    questions: QuestionGenerator,
}

impl GatheringController {
    pub fn new(extractor: AnswerExtractor, questions: QuestionGenerator) -> Self {
        Self {
            extractor,
            questions,
        }
    }

    /// Runs one interview step against the session.
    ///
    /// Never errors: an inconsistent session closes the interview so the
    /// turn can proceed to retrieval instead of stalling.
    pub async fn gather_next(&self, session: &mut ConversationSession) -> GatherOutcome {
        match self.step(session).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                tracing::warn!(
                    session_id = %session.session_id(),
                    error = %fault,
                    "gathering fault, closing the interview"
                );
                session.mark_sufficient();
                GatherOutcome::Done
            }
        }
    }

    async fn step(
        &self,
        session: &mut ConversationSession,
    ) -> Result<GatherOutcome, GatherFault> {
        self.ingest_pending_reply(session).await?;

        while let Some(target) = session.peek_needed().map(str::to_string) {
            // A gender fact answered along the way needs no question of its own.
            if is_gender_key(&target) && session.facts_collected().contains_key(&target) {
                session.drop_needed(&target);
                continue;
            }

            let question = self
                .questions
                .generate(&target, session.intent(), &session.facts_rendering())
                .await;
            session.note_question_asked(&target, &question);
            tracing::info!(
                session_id = %session.session_id(),
                target = %target,
                step = session.gathering_step(),
                "asking for next fact"
            );
            return Ok(GatherOutcome::AskUser(question));
        }

        session.finish_gathering();
        Ok(GatherOutcome::Done)
    }

    /// Folds the reply to the last asked question into the fact set.
    async fn ingest_pending_reply(
        &self,
        session: &mut ConversationSession,
    ) -> Result<(), GatherFault> {
        let Some(target) = session.current_question_target().map(str::to_string) else {
            return Ok(());
        };
        let question = session
            .pending_question_text()
            .ok_or(GatherFault::MissingPendingQuestion)?
            .to_string();
        let reply = session.current_query().to_string();

        match self.extractor.extract(&question, &reply, &target).await {
            ExtractedAnswer::Value(value) => {
                tracing::info!(
                    session_id = %session.session_id(),
                    target = %target,
                    "fact collected"
                );
                session.record_fact(&target, value);
            }
            ExtractedAnswer::NotProvided => {
                tracing::info!(
                    session_id = %session.session_id(),
                    target = %target,
                    "reply did not answer the question, keeping it as additional info"
                );
                session.append_additional_info(&reply);
                session.drop_needed(&target);
            }
        }
        session.clear_pending_question();
        Ok(())
    }
}
