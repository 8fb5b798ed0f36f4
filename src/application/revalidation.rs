//! Revalidation controller - decides whether the collected facts suffice.
//!
//! After an interview round drains the queue, the combined picture (root
//! query plus collected facts) is re-analyzed once. Missing critical facts
//! reopen gathering; otherwise the session is marked sufficient. Two caps
//! bound the loop so a user is never interviewed forever: a maximum number
//! of revalidation rounds and a maximum fact count. Failures count as
//! sufficient, never as another round of questions.

use crate::application::analyzer::IntentAnalyzer;
use crate::domain::conversation::ConversationSession;

/// Default cap on re-analysis rounds per question.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
/// Default cap on collected facts before the interview force-closes.
pub const DEFAULT_MAX_FACTS: usize = 10;

/// Outcome of a revalidation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationOutcome {
    /// Enough is known; proceed to retrieval.
    Sufficient,
    /// More facts are needed; gathering has been reopened with this queue.
    NeedsMore(Vec<String>),
}

/// Checks fact sufficiency and bounds the gathering loop.
#[derive(Clone)]
pub struct RevalidationController {
    analyzer: IntentAnalyzer,
    max_attempts: u32,
    max_facts: usize,
}

impl RevalidationController {
    pub fn new(analyzer: IntentAnalyzer) -> Self {
        Self {
            analyzer,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_facts: DEFAULT_MAX_FACTS,
        }
    }

    /// Overrides the loop caps.
    pub fn with_limits(mut self, max_attempts: u32, max_facts: usize) -> Self {
        self.max_attempts = max_attempts;
        self.max_facts = max_facts;
        self
    }

    /// Revalidates the session, either closing the interview or reopening it.
    pub async fn revalidate(&self, session: &mut ConversationSession) -> RevalidationOutcome {
        if session.revalidation_attempts() >= self.max_attempts
            || session.facts_collected().len() >= self.max_facts
        {
            tracing::info!(
                session_id = %session.session_id(),
                attempts = session.revalidation_attempts(),
                facts = session.facts_collected().len(),
                "revalidation cap reached, treating facts as sufficient"
            );
            session.mark_sufficient();
            return RevalidationOutcome::Sufficient;
        }

        let composite = session.composite_query();
        let analysis = self
            .analyzer
            .analyze(&composite, session.facts_collected())
            .await;

        let missing: Vec<String> = analysis
            .facts_still_needed
            .into_iter()
            .filter(|key| !session.facts_collected().contains_key(key))
            .collect();

        if missing.is_empty() {
            session.mark_sufficient();
            return RevalidationOutcome::Sufficient;
        }

        session.queue_needed_facts(missing.iter().cloned());
        if session.facts_needed().is_empty() {
            // Everything the analysis wanted is already accounted for.
            session.mark_sufficient();
            return RevalidationOutcome::Sufficient;
        }

        session.record_revalidation_attempt();
        session.reopen_gathering();
        tracing::info!(
            session_id = %session.session_id(),
            attempt = session.revalidation_attempts(),
            missing = ?missing,
            "revalidation reopened gathering"
        );
        RevalidationOutcome::NeedsMore(missing)
    }
}
