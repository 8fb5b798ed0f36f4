//! Per-turn routing state machine.
//!
//! One user message produces exactly one traversal through these states.
//! `Clarifying` and the question-asking branch of `Gathering` are suspend
//! points: the machine emits output there and is not re-entered until the
//! next user message arrives.

use serde::{Deserialize, Serialize};

use crate::domain::analysis::ConfidenceTier;
use crate::domain::foundation::StateMachine;

/// Routing state within a single turn traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Understanding the user's intent and information needs.
    #[default]
    Analyzing,

    /// Intent too vague; ask the user to restate. Turn-terminal.
    Clarifying,

    /// Interviewing for missing facts. Suspends when a question is asked.
    Gathering,

    /// Re-checking sufficiency against the accumulated facts.
    Revalidating,

    /// Fetching precedent cases for the finalized fact set.
    Retrieving,

    /// Producing the final advice. Turn-terminal.
    Generating,
}

impl StateMachine for TurnState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TurnState::*;
        matches!(
            (self, target),
            // Low confidence forces clarification
            (Analyzing, Clarifying) |
            // Missing facts start the interview
            (Analyzing, Gathering) |
            // Nothing to gather, go straight to precedents
            (Analyzing, Retrieving) |
            // Interview complete, check sufficiency once
            (Gathering, Revalidating) |
            // Revalidation found new gaps, reopen the interview
            (Revalidating, Gathering) |
            // Sufficient (or circuit breaker tripped)
            (Revalidating, Retrieving) |
            // Retrieval always feeds generation
            (Retrieving, Generating)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TurnState::*;
        match self {
            Analyzing => vec![Clarifying, Gathering, Retrieving],
            Clarifying => vec![],
            Gathering => vec![Revalidating],
            Revalidating => vec![Gathering, Retrieving],
            Retrieving => vec![Generating],
            Generating => vec![],
        }
    }
}

/// Routes after intent analysis.
///
/// Low confidence wins over everything else; otherwise an empty needs list
/// (or previously reached sufficiency) skips the interview entirely.
pub fn route_after_analysis(
    confidence: ConfidenceTier,
    facts_needed_empty: bool,
    sufficiency_reached: bool,
) -> TurnState {
    if confidence.requires_clarification() {
        TurnState::Clarifying
    } else if facts_needed_empty || sufficiency_reached {
        TurnState::Retrieving
    } else {
        TurnState::Gathering
    }
}
