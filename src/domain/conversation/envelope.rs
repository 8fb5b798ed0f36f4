//! Per-turn output envelope.
//!
//! Whatever the transport (HTTP, CLI, tests), each processed turn yields
//! exactly one of these.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of reply this turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// The assistant needs the user to restate or expand their request.
    Clarification,
    /// The assistant asked a targeted interview question.
    InformationGathering,
    /// Final advice (or a polite degradation of it).
    FinalResponse,
}

/// Reference to a precedent document cited in a final response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub category: String,
}

/// The one externally observable result of processing a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutput {
    /// Text shown to the user.
    pub response_text: String,
    /// Classification of the reply.
    pub message_type: ResponseKind,
    /// Facts collected so far.
    pub facts_collected: BTreeMap<String, String>,
    /// Fact keys still outstanding.
    pub facts_needed: Vec<String>,
    /// Cited precedents (empty unless a final response drew on retrieval).
    pub sources: Vec<SourceRef>,
}

impl TurnOutput {
    /// Builds an envelope carrying the current fact snapshot.
    pub fn new(
        response_text: impl Into<String>,
        message_type: ResponseKind,
        facts_collected: BTreeMap<String, String>,
        facts_needed: Vec<String>,
    ) -> Self {
        Self {
            response_text: response_text.into(),
            message_type,
            facts_collected,
            facts_needed,
            sources: Vec::new(),
        }
    }

    /// Attaches cited sources.
    pub fn with_sources(mut self, sources: Vec<SourceRef>) -> Self {
        self.sources = sources;
        self
    }
}
