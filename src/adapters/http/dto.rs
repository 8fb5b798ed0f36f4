//! HTTP DTOs for the consultation API.
//!
//! These types decouple the HTTP contract from domain types.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{
    ConversationMessage, ConversationSession, ResponseKind, TurnOutput,
};
use crate::ports::{SessionStatus, SessionSummary};

/// Request body for POST /api/chat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Session to continue; a new one is created when omitted.
    #[serde(default)]
    pub session_id: Option<String>,
    /// The user's message.
    pub message: String,
}

/// Response body for POST /api/chat.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
    pub message_type: ResponseKind,
    pub facts_collected: std::collections::BTreeMap<String, String>,
    pub facts_needed: Vec<String>,
    pub sources: Vec<SourceView>,
}

impl ChatResponse {
    pub fn from_output(session_id: String, output: TurnOutput) -> Self {
        Self {
            session_id,
            response: output.response_text,
            message_type: output.message_type,
            facts_collected: output.facts_collected,
            facts_needed: output.facts_needed,
            sources: output
                .sources
                .into_iter()
                .map(|s| SourceView {
                    title: s.title,
                    url: s.url,
                    category: s.category,
                })
                .collect(),
        }
    }
}

/// A cited precedent document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceView {
    pub title: String,
    pub url: String,
    pub category: String,
}

/// View of one logged message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

impl From<&ConversationMessage> for MessageView {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            id: message.id.to_string(),
            role: message.role.to_string(),
            content: message.content.clone(),
            timestamp: message.created_at.to_rfc3339(),
        }
    }
}

/// Response body for GET /api/history/{session_id}.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub session_id: String,
    pub intent: Option<String>,
    pub messages: Vec<MessageView>,
}

impl From<&ConversationSession> for HistoryView {
    fn from(session: &ConversationSession) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            intent: session.intent().map(str::to_string),
            messages: session.message_log().iter().map(MessageView::from).collect(),
        }
    }
}

/// One entry of GET /api/conversations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryView {
    pub session_id: String,
    pub last_updated: String,
    pub message_count: usize,
    pub status: SessionStatus,
    pub intent: Option<String>,
}

impl From<SessionSummary> for ConversationSummaryView {
    fn from(summary: SessionSummary) -> Self {
        Self {
            session_id: summary.session_id,
            last_updated: summary.last_updated.to_rfc3339(),
            message_count: summary.message_count,
            status: summary.status,
            intent: summary.intent,
        }
    }
}

/// Error body for non-2xx responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
