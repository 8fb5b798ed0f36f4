//! History store port - persistence for conversation sessions.
//!
//! The snapshot round-trips every field the state machine needs to resume
//! exactly where it left off. The store assumes at most one writer per
//! session per turn; per-session serialization is the caller's concern.

use async_trait::async_trait;

use crate::domain::conversation::ConversationSession;
use crate::domain::foundation::{SessionId, Timestamp};

/// Port for loading and saving conversation sessions.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Loads a session snapshot, or `None` when the session is new.
    async fn load(&self, session_id: &SessionId)
        -> Result<Option<ConversationSession>, HistoryStoreError>;

    /// Persists the session after a turn.
    async fn save(&self, session: &ConversationSession) -> Result<(), HistoryStoreError>;

    /// Deletes a session's history.
    ///
    /// Returns `HistoryStoreError::NotFound` when no such session exists.
    async fn delete(&self, session_id: &SessionId) -> Result<(), HistoryStoreError>;

    /// Lists stored sessions with summary metadata, most recent first.
    async fn list(&self) -> Result<Vec<SessionSummary>, HistoryStoreError>;
}

/// Summary of a stored session, for listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub last_updated: Timestamp,
    pub message_count: usize,
    pub status: SessionStatus,
    pub intent: Option<String>,
}

/// Coarse progress label derived from a session snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Analyzing,
    GatheringInfo,
    Completed,
}

impl SessionSummary {
    /// Derives a summary from a session snapshot.
    pub fn from_session(session: &ConversationSession, last_updated: Timestamp) -> Self {
        let status = if session.sufficiency_reached() {
            SessionStatus::Completed
        } else if session.is_gathering_active() {
            SessionStatus::GatheringInfo
        } else {
            SessionStatus::Analyzing
        };
        Self {
            session_id: session.session_id().to_string(),
            last_updated,
            message_count: session.message_log().len(),
            status,
            intent: session.intent().map(str::to_string),
        }
    }
}

/// History store errors.
#[derive(Debug, thiserror::Error)]
pub enum HistoryStoreError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("failed to deserialize session: {0}")]
    DeserializationFailed(String),

    #[error("io error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ConversationSession {
        ConversationSession::new(SessionId::new("s1").unwrap(), "divorce help please now")
    }

    #[test]
    fn fresh_session_summarizes_as_analyzing() {
        let summary = SessionSummary::from_session(&session(), Timestamp::now());
        assert_eq!(summary.status, SessionStatus::Analyzing);
        assert_eq!(summary.session_id, "s1");
    }

    #[test]
    fn interviewing_session_summarizes_as_gathering() {
        let mut s = session();
        s.note_question_asked("user_gender", "q");
        let summary = SessionSummary::from_session(&s, Timestamp::now());
        assert_eq!(summary.status, SessionStatus::GatheringInfo);
    }

    #[test]
    fn sufficient_session_summarizes_as_completed() {
        let mut s = session();
        s.mark_sufficient();
        let summary = SessionSummary::from_session(&s, Timestamp::now());
        assert_eq!(summary.status, SessionStatus::Completed);
    }
}
