//! In-memory history store for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationSession;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::{HistoryStore, HistoryStoreError, SessionSummary};

/// Map-backed implementation of [`HistoryStore`].
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<String, (ConversationSession, Timestamp)>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationSession>, HistoryStoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id.as_str())
            .map(|(session, _)| session.clone()))
    }

    async fn save(&self, session: &ConversationSession) -> Result<(), HistoryStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session.session_id().to_string(),
            (session.clone(), Timestamp::now()),
        );
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), HistoryStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id.as_str())
            .map(|_| ())
            .ok_or_else(|| HistoryStoreError::NotFound(session_id.to_string()))
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, HistoryStoreError> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .values()
            .map(|(session, updated)| SessionSummary::from_session(session, *updated))
            .collect();
        summaries.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> ConversationSession {
        ConversationSession::new(SessionId::new(id).unwrap(), "query text")
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryHistoryStore::new();
        let mut s = session("s1");
        s.begin_turn("query text");
        store.save(&s).await.unwrap();

        let loaded = store.load(&SessionId::new("s1").unwrap()).await.unwrap();
        assert_eq!(loaded, Some(s));
    }

    #[tokio::test]
    async fn missing_session_loads_as_none() {
        let store = InMemoryHistoryStore::new();
        let loaded = store.load(&SessionId::new("nope").unwrap()).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn delete_removes_and_errors_on_missing() {
        let store = InMemoryHistoryStore::new();
        store.save(&session("s1")).await.unwrap();

        store.delete(&SessionId::new("s1").unwrap()).await.unwrap();
        let result = store.delete(&SessionId::new("s1").unwrap()).await;
        assert!(matches!(result, Err(HistoryStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_returns_most_recent_first() {
        let store = InMemoryHistoryStore::new();
        store.save(&session("older")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.save(&session("newer")).await.unwrap();

        let listing = store.list().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].session_id, "newer");
    }
}
