//! File-backed history store.
//!
//! One JSON document per session in a flat directory. Session ids are
//! sanitized before becoming file names so a crafted id cannot escape the
//! storage directory. Listing derives recency from file modification time.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::conversation::ConversationSession;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::{HistoryStore, HistoryStoreError, SessionSummary};

/// Directory-of-JSON-files implementation of [`HistoryStore`].
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    /// Opens (and creates if needed) the storage directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, HistoryStoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| HistoryStoreError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, session_id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(session_id.as_str())))
    }

    async fn read_session(path: &Path) -> Result<ConversationSession, HistoryStoreError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| HistoryStoreError::Io(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| HistoryStoreError::DeserializationFailed(e.to_string()))
    }
}

/// Maps a session id onto a safe file stem.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationSession>, HistoryStoreError> {
        let path = self.path_for(session_id);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(Some(Self::read_session(&path).await?)),
            Ok(false) => Ok(None),
            Err(e) => Err(HistoryStoreError::Io(e.to_string())),
        }
    }

    async fn save(&self, session: &ConversationSession) -> Result<(), HistoryStoreError> {
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| HistoryStoreError::SerializationFailed(e.to_string()))?;
        tokio::fs::write(self.path_for(session.session_id()), json)
            .await
            .map_err(|e| HistoryStoreError::Io(e.to_string()))
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), HistoryStoreError> {
        let path = self.path_for(session_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(HistoryStoreError::NotFound(session_id.to_string()))
            }
            Err(e) => Err(HistoryStoreError::Io(e.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, HistoryStoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| HistoryStoreError::Io(e.to_string()))?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HistoryStoreError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let modified = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .map(|t| Timestamp::from_datetime(DateTime::<Utc>::from(t)))
                .unwrap_or_else(|_| Timestamp::now());
            candidates.push((path, modified));
        }

        let reads = candidates.iter().map(|(path, _)| Self::read_session(path));
        let sessions = futures::future::join_all(reads).await;

        let mut summaries = Vec::new();
        for ((path, modified), result) in candidates.iter().zip(sessions) {
            match result {
                Ok(session) => summaries.push(SessionSummary::from_session(&session, *modified)),
                // A malformed file is skipped, not a listing failure.
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable session file");
                }
            }
        }

        summaries.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> ConversationSession {
        let mut s = ConversationSession::new(SessionId::new(id).unwrap(), "divorce query");
        s.begin_turn("divorce query");
        s.record_fact("marriage_date", "2015");
        s
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        let s = session("file-s1");

        store.save(&s).await.unwrap();
        let loaded = store.load(&SessionId::new("file-s1").unwrap()).await.unwrap();
        assert_eq!(loaded, Some(s));
    }

    #[tokio::test]
    async fn missing_session_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        let loaded = store.load(&SessionId::new("ghost").unwrap()).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn hostile_session_id_stays_inside_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        let s = session("../escape");

        store.save(&s).await.unwrap();
        let loaded = store.load(&SessionId::new("../escape").unwrap()).await.unwrap();
        assert_eq!(loaded, Some(s));
        // Nothing was written outside the storage directory.
        assert!(!dir.path().parent().unwrap().join("escape.json").exists());
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        store.save(&session("gone")).await.unwrap();

        store.delete(&SessionId::new("gone").unwrap()).await.unwrap();
        let result = store.delete(&SessionId::new("gone").unwrap()).await;
        assert!(matches!(result, Err(HistoryStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        store.save(&session("good")).await.unwrap();
        tokio::fs::write(dir.path().join("broken.json"), b"{ not json")
            .await
            .unwrap();

        let listing = store.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].session_id, "good");
        assert_eq!(listing[0].message_count, 1);
    }
}
