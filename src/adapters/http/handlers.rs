//! HTTP handlers connecting axum routes to the turn processor.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::{TurnError, TurnProcessor};
use crate::domain::foundation::SessionId;
use crate::ports::{HistoryStore, HistoryStoreError};

use super::dto::{
    ChatRequest, ChatResponse, ConversationSummaryView, ErrorResponse, HistoryView,
};

/// Shared application state for the API.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<TurnProcessor>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    pub fn new(processor: Arc<TurnProcessor>, history: Arc<dyn HistoryStore>) -> Self {
        Self { processor, history }
    }
}

/// API-level errors with HTTP mappings.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found: {1}")]
    NotFound(String, String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_, _) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let body = ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::EmptyQuery | TurnError::QueryTooLong { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            TurnError::Storage(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}

impl From<HistoryStoreError> for ApiError {
    fn from(err: HistoryStoreError) -> Self {
        match err {
            HistoryStoreError::NotFound(id) => ApiError::NotFound("session".to_string(), id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// POST /api/chat - processes one conversation turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = match request.session_id {
        Some(raw) => SessionId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => new_session_id(),
    };

    let output = state
        .processor
        .process(session_id.clone(), &request.message)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ChatResponse::from_output(session_id.to_string(), output)),
    ))
}

/// GET /api/history/{session_id} - full message log for a session.
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id =
        SessionId::new(session_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let session = state
        .history
        .load(&session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("session".to_string(), session_id.to_string()))?;
    Ok((StatusCode::OK, Json(HistoryView::from(&session))))
}

/// DELETE /api/history/{session_id} - removes a session's history.
pub async fn delete_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id =
        SessionId::new(session_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.history.delete(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/conversations - lists stored sessions, most recent first.
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.history.list().await?;
    let views: Vec<ConversationSummaryView> = summaries
        .into_iter()
        .map(ConversationSummaryView::from)
        .collect();
    Ok((StatusCode::OK, Json(views)))
}

/// GET /health - liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn new_session_id() -> SessionId {
    // Generated ids fit the SessionId constraints, so this cannot fail.
    SessionId::new(format!("conv_{}", Uuid::new_v4().simple()))
        .unwrap_or_else(|_| unreachable!("generated session id is always valid"))
}
