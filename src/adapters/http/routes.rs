//! Axum routing table for the consultation API.
//!
//! Endpoints:
//! - POST   /api/chat                      - process one conversation turn
//! - GET    /api/history/{session_id}     - full message log
//! - DELETE /api/history/{session_id}     - remove a session
//! - GET    /api/conversations            - list stored sessions
//! - GET    /health                       - liveness probe

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    chat, delete_history, get_history, health, list_conversations, AppState,
};

/// Routes mounted under /api.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route(
            "/history/:session_id",
            get(get_history).delete(delete_history),
        )
        .route("/conversations", get(list_conversations))
}

/// Complete application router with middleware.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
