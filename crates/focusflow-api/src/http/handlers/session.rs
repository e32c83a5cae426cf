//! Session HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions?q=      - Sessions grouped by recency, optionally filtered by title
//! - GET    /api/v1/sessions/{id}    - A session with its chat history
//! - PATCH  /api/v1/sessions/{id}    - Rename a session
//! - DELETE /api/v1/sessions/{id}    - Delete a session and its messages

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use focusflow_types::chat::{GroupedSessions, SessionHistory};
use focusflow_types::session::{Session, SessionSummary, SessionUpdate};

use super::parse_uuid;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for session listing.
#[derive(Debug, Default, Deserialize)]
pub struct SessionListQuery {
    /// Case-insensitive title keyword.
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /api/v1/sessions - Grouped session listing.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<ApiResponse<GroupedSessions>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let grouped = state
        .chat_service
        .list_sessions_grouped(query.q.as_deref())
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(grouped, request_id, elapsed)))
}

/// GET /api/v1/sessions/{id} - Session history.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionHistory>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session_id = parse_uuid(&id)?;
    let history = state.chat_service.get_session_history(session_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(history, request_id, elapsed)))
}

/// PATCH /api/v1/sessions/{id} - Rename a session.
pub async fn rename_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SessionUpdate>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session_id = parse_uuid(&id)?;
    let title = body
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("title must not be empty".to_string()))?;

    let session = state
        .chat_service
        .rename_session(session_id, title)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(session, request_id, elapsed)))
}

/// DELETE /api/v1/sessions/{id} - Delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session_id = parse_uuid(&id)?;
    let removed = state.chat_service.delete_session(session_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        SessionSummary::from(&removed),
        request_id,
        elapsed,
    )))
}
