//! Chat turn HTTP handler.
//!
//! Endpoint:
//! - POST /api/v1/chat - Send a prompt, optionally continuing a session

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use focusflow_types::chat::ChatReply;

use super::parse_uuid;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    /// Absent (or null) starts a new session.
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// POST /api/v1/chat - Run one chat turn.
pub async fn chat_turn(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }
    let session_id = body.session_id.as_deref().map(parse_uuid).transpose()?;

    let reply = state
        .chat_service
        .handle_chat_turn(&body.prompt, session_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let self_link = format!("/api/v1/sessions/{}", reply.session_id);
    Ok(Json(
        ApiResponse::success(reply, request_id, elapsed).with_link("session", &self_link),
    ))
}
