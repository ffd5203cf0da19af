//! Axum route handlers for the Chat API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::chat::build_chat_prompt;
use crate::chat::session::export_transcript;
use crate::errors::AppError;
use crate::models::chat::{ChatMessage, Role};
use crate::models::reply::TextReply;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Omit to start a new session.
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub reply: TextReply,
    pub history: Vec<ChatMessage>,
}

/// POST /api/v1/chat
///
/// Appends the user message, asks the text capability, appends the reply
/// (or the failure sentence) and returns the updated history.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);
    state
        .sessions
        .append(session_id, ChatMessage::new(Role::User, message))
        .await;

    let reply: TextReply = state
        .llm
        .generate_text(&build_chat_prompt(message))
        .await
        .into();
    info!("Chat reply for session {session_id}: {:?}", reply.status);

    state
        .sessions
        .append(session_id, ChatMessage::new(Role::Assistant, reply.text.clone()))
        .await;

    Ok(Json(ChatResponse {
        session_id,
        reply,
        history: state.sessions.history(session_id).await,
    }))
}

/// GET /api/v1/chat/:session_id
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Json<Vec<ChatMessage>> {
    Json(state.sessions.history(session_id).await)
}

/// DELETE /api/v1/chat/:session_id
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> StatusCode {
    state.sessions.clear(session_id).await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/chat/:session_id/export
pub async fn handle_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let history = state.sessions.history(session_id).await;
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"chat_history.txt\"",
            ),
        ],
        export_transcript(&history),
    )
}
