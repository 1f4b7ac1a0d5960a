use axum::{Json, extract::State};
use tracing::info;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    state::SharedState,
};

pub async fn message_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let trimmed = payload.message.trim();

    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    // Without a sessionId the exchange is answered but not remembered.
    let session_id = payload
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let history = match session_id {
        Some(sid) => state.history.recent(sid).await,
        None => Vec::new(),
    };

    let replies = state.responder.respond(&history, trimmed);

    if let Some(sid) = session_id {
        state.history.record_exchange(sid, trimmed, &replies).await;
    }

    info!(
        session_id = session_id.unwrap_or("-"),
        history = history.len(),
        replies = replies.len(),
        "chat message handled"
    );

    let response = ChatResponse::from_replies(replies);
    Ok(Json(match session_id {
        Some(sid) => response.with_session(sid),
        None => response,
    }))
}
