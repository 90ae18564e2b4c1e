use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use jollof_persist::{ChatMessage, ChatRole};
use jollof_session::{step_command, Direction, SessionError};
use jollof_types::SessionKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: String,
    #[serde(default)]
    pub recipe_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReplyResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    pub from: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            recipe_id: m.recipe_id,
            from: m.from,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// Answer a chat message
///
/// Short step commands ("next", "back", "repeat") move an existing session
/// instead of asking the model.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatReplyResponse>> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    }
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    let recipe_id = req.recipe_id.as_deref().map(str::trim).filter(|r| !r.is_empty());

    if let (Some(recipe_id), Some(direction)) = (recipe_id, step_command(&req.message)) {
        if let Some(reply) = step_reply(&state, &req.user_id, recipe_id, &req.message, direction).await? {
            return Ok(Json(ChatReplyResponse { reply }));
        }
    }

    let reply = state
        .service
        .assistant
        .reply(&req.user_id, recipe_id, &req.message)
        .await?;
    Ok(Json(ChatReplyResponse { reply }))
}

/// `None` when there is no session to move
async fn step_reply(
    state: &AppState,
    user_id: &str,
    recipe_id: &str,
    message: &str,
    direction: Direction,
) -> ApiResult<Option<String>> {
    let key = SessionKey::new(user_id, recipe_id);
    let service = &state.service;

    let instruction = match service.coordinator.advance(&key, direction).await {
        Ok(instruction) => instruction,
        Err(SessionError::NoActiveSession(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    service
        .assistant
        .record_exchange(user_id, Some(recipe_id), message, &instruction.step)
        .await?;

    let reply = instruction.step.clone();
    service
        .broadcaster
        .emit_to_room(&key.room(), instruction.into_event())
        .await;
    Ok(Some(reply))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path((user_id, recipe_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<ChatMessageResponse>>> {
    let messages = state
        .service
        .assistant
        .history(&user_id, Some(&recipe_id))
        .await?;
    Ok(Json(messages.into_iter().map(ChatMessageResponse::from).collect()))
}
