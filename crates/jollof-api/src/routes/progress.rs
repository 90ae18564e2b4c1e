use axum::{
    extract::{Path, State},
    Json,
};
use jollof_types::{CookingMode, ProgressPayload, SessionKey};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub recipe_id: String,
    #[serde(default)]
    pub recipe_name: Option<String>,
    #[serde(default)]
    pub mode: Option<CookingMode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRequest {
    pub recipe_id: String,
    pub mode: CookingMode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub recipe_id: String,
    pub recipe_name: String,
}

fn session_key(user: &AuthUser, recipe_id: &str) -> ApiResult<SessionKey> {
    let recipe_id = recipe_id.trim();
    if recipe_id.is_empty() {
        return Err(ApiError::BadRequest("recipeId is required".to_string()));
    }
    Ok(SessionKey::new(user.user_id.clone(), recipe_id))
}

/// Begin or resume the caller's session for a recipe
///
/// The response always carries the step list, including on resume.
pub async fn start(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<StartRequest>,
) -> ApiResult<Json<ProgressPayload>> {
    let key = session_key(&user, &req.recipe_id)?;
    let coordinator = &state.service.coordinator;
    let payload = coordinator
        .start(&key, req.recipe_name.as_deref(), req.mode)
        .await?;
    if payload.steps.is_some() {
        return Ok(Json(payload));
    }

    // Cache hit: position comes from the cache, steps from storage
    let progress = coordinator.progress(&key).await?;
    Ok(Json(ProgressPayload {
        steps: Some(progress.steps),
        last_updated: Some(progress.last_updated),
        ..payload
    }))
}

pub async fn toggle_mode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ModeRequest>,
) -> ApiResult<Json<ProgressPayload>> {
    let key = session_key(&user, &req.recipe_id)?;
    let payload = state.service.coordinator.toggle_mode(&key, req.mode).await?;
    Ok(Json(payload))
}

/// Generate a fresh step list and restart from the first step
pub async fn regenerate(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<RegenerateRequest>,
) -> ApiResult<Json<ProgressPayload>> {
    let key = session_key(&user, &req.recipe_id)?;
    let payload = state
        .service
        .coordinator
        .regenerate(&key, &req.recipe_name)
        .await?;
    Ok(Json(payload))
}

/// All of a cook's sessions, most recently touched first
pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<ProgressPayload>>> {
    user.ensure_owner(&user_id)?;
    let records = state.service.coordinator.list_progress(&user_id).await?;
    Ok(Json(records.iter().map(|p| p.payload()).collect()))
}

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((user_id, recipe_id)): Path<(String, String)>,
) -> ApiResult<Json<ProgressPayload>> {
    user.ensure_owner(&user_id)?;
    let key = SessionKey::new(user_id, recipe_id);
    let progress = state.service.coordinator.progress(&key).await?;
    Ok(Json(progress.payload()))
}
