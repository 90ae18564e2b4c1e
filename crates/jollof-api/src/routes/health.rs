use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports the storage backends in use and whether the progress store answers.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();

    let store = if state.config.mongodb_uri.is_some() { "mongodb" } else { "memory" };
    let store_status = match state.service.coordinator.list_progress("_health_check").await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!("Progress store health probe failed: {}", e);
            "disconnected"
        }
    };
    services.insert(store.to_string(), store_status.to_string());

    let cache = if state.config.redis_url().is_some() { "redis" } else { "memory" };
    services.insert("cache".to_string(), cache.to_string());

    let status = if store_status == "connected" { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
