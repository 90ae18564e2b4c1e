pub mod chat;
pub mod health;
pub mod progress;
pub mod recipes;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, handlers::socket, middleware::logging, state::AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Progress
        .route("/progress/start", post(progress::start))
        .route("/progress/mode", patch(progress::toggle_mode))
        .route("/progress/toggle-mode", post(progress::toggle_mode))
        .route("/progress/regenerate", post(progress::regenerate))
        .route("/progress/{user_id}", get(progress::list_progress))
        .route("/progress/{user_id}/{recipe_id}", get(progress::get_progress))
        // Chat
        .route("/chat/message", post(chat::send_message))
        .route("/chat/history/{user_id}/{recipe_id}", get(chat::history))
        // Recipes
        .route("/recipes/similar", post(recipes::similar))
        .route("/recipes/match", post(recipes::match_ingredients));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // The socket route sits outside the timeout layer; connections are long-lived.
    Router::new()
        .merge(api_routes.layer(TimeoutLayer::new(timeout)))
        .route("/ws", get(socket::upgrade))
        .layer(middleware::from_fn(logging::log_request))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
