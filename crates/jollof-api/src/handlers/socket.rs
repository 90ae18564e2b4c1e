use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use jollof_session::ConnectionContext;
use std::sync::Arc;

use crate::{auth::AuthUser, state::AppState};

/// Authenticate, then upgrade to a cooking-session socket
///
/// Bad or missing tokens are refused with 401 before the upgrade.
pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state, user))
}

async fn serve_socket(socket: WebSocket, state: Arc<AppState>, user: AuthUser) {
    let broadcaster = state.service.broadcaster.clone();
    let label = user.username.clone().unwrap_or_else(|| user.user_id.clone());
    let (id, mut events) = broadcaster.register(label).await;
    let ctx = ConnectionContext::new(id, user.user_id, user.username);

    tracing::info!(connection = %id, user_id = %ctx.user_id, "socket connected");

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode server event: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // One event at a time, in arrival order
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => state.service.handler.handle_text(&ctx, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                tracing::debug!(connection = %id, "ignoring binary frame");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(connection = %id, "socket read failed: {}", e);
                break;
            }
        }
    }

    broadcaster.disconnect(id).await;
    if let Err(e) = writer.await {
        tracing::warn!(connection = %id, "socket writer ended abnormally: {}", e);
    }

    tracing::info!(connection = %id, user_id = %ctx.user_id, "socket disconnected");
}
