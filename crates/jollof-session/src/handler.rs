use jollof_types::{ClientEvent, RoomKey, ServerEvent, SessionKey};
use std::sync::Arc;

use crate::assistant::CookingAssistant;
use crate::broadcaster::{Broadcaster, ConnectionId};
use crate::command::parse_command;
use crate::coordinator::SessionCoordinator;
use crate::error::{Result, SessionError};

/// Who is on the other end of a socket
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub id: ConnectionId,
    pub user_id: String,
    pub username: Option<String>,
}

impl ConnectionContext {
    pub fn new(id: ConnectionId, user_id: impl Into<String>, username: Option<String>) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            username,
        }
    }

    pub fn label(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.user_id)
    }

    fn session_key(&self, recipe_id: &str) -> SessionKey {
        SessionKey::new(self.user_id.clone(), recipe_id)
    }
}

/// Dispatches client events from one connection
///
/// Failures never close the connection; each becomes exactly one `error`
/// event sent back to the caller.
#[derive(Clone)]
pub struct EventHandler {
    coordinator: Arc<SessionCoordinator>,
    assistant: Arc<CookingAssistant>,
    broadcaster: Arc<Broadcaster>,
}

impl EventHandler {
    pub fn new(
        coordinator: Arc<SessionCoordinator>,
        assistant: Arc<CookingAssistant>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            coordinator,
            assistant,
            broadcaster,
        }
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Handle one raw text frame
    pub async fn handle_text(&self, ctx: &ConnectionContext, text: &str) {
        match ClientEvent::from_json(text) {
            Ok(event) => self.handle(ctx, event).await,
            Err(e) => {
                tracing::debug!(conn = %ctx.id, error = %e, "rejected client frame");
                self.broadcaster.emit_to(ctx.id, ServerEvent::error(e.to_string())).await;
            }
        }
    }

    pub async fn handle(&self, ctx: &ConnectionContext, event: ClientEvent) {
        let name = event.name();
        if let Err(e) = self.dispatch(ctx, event).await {
            match &e {
                SessionError::Persist(_) | SessionError::Conflict(_) => {
                    tracing::error!(conn = %ctx.id, user_id = %ctx.user_id, event = name, error = %e, "event failed")
                }
                _ => {
                    tracing::warn!(conn = %ctx.id, user_id = %ctx.user_id, event = name, error = %e, "event failed")
                }
            }
            self.broadcaster.emit_to(ctx.id, ServerEvent::error(e.user_message())).await;
        }
    }

    async fn dispatch(&self, ctx: &ConnectionContext, event: ClientEvent) -> Result<()> {
        event
            .validate()
            .map_err(|e| SessionError::Invalid(e.to_string()))?;

        match event {
            ClientEvent::Start(payload) => {
                let key = ctx.session_key(&payload.recipe_id);
                let progress = self
                    .coordinator
                    .start(&key, payload.recipe_name.as_deref(), payload.mode)
                    .await?;
                self.broadcaster.join(ctx.id, &key.room()).await;
                self.broadcaster.emit_to(ctx.id, ServerEvent::Progress(progress)).await;
            }
            ClientEvent::VoiceCommand(payload) => {
                let key = ctx.session_key(&payload.recipe_id);
                let instruction = self
                    .coordinator
                    .advance(&key, parse_command(&payload.command))
                    .await?;
                // resumed sockets may not have sent `start` yet
                self.broadcaster.join(ctx.id, &key.room()).await;
                self.broadcaster
                    .emit_to_room(&key.room(), instruction.into_event())
                    .await;
            }
            ClientEvent::ChatMessage(payload) => {
                let reply = self
                    .assistant
                    .reply(&ctx.user_id, Some(payload.recipe_id.trim()), &payload.message)
                    .await?;
                self.broadcaster
                    .emit_to(ctx.id, ServerEvent::ChatReply { message: reply })
                    .await;
            }
            ClientEvent::JoinCookAlong(recipe_id) => {
                self.broadcaster.join(ctx.id, &RoomKey::cook_along(&recipe_id)).await;
            }
            ClientEvent::LeaveCookAlong(recipe_id) => {
                self.broadcaster.leave(ctx.id, &RoomKey::cook_along(&recipe_id)).await;
            }
            ClientEvent::CookAlongMessage(payload) => {
                let room = self.cook_along_room(ctx, &payload.recipe_id).await?;
                let event = ServerEvent::CookAlongChat {
                    user_id: ctx.user_id.clone(),
                    username: ctx.username.clone(),
                    message: payload.message,
                };
                self.broadcaster.emit_to_room(&room, event).await;
            }
            ClientEvent::CookAlongTimer(payload) => {
                let room = self.cook_along_room(ctx, &payload.recipe_id).await?;
                // detached; the countdown runs to completion on its own
                let _timer = self
                    .broadcaster
                    .start_timer(room, payload.seconds, payload.step)
                    .await?;
            }
        }
        Ok(())
    }

    async fn cook_along_room(&self, ctx: &ConnectionContext, recipe_id: &str) -> Result<RoomKey> {
        let room = RoomKey::cook_along(recipe_id);
        if !self.broadcaster.is_member(ctx.id, &room).await {
            return Err(SessionError::Invalid("Join the cook-along first".to_string()));
        }
        Ok(room)
    }
}
