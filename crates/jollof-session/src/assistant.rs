use jollof_llm::{ChatClient, ChatRequest, Message};
use jollof_persist::{ChatMessage, ChatStore};
use jollof_types::LLMConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SessionError};
use crate::upstream::call_with_retry;

const SYSTEM_PROMPT: &str = "You are a friendly cooking assistant. Keep replies concise.";
const FALLBACK_REPLY: &str = "Got it!";

/// Answers free-form cooking questions and keeps the chat history
pub struct CookingAssistant {
    client: Arc<dyn ChatClient>,
    chats: Arc<dyn ChatStore>,
    config: LLMConfig,
    timeout: Duration,
}

impl CookingAssistant {
    pub fn new(
        client: Arc<dyn ChatClient>,
        chats: Arc<dyn ChatStore>,
        config: LLMConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            chats,
            config,
            timeout,
        }
    }

    /// Store the question, ask the model, store and return the answer
    pub async fn reply(&self, user_id: &str, recipe_id: Option<&str>, message: &str) -> Result<String> {
        let recipe_id = recipe_id.map(str::to_string);
        self.chats
            .save_message(ChatMessage::user(user_id, recipe_id.clone(), message))
            .await?;

        let request = ChatRequest::new(
            self.config.model.clone(),
            vec![Message::system(SYSTEM_PROMPT), Message::human(message)],
        );
        let response = call_with_retry("assistant_reply", self.timeout, || {
            self.client.chat(request.clone())
        })
        .await
        .map_err(|failure| SessionError::Unavailable(format!("assistant reply {}", failure)))?;

        let reply = response
            .content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());

        self.chats
            .save_message(ChatMessage::assistant(user_id, recipe_id, reply.clone()))
            .await?;
        Ok(reply)
    }

    /// Persist a question answered without the model (step commands)
    pub async fn record_exchange(
        &self,
        user_id: &str,
        recipe_id: Option<&str>,
        question: &str,
        answer: &str,
    ) -> Result<()> {
        let recipe_id = recipe_id.map(str::to_string);
        self.chats
            .save_message(ChatMessage::user(user_id, recipe_id.clone(), question))
            .await?;
        self.chats
            .save_message(ChatMessage::assistant(user_id, recipe_id, answer))
            .await?;
        Ok(())
    }

    pub async fn history(&self, user_id: &str, recipe_id: Option<&str>) -> Result<Vec<ChatMessage>> {
        Ok(self.chats.history(user_id, recipe_id).await?)
    }
}
