use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only chat log entry between a cook and the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub recipe_id: Option<String>,
    pub from: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn new(
        user_id: impl Into<String>,
        recipe_id: Option<String>,
        from: ChatRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            recipe_id,
            from,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(user_id: impl Into<String>, recipe_id: Option<String>, content: impl Into<String>) -> Self {
        Self::new(user_id, recipe_id, ChatRole::User, content)
    }

    pub fn assistant(user_id: impl Into<String>, recipe_id: Option<String>, content: impl Into<String>) -> Self {
        Self::new(user_id, recipe_id, ChatRole::Assistant, content)
    }
}
