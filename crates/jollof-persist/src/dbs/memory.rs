use async_trait::async_trait;
use chrono::Utc;
use jollof_types::{CookingMode, SessionKey};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{ChatMessage, Progress, Recipe, RecipeFilter, StepPosition};
use crate::trait_client::{ChatStore, ProgressStore, RecipeStore};

/// Process-local store for tests and single-node development
#[derive(Default)]
pub struct InMemoryStore {
    progress: RwLock<HashMap<SessionKey, Progress>>,
    messages: RwLock<Vec<ChatMessage>>,
    recipes: RwLock<Vec<Recipe>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes: RwLock::new(recipes),
            ..Self::default()
        }
    }

    pub async fn add_recipe(&self, recipe: Recipe) {
        self.recipes.write().await.push(recipe);
    }

    pub async fn progress_count(&self) -> usize {
        self.progress.read().await.len()
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn find_progress(&self, key: &SessionKey) -> Result<Option<Progress>> {
        Ok(self.progress.read().await.get(key).cloned())
    }

    async fn insert_progress(&self, progress: Progress) -> Result<Progress> {
        let mut records = self.progress.write().await;
        let stored = records.entry(progress.key()).or_insert(progress);
        Ok(stored.clone())
    }

    async fn upsert_progress(&self, mut progress: Progress) -> Result<Progress> {
        let mut records = self.progress.write().await;
        let key = progress.key();
        if let Some(existing) = records.get(&key) {
            progress.id = existing.id.clone();
            progress.created_at = existing.created_at;
        }
        progress.last_updated = Utc::now();
        records.insert(key, progress.clone());
        Ok(progress)
    }

    async fn update_mode(&self, key: &SessionKey, mode: CookingMode) -> Result<Option<Progress>> {
        let mut records = self.progress.write().await;
        Ok(records.get_mut(key).map(|progress| {
            progress.mode = mode;
            progress.last_updated = Utc::now();
            progress.clone()
        }))
    }

    async fn update_position(
        &self,
        key: &SessionKey,
        expected: StepPosition,
        next: StepPosition,
    ) -> Result<Option<Progress>> {
        let mut records = self.progress.write().await;
        match records.get_mut(key) {
            Some(progress) if progress.position() == expected => {
                progress.current_step = next.current_step;
                progress.completed = next.completed;
                progress.last_updated = Utc::now();
                Ok(Some(progress.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_progress(&self, user_id: &str) -> Result<Vec<Progress>> {
        let mut list: Vec<Progress> = self
            .progress
            .read()
            .await
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(list)
    }
}

#[async_trait]
impl ChatStore for InMemoryStore {
    async fn save_message(&self, message: ChatMessage) -> Result<()> {
        self.messages.write().await.push(message);
        Ok(())
    }

    async fn history(&self, user_id: &str, recipe_id: Option<&str>) -> Result<Vec<ChatMessage>> {
        let mut history: Vec<ChatMessage> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.user_id == user_id && m.recipe_id.as_deref() == recipe_id)
            .cloned()
            .collect();
        // stable: equal timestamps keep insertion order
        history.sort_by_key(|m| m.created_at);
        Ok(history)
    }
}

#[async_trait]
impl RecipeStore for InMemoryStore {
    async fn recipes_with_embeddings(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        Ok(self
            .recipes
            .read()
            .await
            .iter()
            .filter(|r| r.embedding.is_some() && filter.matches(r))
            .cloned()
            .collect())
    }
}
