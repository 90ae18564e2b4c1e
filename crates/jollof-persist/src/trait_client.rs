use async_trait::async_trait;
use jollof_types::{CookingMode, SessionKey};

use crate::error::Result;
use crate::models::{ChatMessage, Progress, Recipe, RecipeFilter, StepPosition};

/// Durable per-(user, recipe) progress records
///
/// Implementations keep at most one record per key.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn find_progress(&self, key: &SessionKey) -> Result<Option<Progress>>;

    /// Insert unless a record already exists for the key; returns the stored record
    async fn insert_progress(&self, progress: Progress) -> Result<Progress>;

    /// Insert or overwrite the record for the key (used by regeneration)
    async fn upsert_progress(&self, progress: Progress) -> Result<Progress>;

    /// `None` when no record exists
    async fn update_mode(&self, key: &SessionKey, mode: CookingMode) -> Result<Option<Progress>>;

    /// Conditional write: applies only while the stored position equals `expected`
    ///
    /// Returns `None` if the record is missing or its position moved on.
    async fn update_position(
        &self,
        key: &SessionKey,
        expected: StepPosition,
        next: StepPosition,
    ) -> Result<Option<Progress>>;

    /// All progress records of a user, most recently updated first
    async fn list_progress(&self, user_id: &str) -> Result<Vec<Progress>>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn save_message(&self, message: ChatMessage) -> Result<()>;

    /// Messages for a user and recipe ordered by `created_at` ascending
    async fn history(&self, user_id: &str, recipe_id: Option<&str>) -> Result<Vec<ChatMessage>>;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Recipes that carry an embedding and pass the filter
    async fn recipes_with_embeddings(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>>;
}
