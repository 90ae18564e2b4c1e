use async_trait::async_trait;
use jollof_types::{CookingMode, SessionKey};
use mongodb::Client;

use crate::dbs::mongo::models::{MongoChatMessage, MongoProgress};
use crate::dbs::mongo::repositories::{
    MongoChatRepository, MongoProgressRepository, MongoRecipeRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{ChatMessage, Progress, Recipe, RecipeFilter, StepPosition};
use crate::trait_client::{ChatStore, ProgressStore, RecipeStore};

pub struct MongoPersistenceClient {
    progress_repo: MongoProgressRepository,
    chat_repo: MongoChatRepository,
    recipe_repo: MongoRecipeRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and make sure the progress index exists
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let progress_repo = MongoProgressRepository::new(&client, database);
        let chat_repo = MongoChatRepository::new(&client, database);
        let recipe_repo = MongoRecipeRepository::new(&client, database);

        progress_repo.ensure_indexes().await?;
        tracing::info!(database, "connected to MongoDB");

        Ok(Self {
            progress_repo,
            chat_repo,
            recipe_repo,
        })
    }
}

#[async_trait]
impl ProgressStore for MongoPersistenceClient {
    async fn find_progress(&self, key: &SessionKey) -> Result<Option<Progress>> {
        Ok(self.progress_repo.find(key).await?.map(Into::into))
    }

    async fn insert_progress(&self, progress: Progress) -> Result<Progress> {
        let stored = self
            .progress_repo
            .insert_if_absent(MongoProgress::from(progress))
            .await?;
        Ok(stored.into())
    }

    async fn upsert_progress(&self, progress: Progress) -> Result<Progress> {
        let stored = self.progress_repo.upsert(MongoProgress::from(progress)).await?;
        Ok(stored.into())
    }

    async fn update_mode(&self, key: &SessionKey, mode: CookingMode) -> Result<Option<Progress>> {
        Ok(self.progress_repo.update_mode(key, mode).await?.map(Into::into))
    }

    async fn update_position(
        &self,
        key: &SessionKey,
        expected: StepPosition,
        next: StepPosition,
    ) -> Result<Option<Progress>> {
        Ok(self
            .progress_repo
            .update_position(key, expected, next)
            .await?
            .map(Into::into))
    }

    async fn list_progress(&self, user_id: &str) -> Result<Vec<Progress>> {
        let records = self.progress_repo.list_for_user(user_id).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ChatStore for MongoPersistenceClient {
    async fn save_message(&self, message: ChatMessage) -> Result<()> {
        self.chat_repo.save(MongoChatMessage::from(message)).await
    }

    async fn history(&self, user_id: &str, recipe_id: Option<&str>) -> Result<Vec<ChatMessage>> {
        let messages = self.chat_repo.history(user_id, recipe_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RecipeStore for MongoPersistenceClient {
    async fn recipes_with_embeddings(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let recipes = self.recipe_repo.with_embeddings(filter).await?;
        Ok(recipes.into_iter().map(Into::into).collect())
    }
}
