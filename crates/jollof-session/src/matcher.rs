use jollof_llm::{EmbeddingClient, EmbeddingRequest};
use jollof_persist::{Recipe, RecipeFilter, RecipeStore};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SessionError};
use crate::similarity::{rank_top_k, Scored};
use crate::upstream::call_with_retry;

/// Ranks stored recipes against free text or a list of ingredients
pub struct RecipeMatcher {
    embeddings: Arc<dyn EmbeddingClient>,
    recipes: Arc<dyn RecipeStore>,
    model: String,
    timeout: Duration,
}

impl RecipeMatcher {
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        recipes: Arc<dyn RecipeStore>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            embeddings,
            recipes,
            model: model.into(),
            timeout,
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest::new(self.model.clone(), text);
        let response = call_with_retry("embed", self.timeout, || {
            self.embeddings.embed(request.clone())
        })
        .await
        .map_err(|failure| SessionError::Unavailable(format!("embedding {}", failure)))?;

        response
            .first()
            .map(<[f32]>::to_vec)
            .ok_or_else(|| SessionError::Unavailable("embedding response was empty".to_string()))
    }

    pub async fn similar(
        &self,
        text: &str,
        filter: &RecipeFilter,
        limit: usize,
    ) -> Result<Vec<Scored<Recipe>>> {
        if text.trim().is_empty() {
            return Err(SessionError::Invalid("text is required".to_string()));
        }

        let query = self.embed(text).await?;
        let candidates = self.recipes.recipes_with_embeddings(filter).await?;
        tracing::debug!(candidates = candidates.len(), limit, "ranking recipes");
        Ok(rank_top_k(&query, candidates, Recipe::embedding, limit))
    }

    /// Recipes that best match what the cook has on hand
    pub async fn match_ingredients(
        &self,
        ingredients: &[String],
        filter: &RecipeFilter,
        limit: usize,
    ) -> Result<Vec<Scored<Recipe>>> {
        let ingredients: Vec<&str> = ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect();
        if ingredients.is_empty() {
            return Err(SessionError::Invalid("ingredients are required".to_string()));
        }

        self.similar(&ingredients.join(", "), filter, limit).await
    }
}
