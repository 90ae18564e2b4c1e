use axum::{extract::State, Json};
use jollof_persist::{Recipe, RecipeFilter};
use jollof_session::Scored;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

const SIMILAR_LIMIT: usize = 20;
const MATCH_LIMIT: usize = 3;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersRequest {
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub max_prep_time: Option<u32>,
}

impl From<FiltersRequest> for RecipeFilter {
    fn from(f: FiltersRequest) -> Self {
        Self {
            cuisine: f.cuisine.filter(|c| !c.trim().is_empty()),
            max_prep_time: f.max_prep_time,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimilarRequest {
    pub text: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub filters: Option<FiltersRequest>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub filters: Option<FiltersRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMatch {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub score: f64,
}

impl From<Scored<Recipe>> for RecipeMatch {
    fn from(scored: Scored<Recipe>) -> Self {
        let recipe = scored.item;
        Self {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            cuisine: recipe.cuisine,
            ingredients: recipe.ingredients,
            prep_time: recipe.prep_time,
            image: recipe.image,
            score: scored.score,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeMatch>,
}

fn limit(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_LIMIT)
}

/// Recipes whose embedding is closest to free text
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimilarRequest>,
) -> ApiResult<Json<RecipesResponse>> {
    let filter = RecipeFilter::from(req.filters.unwrap_or_default());
    let ranked = state
        .service
        .matcher
        .similar(&req.text, &filter, limit(req.limit, SIMILAR_LIMIT))
        .await?;
    Ok(Json(RecipesResponse {
        recipes: ranked.into_iter().map(RecipeMatch::from).collect(),
    }))
}

/// Recipes that best use the ingredients on hand
pub async fn match_ingredients(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MatchRequest>,
) -> ApiResult<Json<RecipesResponse>> {
    let filter = RecipeFilter::from(req.filters.unwrap_or_default());
    let ranked = state
        .service
        .matcher
        .match_ingredients(&req.ingredients, &filter, limit(req.limit, MATCH_LIMIT))
        .await?;
    Ok(Json(RecipesResponse {
        recipes: ranked.into_iter().map(RecipeMatch::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_bounds() {
        assert_eq!(limit(None, SIMILAR_LIMIT), 20);
        assert_eq!(limit(Some(0), MATCH_LIMIT), 1);
        assert_eq!(limit(Some(5000), MATCH_LIMIT), MAX_LIMIT);
    }

    #[test]
    fn test_blank_cuisine_is_no_filter() {
        let filter = RecipeFilter::from(FiltersRequest {
            cuisine: Some("  ".to_string()),
            max_prep_time: Some(30),
        });
        assert_eq!(filter.cuisine, None);
        assert_eq!(filter.max_prep_time, Some(30));
    }
}
