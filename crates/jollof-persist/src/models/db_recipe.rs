use serde::{Deserialize, Serialize};

/// Recipe as seen by the matcher; written elsewhere, read-only here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
}

impl Recipe {
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }
}

/// Optional narrowing applied before similarity ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeFilter {
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub max_prep_time: Option<u32>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let cuisine_ok = match &self.cuisine {
            Some(c) => recipe.cuisine.as_deref() == Some(c.as_str()),
            None => true,
        };
        let prep_ok = match self.max_prep_time {
            Some(max) => recipe.prep_time.is_some_and(|t| t <= max),
            None => true,
        };
        cuisine_ok && prep_ok
    }
}
