use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoRecipe;
use crate::error::Result;
use crate::models::RecipeFilter;

#[derive(Clone)]
pub struct MongoRecipeRepository {
    collection: Collection<MongoRecipe>,
}

impl MongoRecipeRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("recipes");
        Self { collection }
    }

    pub async fn with_embeddings(&self, filter: &RecipeFilter) -> Result<Vec<MongoRecipe>> {
        let mut query = doc! { "embedding": { "$exists": true } };
        if let Some(cuisine) = &filter.cuisine {
            query.insert("cuisine", cuisine.as_str());
        }
        if let Some(max) = filter.max_prep_time {
            query.insert("prepTime", doc! { "$lte": max as i64 });
        }

        let recipes = self.collection.find(query).await?.try_collect().await?;
        Ok(recipes)
    }
}
