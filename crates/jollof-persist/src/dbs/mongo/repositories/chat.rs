use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoChatMessage;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoChatRepository {
    collection: Collection<MongoChatMessage>,
}

impl MongoChatRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("chatmessages");
        Self { collection }
    }

    pub async fn save(&self, message: MongoChatMessage) -> Result<()> {
        self.collection.insert_one(&message).await?;
        Ok(())
    }

    /// Chronological history for a user, scoped to a recipe when one is given
    pub async fn history(
        &self,
        user_id: &str,
        recipe_id: Option<&str>,
    ) -> Result<Vec<MongoChatMessage>> {
        let mut filter = doc! { "userId": user_id };
        match recipe_id {
            Some(recipe_id) => filter.insert("recipeId", recipe_id),
            None => filter.insert("recipeId", doc! { "$exists": false }),
        };

        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": 1, "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }
}
