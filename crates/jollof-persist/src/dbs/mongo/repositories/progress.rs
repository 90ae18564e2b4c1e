use futures::TryStreamExt;
use jollof_types::{CookingMode, SessionKey};
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};

use crate::dbs::mongo::models::{now, MongoProgress};
use crate::error::{PersistError, Result};
use crate::models::StepPosition;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoProgressRepository {
    collection: Collection<MongoProgress>,
}

fn key_filter(key: &SessionKey) -> Document {
    doc! { "userId": &key.user_id, "recipeId": &key.recipe_id }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

impl MongoProgressRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("userprogresses");
        Self { collection }
    }

    /// One record per (user, recipe)
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "userId": 1, "recipeId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    pub async fn find(&self, key: &SessionKey) -> Result<Option<MongoProgress>> {
        Ok(self.collection.find_one(key_filter(key)).await?)
    }

    /// Insert unless the key is taken; the stored document wins either way
    pub async fn insert_if_absent(&self, progress: MongoProgress) -> Result<MongoProgress> {
        let key = SessionKey::new(progress.user_id.clone(), progress.recipe_id.clone());
        let fields = mongodb::bson::to_document(&progress)?;
        let result = self
            .collection
            .update_one(key_filter(&key), doc! { "$setOnInsert": fields })
            .upsert(true)
            .await;

        match result {
            Ok(_) => {}
            // lost the race against a concurrent insert for the same key
            Err(e) if is_duplicate_key(&e) => {}
            Err(e) => return Err(e.into()),
        }

        self.find(&key)
            .await?
            .ok_or_else(|| PersistError::ProgressNotFound(key.cache_key()))
    }

    /// Replace steps and position, keeping the record's identity
    pub async fn upsert(&self, progress: MongoProgress) -> Result<MongoProgress> {
        let key = SessionKey::new(progress.user_id.clone(), progress.recipe_id.clone());
        let update = doc! {
            "$set": {
                "steps": progress.steps.clone(),
                "currentStep": progress.current_step,
                "completed": progress.completed,
                "mode": progress.mode.as_str(),
                "handsFree": progress.hands_free,
                "timerEnabled": progress.timer_enabled,
                "lastUpdated": now(),
            },
            "$setOnInsert": {
                "_id": progress.id,
                "createdAt": progress.created_at.unwrap_or_else(now),
            },
        };

        self.collection
            .find_one_and_update(key_filter(&key), update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::ProgressNotFound(key.cache_key()))
    }

    pub async fn update_mode(
        &self,
        key: &SessionKey,
        mode: CookingMode,
    ) -> Result<Option<MongoProgress>> {
        let update = doc! { "$set": { "mode": mode.as_str(), "lastUpdated": now() } };
        Ok(self
            .collection
            .find_one_and_update(key_filter(key), update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Compare-and-set on (currentStep, completed)
    pub async fn update_position(
        &self,
        key: &SessionKey,
        expected: StepPosition,
        next: StepPosition,
    ) -> Result<Option<MongoProgress>> {
        let mut filter = key_filter(key);
        filter.insert("currentStep", expected.current_step as i64);
        filter.insert("completed", expected.completed);

        let update = doc! {
            "$set": {
                "currentStep": next.current_step as i64,
                "completed": next.completed,
                "lastUpdated": now(),
            }
        };

        Ok(self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<MongoProgress>> {
        let records = self
            .collection
            .find(doc! { "userId": user_id })
            .sort(doc! { "lastUpdated": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(records)
    }
}
