use chrono::Utc;
use jollof_types::CookingMode;
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, ChatRole, Progress, Recipe};

/// Stored shape of a progress record (`userprogresses` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoProgress {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    pub recipe_id: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub current_step: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub mode: CookingMode,
    #[serde(default = "default_true")]
    pub hands_free: bool,
    #[serde(default)]
    pub timer_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    pub last_updated: bson::DateTime,
}

fn default_true() -> bool {
    true
}

/// Stored shape of a chat message (`chatmessages` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoChatMessage {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    pub from: ChatRole,
    pub content: String,
    pub created_at: bson::DateTime,
}

/// Stored shape of a recipe (`recipes` collection); only the fields the matcher reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoRecipe {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub prep_time: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f64>>,
}

fn object_id(id: &str) -> ObjectId {
    ObjectId::parse_str(id).unwrap_or_else(|_| ObjectId::new())
}

impl From<Progress> for MongoProgress {
    fn from(progress: Progress) -> Self {
        Self {
            id: object_id(&progress.id),
            user_id: progress.user_id,
            recipe_id: progress.recipe_id,
            steps: progress.steps,
            current_step: progress.current_step as i64,
            completed: progress.completed,
            mode: progress.mode,
            hands_free: progress.hands_free,
            timer_enabled: progress.timer_enabled,
            created_at: Some(bson::DateTime::from_chrono(progress.created_at)),
            last_updated: bson::DateTime::from_chrono(progress.last_updated),
        }
    }
}

impl From<MongoProgress> for Progress {
    fn from(doc: MongoProgress) -> Self {
        let last_updated = doc.last_updated.to_chrono();
        Self {
            id: doc.id.to_hex(),
            user_id: doc.user_id,
            recipe_id: doc.recipe_id,
            steps: doc.steps,
            current_step: usize::try_from(doc.current_step).unwrap_or(0),
            mode: doc.mode,
            completed: doc.completed,
            hands_free: doc.hands_free,
            timer_enabled: doc.timer_enabled,
            created_at: doc.created_at.map(|d| d.to_chrono()).unwrap_or(last_updated),
            last_updated,
        }
    }
}

impl From<ChatMessage> for MongoChatMessage {
    fn from(msg: ChatMessage) -> Self {
        Self {
            id: object_id(&msg.id),
            user_id: msg.user_id,
            recipe_id: msg.recipe_id,
            from: msg.from,
            content: msg.content,
            created_at: bson::DateTime::from_chrono(msg.created_at),
        }
    }
}

impl From<MongoChatMessage> for ChatMessage {
    fn from(msg: MongoChatMessage) -> Self {
        Self {
            id: msg.id.to_hex(),
            user_id: msg.user_id,
            recipe_id: msg.recipe_id,
            from: msg.from,
            content: msg.content,
            created_at: msg.created_at.to_chrono(),
        }
    }
}

impl From<MongoRecipe> for Recipe {
    fn from(doc: MongoRecipe) -> Self {
        Self {
            id: doc.id.to_hex(),
            title: doc.title,
            description: doc.description,
            cuisine: doc.cuisine,
            ingredients: doc.ingredients,
            prep_time: doc.prep_time.and_then(|t| u32::try_from(t).ok()),
            image: doc.image,
            embedding: doc
                .embedding
                .map(|v| v.into_iter().map(|x| x as f32).collect()),
        }
    }
}

pub(crate) fn now() -> bson::DateTime {
    bson::DateTime::from_chrono(Utc::now())
}
