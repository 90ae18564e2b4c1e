use async_trait::async_trait;
use jollof_types::{CookingMode, SessionKey, SessionState};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use std::time::Duration;

use super::SessionCache;
use crate::error::{PersistError, Result};

/// Session cache backed by a Redis hash per session
///
/// Fields: `userId`, `recipeId`, `mode`, `currentStep`, `completed`.
#[derive(Clone)]
pub struct RedisSessionCache {
    conn: ConnectionManager,
    ttl: Duration,
}

impl RedisSessionCache {
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| PersistError::Connection(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        tracing::info!("connected to Redis session cache");
        Ok(Self { conn, ttl })
    }
}

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| PersistError::CorruptCacheEntry(format!("missing field {}", name)))
}

fn decode(fields: &HashMap<String, String>) -> Result<SessionState> {
    let mode: CookingMode = field(fields, "mode")?
        .parse()
        .map_err(PersistError::CorruptCacheEntry)?;
    let current_step = field(fields, "currentStep")?
        .parse::<usize>()
        .map_err(|e| PersistError::CorruptCacheEntry(format!("currentStep: {}", e)))?;
    // older entries were written without the flag
    let completed = fields.get("completed").is_some_and(|v| v == "true");

    Ok(SessionState {
        user_id: field(fields, "userId")?.to_string(),
        recipe_id: field(fields, "recipeId")?.to_string(),
        mode,
        current_step,
        completed,
    })
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &SessionKey) -> Result<Option<SessionState>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key.cache_key()).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        decode(&fields).map(Some)
    }

    async fn put(&self, state: &SessionState) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = state.key().cache_key();
        let fields = [
            ("userId", state.user_id.clone()),
            ("recipeId", state.recipe_id.clone()),
            ("mode", state.mode.to_string()),
            ("currentStep", state.current_step.to_string()),
            ("completed", state.completed.to_string()),
        ];

        redis::pipe()
            .atomic()
            .hset_multiple(&key, &fields)
            .ignore()
            .expire(&key, self.ttl.as_secs() as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn invalidate(&self, key: &SessionKey) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key.cache_key()).await?;
        Ok(())
    }
}
