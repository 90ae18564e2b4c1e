use std::sync::Arc;
use std::time::Duration;

use crate::cache::{InMemorySessionCache, SessionCache};
use crate::dbs::InMemoryStore;
use crate::error::{PersistError, Result};
use crate::PersistClient;

/// Picks storage backends from configuration
///
/// Without a MongoDB URI everything stays in memory; without a Redis URL the
/// session cache is process-local.
pub struct PersistClientBuilder {
    mongodb_uri: Option<String>,
    database: Option<String>,
    redis_url: Option<String>,
    cache_ttl: Duration,
    in_memory_cache: Option<InMemorySessionCache>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            mongodb_uri: None,
            database: None,
            redis_url: None,
            cache_ttl: Duration::from_secs(60 * 60 * 4),
            in_memory_cache: None,
        }
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Share an existing process-local cache (the server sweeps it periodically)
    pub fn in_memory_cache(mut self, cache: InMemorySessionCache) -> Self {
        self.in_memory_cache = Some(cache);
        self
    }

    async fn build_cache(&mut self) -> Result<Arc<dyn SessionCache>> {
        #[cfg(feature = "redis")]
        {
            if let Some(url) = self.redis_url.take() {
                let cache = crate::cache::RedisSessionCache::connect(&url, self.cache_ttl).await?;
                return Ok(Arc::new(cache));
            }
        }

        #[cfg(not(feature = "redis"))]
        {
            if self.redis_url.is_some() {
                return Err(PersistError::Internal(
                    "redis_url set but the redis feature is disabled".to_string(),
                ));
            }
        }

        let cache = self
            .in_memory_cache
            .take()
            .unwrap_or_else(|| InMemorySessionCache::new(self.cache_ttl));
        Ok(Arc::new(cache))
    }

    pub async fn build(mut self) -> Result<PersistClient> {
        let cache = self.build_cache().await?;

        match self.mongodb_uri.take() {
            #[cfg(feature = "mongodb")]
            Some(uri) => {
                let database = self
                    .database
                    .take()
                    .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;
                let mongo = Arc::new(
                    crate::dbs::MongoPersistenceClient::connect(&uri, &database).await?,
                );
                Ok(PersistClient::new(mongo.clone(), cache, mongo.clone(), mongo))
            }
            #[cfg(not(feature = "mongodb"))]
            Some(_) => Err(PersistError::Internal(
                "mongodb_uri set but the mongodb feature is disabled".to_string(),
            )),
            None => {
                tracing::warn!("no MongoDB URI configured, progress is kept in memory");
                let store = Arc::new(InMemoryStore::new());
                Ok(PersistClient::new(store.clone(), cache, store.clone(), store))
            }
        }
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
