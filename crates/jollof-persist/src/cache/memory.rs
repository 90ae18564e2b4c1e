use async_trait::async_trait;
use jollof_types::{SessionKey, SessionState};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::SessionCache;
use crate::error::Result;

#[derive(Debug, Clone)]
struct CachedSession {
    state: SessionState,
    cached_at: Instant,
}

impl CachedSession {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Process-local session cache with a fixed TTL
#[derive(Clone)]
pub struct InMemorySessionCache {
    store: Arc<RwLock<HashMap<String, CachedSession>>>,
    ttl: Duration,
}

impl InMemorySessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn lookup(&self, key: &str) -> Option<SessionState> {
        let store = self.store.read().ok()?;
        let cached = store.get(key)?;

        if cached.is_expired(self.ttl) {
            drop(store);
            self.remove(key);
            return None;
        }

        Some(cached.state.clone())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut store) = self.store.write() {
            store.remove(key);
        }
    }

    /// Drop expired entries; run periodically by the server
    pub fn cleanup_expired(&self) -> usize {
        match self.store.write() {
            Ok(mut store) => {
                let before = store.len();
                store.retain(|_, v| !v.is_expired(self.ttl));
                before - store.len()
            }
            Err(_) => 0,
        }
    }

    pub fn stats(&self) -> CacheStats {
        match self.store.read() {
            Ok(store) => {
                let total = store.len();
                let expired = store.values().filter(|v| v.is_expired(self.ttl)).count();
                CacheStats {
                    total_entries: total,
                    expired_entries: expired,
                    active_entries: total - expired,
                }
            }
            Err(_) => CacheStats::default(),
        }
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn get(&self, key: &SessionKey) -> Result<Option<SessionState>> {
        Ok(self.lookup(&key.cache_key()))
    }

    async fn put(&self, state: &SessionState) -> Result<()> {
        if let Ok(mut store) = self.store.write() {
            store.insert(
                state.key().cache_key(),
                CachedSession {
                    state: state.clone(),
                    cached_at: Instant::now(),
                },
            );
        }
        Ok(())
    }

    async fn invalidate(&self, key: &SessionKey) -> Result<()> {
        self.remove(&key.cache_key());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jollof_types::CookingMode;

    fn state(recipe_id: &str, step: usize) -> SessionState {
        SessionState {
            user_id: "u1".to_string(),
            recipe_id: recipe_id.to_string(),
            mode: CookingMode::Voice,
            current_step: step,
            completed: false,
        }
    }

    #[tokio::test]
    async fn test_cache_basic() {
        let cache = InMemorySessionCache::new(Duration::from_secs(1));
        cache.put(&state("r1", 2)).await.unwrap();

        let hit = cache.get(&SessionKey::new("u1", "r1")).await.unwrap();
        assert_eq!(hit.map(|s| s.current_step), Some(2));
        assert!(cache.get(&SessionKey::new("u1", "r2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = InMemorySessionCache::new(Duration::from_millis(100));
        cache.put(&state("r1", 0)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get(&SessionKey::new("u1", "r1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_refreshes_ttl() {
        let cache = InMemorySessionCache::new(Duration::from_millis(120));
        let key = SessionKey::new("u1", "r1");

        cache.put(&state("r1", 0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.put(&state("r1", 1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get(&key).await.unwrap().map(|s| s.current_step), Some(1));
    }

    #[tokio::test]
    async fn test_cache_invalidate() {
        let cache = InMemorySessionCache::new(Duration::from_secs(10));
        let key = SessionKey::new("u1", "r1");
        cache.put(&state("r1", 0)).await.unwrap();

        cache.invalidate(&key).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_cleanup() {
        let cache = InMemorySessionCache::new(Duration::from_millis(50));
        cache.put(&state("r1", 0)).await.unwrap();
        cache.put(&state("r2", 0)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        cache.put(&state("r3", 0)).await.unwrap();

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.expired_entries, 2);

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.stats().active_entries, 1);
    }
}
