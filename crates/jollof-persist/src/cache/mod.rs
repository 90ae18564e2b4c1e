mod memory;
#[cfg(feature = "redis")]
mod redis;

use async_trait::async_trait;
use jollof_types::{SessionKey, SessionState};

use crate::error::Result;

pub use memory::{CacheStats, InMemorySessionCache};
#[cfg(feature = "redis")]
pub use self::redis::RedisSessionCache;

/// Short-lived projection of session state keyed by `session:<user>:<recipe>`
///
/// Advisory only: the progress store stays authoritative, and every write
/// refreshes the entry's TTL.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &SessionKey) -> Result<Option<SessionState>>;

    async fn put(&self, state: &SessionState) -> Result<()>;

    async fn invalidate(&self, key: &SessionKey) -> Result<()>;
}
