use jollof_types::{CookingMode, SessionKey, SessionState};
use std::sync::Arc;

use crate::cache::SessionCache;
use crate::error::Result;
use crate::models::{Progress, StepPosition};
use crate::trait_client::ProgressStore;

/// Where a session was found
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedSession {
    /// Cache hit; carries no step list
    Cached(SessionState),
    Stored(Progress),
}

/// Durable progress with the session cache layered in front
///
/// Writes go to the store first and then refresh the cache. Cache failures
/// are logged and otherwise ignored.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn ProgressStore>,
    cache: Arc<dyn SessionCache>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn ProgressStore>, cache: Arc<dyn SessionCache>) -> Self {
        Self { store, cache }
    }

    pub async fn cached_session(&self, key: &SessionKey) -> Option<SessionState> {
        match self.cache.get(key).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(key = %key.cache_key(), error = %e, "session cache read failed");
                None
            }
        }
    }

    async fn remember(&self, progress: &Progress) {
        self.refresh(&progress.session_state()).await;
    }

    /// Rewrite a cached entry, restarting its TTL
    pub async fn refresh(&self, state: &SessionState) {
        if let Err(e) = self.cache.put(state).await {
            tracing::warn!(key = %state.key().cache_key(), error = %e, "session cache write failed");
        }
    }

    /// Drop a cache entry whose durable record is gone
    pub async fn forget(&self, key: &SessionKey) {
        if let Err(e) = self.cache.invalidate(key).await {
            tracing::warn!(key = %key.cache_key(), error = %e, "session cache invalidate failed");
        }
    }

    pub async fn find_progress(&self, key: &SessionKey) -> Result<Option<Progress>> {
        self.store.find_progress(key).await
    }

    /// Cache first, then the store; a store hit repopulates the cache
    pub async fn load_session(&self, key: &SessionKey) -> Result<Option<LoadedSession>> {
        if let Some(state) = self.cached_session(key).await {
            tracing::debug!(key = %key.cache_key(), "session cache hit");
            return Ok(Some(LoadedSession::Cached(state)));
        }

        match self.store.find_progress(key).await? {
            Some(progress) => {
                self.remember(&progress).await;
                Ok(Some(LoadedSession::Stored(progress)))
            }
            None => Ok(None),
        }
    }

    /// Insert-if-absent; returns whichever record ended up stored
    pub async fn create(&self, progress: Progress) -> Result<Progress> {
        let stored = self.store.insert_progress(progress).await?;
        self.remember(&stored).await;
        Ok(stored)
    }

    /// Overwrite steps and position for the key
    pub async fn replace(&self, progress: Progress) -> Result<Progress> {
        let stored = self.store.upsert_progress(progress).await?;
        self.remember(&stored).await;
        Ok(stored)
    }

    pub async fn set_mode(&self, key: &SessionKey, mode: CookingMode) -> Result<Option<Progress>> {
        let updated = self.store.update_mode(key, mode).await?;
        if let Some(progress) = &updated {
            self.remember(progress).await;
        }
        Ok(updated)
    }

    /// Conditional position update; `None` when the record moved on or vanished
    pub async fn set_position(
        &self,
        key: &SessionKey,
        expected: StepPosition,
        next: StepPosition,
    ) -> Result<Option<Progress>> {
        let updated = self.store.update_position(key, expected, next).await?;
        if let Some(progress) = &updated {
            self.remember(progress).await;
        }
        Ok(updated)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Progress>> {
        self.store.list_progress(user_id).await
    }
}
