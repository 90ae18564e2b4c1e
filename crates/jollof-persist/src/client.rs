use std::sync::Arc;
use std::time::Duration;

use crate::cache::{InMemorySessionCache, SessionCache};
use crate::dbs::InMemoryStore;
use crate::repository::SessionRepository;
use crate::trait_client::{ChatStore, ProgressStore, RecipeStore};

/// Handles to every persistence concern the session core needs
#[derive(Clone)]
pub struct PersistClient {
    sessions: SessionRepository,
    chats: Arc<dyn ChatStore>,
    recipes: Arc<dyn RecipeStore>,
}

impl PersistClient {
    pub fn new(
        progress: Arc<dyn ProgressStore>,
        cache: Arc<dyn SessionCache>,
        chats: Arc<dyn ChatStore>,
        recipes: Arc<dyn RecipeStore>,
    ) -> Self {
        Self {
            sessions: SessionRepository::new(progress, cache),
            chats,
            recipes,
        }
    }

    /// Everything in process memory; for tests and local runs without databases
    pub fn in_memory(cache_ttl: Duration) -> (Self, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(InMemorySessionCache::new(cache_ttl));
        let client = Self::new(store.clone(), cache, store.clone(), store.clone());
        (client, store)
    }

    pub fn sessions(&self) -> &SessionRepository {
        &self.sessions
    }

    pub fn chats(&self) -> &Arc<dyn ChatStore> {
        &self.chats
    }

    pub fn recipes(&self) -> &Arc<dyn RecipeStore> {
        &self.recipes
    }
}
