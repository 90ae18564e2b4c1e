pub mod models;
pub mod trait_client;
pub mod dbs;
pub mod cache;
pub mod repository;
pub mod client;
pub mod builder;
pub mod error;

pub use models::{ChatMessage, ChatRole, Progress, Recipe, RecipeFilter, StepPosition};
pub use trait_client::{ChatStore, ProgressStore, RecipeStore};
pub use dbs::InMemoryStore;
#[cfg(feature = "mongodb")]
pub use dbs::MongoPersistenceClient;
pub use cache::{InMemorySessionCache, SessionCache};
#[cfg(feature = "redis")]
pub use cache::RedisSessionCache;
pub use repository::{LoadedSession, SessionRepository};
pub use client::PersistClient;
pub use builder::PersistClientBuilder;
pub use error::{PersistError, Result};
