use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the cooking-session core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session cache time-to-live, refreshed on every write
    pub cache_ttl: Duration,
    /// Upper bound for cook-along countdowns
    pub max_timer: Duration,
    /// Deadline for a single upstream AI call
    pub upstream_timeout: Duration,
    /// Conditional step updates retried this many times on conflict
    pub max_update_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60 * 60 * 4),
            max_timer: Duration::from_secs(60 * 60 * 3),
            upstream_timeout: Duration::from_secs(20),
            max_update_attempts: 3,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_max_timer(mut self, max: Duration) -> Self {
        self.max_timer = max;
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    pub fn with_max_update_attempts(mut self, attempts: usize) -> Self {
        self.max_update_attempts = attempts.max(1);
        self
    }
}

/// Models used for generation and embeddings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub embedding_model: String,
    pub temperature: Option<f32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            temperature: None,
        }
    }
}
