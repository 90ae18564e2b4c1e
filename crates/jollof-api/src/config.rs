use config::{Config as ConfigLoader, ConfigError, Environment, File};
use jollof_types::{LLMConfig, SessionConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoDbConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub session: SessionSettings,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub embedding_model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    pub timeout_ms: u64,
}

impl From<&LlmConfig> for LLMConfig {
    fn from(config: &LlmConfig) -> Self {
        let llm = LLMConfig::new(config.model.clone()).with_embedding_model(config.embedding_model.clone());
        match config.temperature {
            Some(temp) => llm.with_temperature(temp),
            None => llm,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub ttl_secs: u64,
    pub max_timer_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            ttl_secs: defaults.cache_ttl.as_secs(),
            max_timer_secs: defaults.max_timer.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, MONGODB_, REDIS_, LLM_, SESSION_, LOG_)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for prefix in ["SERVER", "MONGODB", "REDIS", "LLM", "SESSION"] {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .keep_prefix(true)
                    .separator("_")
                    .try_parsing(true),
            );
        }

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            cfg.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            cfg.logging.format = format;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            cfg.redis.url = Some(url);
        }

        // Load secrets from ENV (not in TOML)
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok().filter(|uri| !uri.is_empty());
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string()))?;
        cfg.jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::Message("JWT_SECRET environment variable is required".to_string()))?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        builder.build()?.try_deserialize()
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_cache_ttl(Duration::from_secs(self.session.ttl_secs))
            .with_max_timer(Duration::from_secs(self.session.max_timer_secs))
            .with_upstream_timeout(Duration::from_millis(self.llm.timeout_ms))
    }

    pub fn llm_config(&self) -> LLMConfig {
        LLMConfig::from(&self.llm)
    }

    /// Redis URL when the cache/backplane is switched on
    pub fn redis_url(&self) -> Option<&str> {
        if self.redis.enabled {
            self.redis.url.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 4000

        [cors]
        enabled = true
        origins = ["http://localhost:5173"]

        [mongodb]
        database = "jollof_test"

        [redis]
        enabled = false
        url = "redis://127.0.0.1:6379"

        [llm]
        model = "gpt-4o-mini"
        embedding_model = "text-embedding-3-small"
        timeout_ms = 15000

        [session]
        ttl_secs = 600
        max_timer_secs = 1800

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.request_timeout_secs, 60);
        assert_eq!(config.mongodb.database, "jollof_test");
        assert!(config.mongodb_uri.is_none());
    }

    #[test]
    fn test_session_config_mapping() {
        let config: Config = toml::from_str(TOML).unwrap();
        let session = config.session_config();
        assert_eq!(session.cache_ttl, Duration::from_secs(600));
        assert_eq!(session.max_timer, Duration::from_secs(1800));
        assert_eq!(session.upstream_timeout, Duration::from_millis(15000));
        assert_eq!(config.llm_config().embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_redis_url_requires_enabled() {
        let mut config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.redis_url(), None);
        config.redis.enabled = true;
        assert_eq!(config.redis_url(), Some("redis://127.0.0.1:6379"));
    }

    #[test]
    fn test_session_section_is_optional() {
        let trimmed = TOML.replace("[session]\n        ttl_secs = 600\n        max_timer_secs = 1800\n", "");
        let config: Config = toml::from_str(&trimmed).unwrap();
        assert_eq!(config.session.ttl_secs, 4 * 60 * 60);
    }
}
