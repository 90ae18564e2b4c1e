use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jollof_api::{build_router, config::Config, state::AppState};
use jollof_llm::{OpenAIClient, OpenAIConfig};
use jollof_persist::{InMemorySessionCache, PersistClientBuilder};
use jollof_session::{Backplane, RedisBackplane, SessionServiceBuilder};

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting JollofAI server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // LLM client, shared by step generation, chat and embeddings
    let mut openai = OpenAIConfig::new(config.openai_api_key.clone())
        .with_timeout(Duration::from_millis(config.llm.timeout_ms));
    if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
        openai = openai.with_base_url(base_url);
    }
    let llm_client = Arc::new(OpenAIClient::from_config(openai)?);

    // Storage
    let session_config = config.session_config();
    let mut persist = PersistClientBuilder::new()
        .database(config.mongodb.database.clone())
        .cache_ttl(session_config.cache_ttl);
    if let Some(uri) = &config.mongodb_uri {
        tracing::info!("Connecting to MongoDB");
        persist = persist.mongodb_uri(uri.clone());
    }
    match config.redis_url() {
        Some(url) => {
            tracing::info!("Using Redis session cache");
            persist = persist.redis_url(url);
        }
        None => {
            let cache = InMemorySessionCache::new(session_config.cache_ttl);
            spawn_cache_sweeper(cache.clone());
            persist = persist.in_memory_cache(cache);
        }
    }
    let persist = persist.build().await?;

    // Cross-node room fan-out
    let redis_backplane = match config.redis_url() {
        Some(url) => Some(Arc::new(RedisBackplane::connect(url).await?)),
        None => None,
    };

    let mut builder = SessionServiceBuilder::new()
        .chat_client(llm_client.clone())
        .embedding_client(llm_client)
        .persist(persist)
        .session_config(session_config)
        .llm_config(config.llm_config());
    if let Some(backplane) = &redis_backplane {
        builder = builder.backplane(backplane.clone() as Arc<dyn Backplane>);
    }
    let service = builder.build()?;

    if let Some(backplane) = redis_backplane {
        let broadcaster = service.broadcaster.clone();
        tokio::spawn(async move {
            if let Err(e) = backplane.listen(broadcaster).await {
                tracing::error!("Backplane listener failed: {}", e);
            }
        });
    }

    let state = Arc::new(AppState::new(config.clone(), service));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Cooking socket: ws://{}/ws", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_cache_sweeper(cache: InMemorySessionCache) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = cache.cleanup_expired();
            if removed > 0 {
                tracing::debug!(removed, "swept expired sessions");
            }
        }
    });
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
