#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use jollof_llm::{
    ChatClient, ChatRequest, ChatResponse, EmbeddingClient, EmbeddingRequest, EmbeddingResponse,
};
use jollof_persist::{InMemoryStore, PersistClient};
use jollof_session::{SessionService, SessionServiceBuilder, StepGenerator};
use jollof_types::SessionConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const JOLLOF_STEPS: &str = "1. Wash rice 2. Blend peppers 3. Fry base 4. Add rice and stock";

/// Chat model that answers from a script and can be told to fail
#[derive(Default)]
pub struct FakeLLM {
    pub reply: Mutex<Option<String>>,
    pub failures_left: AtomicUsize,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl FakeLLM {
    pub fn replying(text: &str) -> Arc<Self> {
        let llm = Self::default();
        *llm.reply.lock().unwrap() = Some(text.to_string());
        Arc::new(llm)
    }

    pub fn failing(times: usize) -> Arc<Self> {
        let llm = Self::default();
        llm.failures_left.store(times, Ordering::SeqCst);
        *llm.reply.lock().unwrap() = Some(JOLLOF_STEPS.to_string());
        Arc::new(llm)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for FakeLLM {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            bail!("upstream exploded");
        }
        let reply = self.reply.lock().unwrap().clone();
        Ok(ChatResponse {
            content: reply,
            usage: None,
            finish_reason: Some("stop".to_string()),
        })
    }
}

/// Embeds text as counts of a few fixed keywords
pub struct KeywordEmbedder;

pub const KEYWORDS: [&str; 3] = ["rice", "tomato", "pasta"];

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    KEYWORDS
        .iter()
        .map(|k| text.matches(k).count() as f32)
        .collect()
}

#[async_trait]
impl EmbeddingClient for KeywordEmbedder {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        Ok(EmbeddingResponse {
            embeddings: request.input.iter().map(|t| keyword_vector(t)).collect(),
            usage: None,
        })
    }
}

/// Generator that never answers in time
pub struct StuckGenerator;

#[async_trait]
impl StepGenerator for StuckGenerator {
    async fn generate(&self, _recipe_name: &str) -> Result<Vec<String>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(vec![])
    }
}

pub struct Harness {
    pub service: SessionService,
    pub store: Arc<InMemoryStore>,
    pub llm: Arc<FakeLLM>,
}

pub fn config(ttl: Duration) -> SessionConfig {
    SessionConfig::default()
        .with_cache_ttl(ttl)
        .with_max_timer(Duration::from_secs(30))
        .with_upstream_timeout(Duration::from_millis(200))
}

pub fn harness_with(llm: Arc<FakeLLM>, ttl: Duration) -> Harness {
    let (persist, store) = PersistClient::in_memory(ttl);
    let service = SessionServiceBuilder::new()
        .chat_client(llm.clone())
        .embedding_client(Arc::new(KeywordEmbedder))
        .persist(persist)
        .session_config(config(ttl))
        .build()
        .unwrap();
    Harness {
        service,
        store,
        llm,
    }
}

pub fn harness() -> Harness {
    harness_with(FakeLLM::replying(JOLLOF_STEPS), Duration::from_secs(60))
}
