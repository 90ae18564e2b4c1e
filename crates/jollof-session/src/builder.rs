use anyhow::{anyhow, Result};
use jollof_llm::{ChatClient, EmbeddingClient};
use jollof_persist::PersistClient;
use jollof_types::{LLMConfig, SessionConfig};
use std::sync::Arc;

use crate::assistant::CookingAssistant;
use crate::backplane::{Backplane, NoopBackplane};
use crate::broadcaster::Broadcaster;
use crate::coordinator::SessionCoordinator;
use crate::generator::{LLMStepGenerator, StepGenerator};
use crate::handler::EventHandler;
use crate::matcher::RecipeMatcher;

/// Everything the API layer drives
#[derive(Clone)]
pub struct SessionService {
    pub coordinator: Arc<SessionCoordinator>,
    pub assistant: Arc<CookingAssistant>,
    pub matcher: Arc<RecipeMatcher>,
    pub broadcaster: Arc<Broadcaster>,
    pub handler: EventHandler,
}

/// Builder wiring clients, storage and configuration into a [`SessionService`]
pub struct SessionServiceBuilder {
    chat_client: Option<Arc<dyn ChatClient>>,
    embedding_client: Option<Arc<dyn EmbeddingClient>>,
    step_generator: Option<Arc<dyn StepGenerator>>,
    persist: Option<PersistClient>,
    backplane: Option<Arc<dyn Backplane>>,
    session_config: SessionConfig,
    llm_config: LLMConfig,
}

impl SessionServiceBuilder {
    pub fn new() -> Self {
        Self {
            chat_client: None,
            embedding_client: None,
            step_generator: None,
            persist: None,
            backplane: None,
            session_config: SessionConfig::default(),
            llm_config: LLMConfig::default(),
        }
    }

    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    pub fn embedding_client(mut self, client: Arc<dyn EmbeddingClient>) -> Self {
        self.embedding_client = Some(client);
        self
    }

    /// Override the chat-backed step generator
    pub fn step_generator(mut self, generator: Arc<dyn StepGenerator>) -> Self {
        self.step_generator = Some(generator);
        self
    }

    pub fn persist(mut self, persist: PersistClient) -> Self {
        self.persist = Some(persist);
        self
    }

    pub fn backplane(mut self, backplane: Arc<dyn Backplane>) -> Self {
        self.backplane = Some(backplane);
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn llm_config(mut self, config: LLMConfig) -> Self {
        self.llm_config = config;
        self
    }

    pub fn build(self) -> Result<SessionService> {
        let chat_client = self
            .chat_client
            .ok_or_else(|| anyhow!("chat client is required"))?;
        let embedding_client = self
            .embedding_client
            .ok_or_else(|| anyhow!("embedding client is required"))?;
        let persist = self
            .persist
            .ok_or_else(|| anyhow!("persist client is required"))?;

        let generator = self.step_generator.unwrap_or_else(|| {
            Arc::new(LLMStepGenerator::new(
                chat_client.clone(),
                self.llm_config.clone(),
            ))
        });
        let timeout = self.session_config.upstream_timeout;

        let assistant = Arc::new(CookingAssistant::new(
            chat_client,
            persist.chats().clone(),
            self.llm_config.clone(),
            timeout,
        ));
        let matcher = Arc::new(RecipeMatcher::new(
            embedding_client,
            persist.recipes().clone(),
            self.llm_config.embedding_model.clone(),
            timeout,
        ));
        let broadcaster = Arc::new(Broadcaster::with_backplane(
            self.session_config.max_timer,
            self.backplane.unwrap_or_else(|| Arc::new(NoopBackplane)),
        ));
        let coordinator = Arc::new(SessionCoordinator::new(
            persist,
            generator,
            self.session_config,
        ));
        let handler = EventHandler::new(coordinator.clone(), assistant.clone(), broadcaster.clone());

        Ok(SessionService {
            coordinator,
            assistant,
            matcher,
            broadcaster,
            handler,
        })
    }
}

impl Default for SessionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
