use jollof_persist::{LoadedSession, PersistClient, Progress, SessionRepository};
use jollof_types::{
    CookingMode, ProgressPayload, ServerEvent, SessionConfig, SessionKey, COMPLETION_MESSAGE,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::command::Direction;
use crate::error::{Result, SessionError};
use crate::generator::StepGenerator;
use crate::upstream::{call_with_retry, UpstreamFailure};

/// What the cook should do now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub step: String,
    pub step_index: usize,
    pub completed: bool,
}

impl Instruction {
    pub fn from_progress(progress: &Progress) -> Self {
        let step = progress
            .current_instruction()
            .unwrap_or(COMPLETION_MESSAGE)
            .to_string();
        Self {
            step,
            step_index: progress.current_step,
            completed: progress.completed,
        }
    }

    pub fn into_event(self) -> ServerEvent {
        ServerEvent::Instruction {
            step: self.step,
            step_index: self.step_index,
            completed: self.completed,
        }
    }
}

/// Start/resume, step navigation and mode changes for cooking sessions
///
/// The progress store is authoritative. The session cache is consulted first
/// on `start` and refreshed after every write.
pub struct SessionCoordinator {
    persist: PersistClient,
    generator: Arc<dyn StepGenerator>,
    config: SessionConfig,
}

impl SessionCoordinator {
    pub fn new(
        persist: PersistClient,
        generator: Arc<dyn StepGenerator>,
        config: SessionConfig,
    ) -> Self {
        Self {
            persist,
            generator,
            config,
        }
    }

    fn sessions(&self) -> &SessionRepository {
        self.persist.sessions()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin or resume a session
    ///
    /// `mode` only applies when a new record is created.
    pub async fn start(
        &self,
        key: &SessionKey,
        recipe_name: Option<&str>,
        mode: Option<CookingMode>,
    ) -> Result<ProgressPayload> {
        match self.sessions().load_session(key).await? {
            Some(LoadedSession::Cached(state)) => {
                self.sessions().refresh(&state).await;
                tracing::debug!(user_id = %key.user_id, recipe_id = %key.recipe_id, "resumed from cache");
                Ok(ProgressPayload::from_state(&state))
            }
            Some(LoadedSession::Stored(progress)) => {
                tracing::debug!(user_id = %key.user_id, recipe_id = %key.recipe_id, "resumed from store");
                Ok(progress.payload())
            }
            None => {
                let steps = match recipe_name.map(str::trim).filter(|n| !n.is_empty()) {
                    Some(name) => self.generate_steps(name).await?,
                    None => Vec::new(),
                };
                let created = self
                    .sessions()
                    .create(Progress::new(key.clone(), steps, mode.unwrap_or_default()))
                    .await?;
                tracing::info!(
                    user_id = %key.user_id,
                    recipe_id = %key.recipe_id,
                    steps = created.steps.len(),
                    "created cooking session"
                );
                Ok(created.payload())
            }
        }
    }

    /// Move through the steps; never creates a record
    pub async fn advance(&self, key: &SessionKey, direction: Direction) -> Result<Instruction> {
        let mut progress = self.load_active(key).await?;

        for attempt in 1..=self.config.max_update_attempts {
            let expected = progress.position();
            let next = direction.apply(expected, progress.steps.len());

            if next == expected {
                self.sessions().refresh(&progress.session_state()).await;
                return Ok(Instruction::from_progress(&progress));
            }

            match self.sessions().set_position(key, expected, next).await? {
                Some(updated) => {
                    tracing::debug!(
                        user_id = %key.user_id,
                        recipe_id = %key.recipe_id,
                        ?direction,
                        step = updated.current_step,
                        completed = updated.completed,
                        "advanced session"
                    );
                    return Ok(Instruction::from_progress(&updated));
                }
                None => {
                    tracing::debug!(attempt, recipe_id = %key.recipe_id, "step position changed concurrently");
                    progress = self.load_active(key).await?;
                }
            }
        }

        tracing::warn!(user_id = %key.user_id, recipe_id = %key.recipe_id, "gave up advancing after conflicts");
        Err(SessionError::Conflict(key.cache_key()))
    }

    async fn load_active(&self, key: &SessionKey) -> Result<Progress> {
        match self.sessions().find_progress(key).await? {
            Some(progress) => Ok(progress),
            None => {
                self.sessions().forget(key).await;
                Err(SessionError::NoActiveSession(key.cache_key()))
            }
        }
    }

    pub async fn toggle_mode(&self, key: &SessionKey, mode: CookingMode) -> Result<ProgressPayload> {
        self.sessions()
            .set_mode(key, mode)
            .await?
            .map(|progress| progress.payload())
            .ok_or_else(|| SessionError::NotFound(key.cache_key()))
    }

    /// Replace the step list and restart from the first step, keeping the mode
    pub async fn regenerate(&self, key: &SessionKey, recipe_name: &str) -> Result<ProgressPayload> {
        let recipe_name = recipe_name.trim();
        if recipe_name.is_empty() {
            return Err(SessionError::Invalid("recipeName is required".to_string()));
        }

        let steps = self.generate_steps(recipe_name).await?;
        let existing = self.sessions().find_progress(key).await?;

        let mut progress = Progress::new(key.clone(), steps, CookingMode::default());
        if let Some(existing) = existing {
            progress.mode = existing.mode;
            progress.hands_free = existing.hands_free;
            progress.timer_enabled = existing.timer_enabled;
        }

        let stored = self.sessions().replace(progress).await?;
        tracing::info!(recipe_id = %key.recipe_id, steps = stored.steps.len(), "regenerated steps");
        Ok(stored.payload())
    }

    pub async fn progress(&self, key: &SessionKey) -> Result<Progress> {
        self.sessions()
            .find_progress(key)
            .await?
            .ok_or_else(|| SessionError::NotFound(key.cache_key()))
    }

    pub async fn list_progress(&self, user_id: &str) -> Result<Vec<Progress>> {
        Ok(self.sessions().list(user_id).await?)
    }

    async fn generate_steps(&self, recipe_name: &str) -> Result<Vec<String>> {
        call_with_retry("generate_steps", self.config.upstream_timeout, || {
            self.generator.generate(recipe_name)
        })
        .await
        .map_err(|failure| match failure {
            UpstreamFailure::TimedOut => {
                SessionError::Unavailable(format!("step generation for {} timed out", recipe_name))
            }
            UpstreamFailure::Failed(msg) => SessionError::GenerationFailed(msg),
        })
    }
}
