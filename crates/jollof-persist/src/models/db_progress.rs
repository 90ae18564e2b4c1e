use chrono::{DateTime, Utc};
use jollof_types::{CookingMode, ProgressPayload, SessionKey, SessionState};
use serde::{Deserialize, Serialize};

/// Durable record of one cook's progress through one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub id: String,
    pub user_id: String,
    pub recipe_id: String,
    pub steps: Vec<String>,
    pub current_step: usize,
    pub mode: CookingMode,
    pub completed: bool,
    pub hands_free: bool,
    pub timer_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Position within the step list, compared on conditional updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPosition {
    pub current_step: usize,
    pub completed: bool,
}

impl StepPosition {
    pub fn start() -> Self {
        Self {
            current_step: 0,
            completed: false,
        }
    }
}

impl Progress {
    pub fn new(key: SessionKey, steps: Vec<String>, mode: CookingMode) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: key.user_id,
            recipe_id: key.recipe_id,
            steps,
            current_step: 0,
            mode,
            completed: false,
            hands_free: true,
            timer_enabled: false,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.user_id.clone(), self.recipe_id.clone())
    }

    pub fn position(&self) -> StepPosition {
        StepPosition {
            current_step: self.current_step,
            completed: self.completed,
        }
    }

    pub fn session_state(&self) -> SessionState {
        SessionState {
            user_id: self.user_id.clone(),
            recipe_id: self.recipe_id.clone(),
            mode: self.mode,
            current_step: self.current_step,
            completed: self.completed,
        }
    }

    pub fn payload(&self) -> ProgressPayload {
        ProgressPayload {
            user_id: self.user_id.clone(),
            recipe_id: self.recipe_id.clone(),
            mode: self.mode,
            current_step: self.current_step,
            completed: self.completed,
            steps: Some(self.steps.clone()),
            last_updated: Some(self.last_updated),
        }
    }

    /// Text of the current step, `None` once the recipe is finished or empty
    pub fn current_instruction(&self) -> Option<&str> {
        if self.completed {
            return None;
        }
        self.steps.get(self.current_step).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jollof() -> Progress {
        Progress::new(
            SessionKey::new("u1", "r1"),
            vec!["Heat oil".to_string(), "Add rice".to_string()],
            CookingMode::Voice,
        )
    }

    #[test]
    fn test_new_progress_starts_at_first_step() {
        let progress = jollof();
        assert_eq!(progress.position(), StepPosition::start());
        assert_eq!(progress.current_instruction(), Some("Heat oil"));
        assert!(progress.hands_free);
        assert!(!progress.timer_enabled);
    }

    #[test]
    fn test_completed_progress_has_no_instruction() {
        let mut progress = jollof();
        progress.current_step = 1;
        progress.completed = true;
        assert_eq!(progress.current_instruction(), None);
    }

    #[test]
    fn test_payload_carries_steps() {
        let payload = jollof().payload();
        assert_eq!(payload.steps.map(|s| s.len()), Some(2));
        assert!(payload.last_updated.is_some());
    }
}
