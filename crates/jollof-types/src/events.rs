use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{CookingMode, SessionState};

/// Events a connected client may send, framed as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Begin or resume a personal cooking session
    Start(StartPayload),

    /// Free-text command; "next"/"previous" move through the steps
    VoiceCommand(VoiceCommandPayload),

    /// Question for the cooking assistant
    ChatMessage(ChatMessagePayload),

    /// Join the shared room of a recipe (payload is the recipe id)
    JoinCookAlong(String),

    LeaveCookAlong(String),

    CookAlongMessage(CookAlongMessagePayload),

    /// Start a countdown visible to everyone in the cook-along room
    CookAlongTimer(CookAlongTimerPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPayload {
    pub recipe_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<CookingMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCommandPayload {
    pub recipe_id: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub recipe_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookAlongMessagePayload {
    pub recipe_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookAlongTimerPayload {
    pub recipe_id: String,
    pub seconds: u64,
    #[serde(default)]
    pub step: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EventValidationError(pub String);

impl ClientEvent {
    /// Parse a text frame into an event
    pub fn from_json(text: &str) -> Result<Self, EventValidationError> {
        let event: Self = serde_json::from_str(text)
            .map_err(|e| EventValidationError(format!("Malformed event: {}", e)))?;
        event.validate()?;
        Ok(event)
    }

    /// Boundary checks that serde alone can't express
    pub fn validate(&self) -> Result<(), EventValidationError> {
        let recipe_id = self.recipe_id();
        if recipe_id.trim().is_empty() {
            return Err(EventValidationError("recipeId is required".to_string()));
        }

        match self {
            Self::VoiceCommand(p) if p.command.trim().is_empty() => {
                Err(EventValidationError("command is required".to_string()))
            }
            Self::ChatMessage(ChatMessagePayload { message, .. })
            | Self::CookAlongMessage(CookAlongMessagePayload { message, .. })
                if message.trim().is_empty() =>
            {
                Err(EventValidationError("message is required".to_string()))
            }
            Self::CookAlongTimer(p) if p.seconds == 0 => {
                Err(EventValidationError("seconds must be positive".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn recipe_id(&self) -> &str {
        match self {
            Self::Start(p) => &p.recipe_id,
            Self::VoiceCommand(p) => &p.recipe_id,
            Self::ChatMessage(p) => &p.recipe_id,
            Self::JoinCookAlong(recipe_id) | Self::LeaveCookAlong(recipe_id) => recipe_id,
            Self::CookAlongMessage(p) => &p.recipe_id,
            Self::CookAlongTimer(p) => &p.recipe_id,
        }
    }

    /// Event name as it appears on the wire, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::VoiceCommand(_) => "voiceCommand",
            Self::ChatMessage(_) => "chatMessage",
            Self::JoinCookAlong(_) => "joinCookAlong",
            Self::LeaveCookAlong(_) => "leaveCookAlong",
            Self::CookAlongMessage(_) => "cookAlongMessage",
            Self::CookAlongTimer(_) => "cookAlongTimer",
        }
    }
}

/// Events pushed from the server to connected clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Current session state, sent after `start`
    Progress(ProgressPayload),

    /// Step text after a command, or the completion message
    Instruction {
        step: String,
        step_index: usize,
        completed: bool,
    },

    ChatReply {
        message: String,
    },

    CookAlongChat {
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        message: String,
    },

    TimerStart {
        seconds: u64,
        step: String,
    },

    TimerComplete {
        step: String,
    },

    Error {
        message: String,
    },

    /// Join/leave notices
    System {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Progress-shaped view of a session
///
/// `steps` is absent when the state came from the session cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    pub user_id: String,
    pub recipe_id: String,
    pub mode: CookingMode,
    pub current_step: usize,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProgressPayload {
    /// Projection of a cached session; carries no step list
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            user_id: state.user_id.clone(),
            recipe_id: state.recipe_id.clone(),
            mode: state.mode,
            current_step: state.current_step,
            completed: state.completed,
            steps: None,
            last_updated: None,
        }
    }
}
