pub mod config;
pub mod events;
pub mod session;

pub use config::{LLMConfig, SessionConfig};
pub use events::{
    ClientEvent, CookAlongMessagePayload, CookAlongTimerPayload, ChatMessagePayload,
    EventValidationError, ProgressPayload, ServerEvent, StartPayload, VoiceCommandPayload,
};
pub use session::{CookingMode, RoomKey, SessionKey, SessionState, COMPLETION_MESSAGE};
