use jollof_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No active session for {0}")]
    NoActiveSession(String),

    #[error("Progress not found for {0}")]
    NotFound(String),

    #[error("Step generation failed: {0}")]
    GenerationFailed(String),

    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Concurrent update conflict for {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl SessionError {
    /// Short text safe to show to a cook; storage details stay in the logs
    pub fn user_message(&self) -> String {
        match self {
            Self::NoActiveSession(_) => "No active session. Start the recipe first.".to_string(),
            Self::NotFound(_) => "Progress not found".to_string(),
            Self::GenerationFailed(_) => "Could not generate recipe steps".to_string(),
            Self::Unavailable(_) => "The cooking assistant is unavailable, try again".to_string(),
            Self::Conflict(_) => "Session was updated elsewhere, try again".to_string(),
            Self::Invalid(msg) => msg.clone(),
            Self::Persist(_) => "Something went wrong".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
