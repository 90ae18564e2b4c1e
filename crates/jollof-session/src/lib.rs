pub mod error;
pub mod command;
pub mod upstream;
pub mod generator;
pub mod coordinator;
pub mod assistant;
pub mod similarity;
pub mod matcher;
pub mod broadcaster;
pub mod backplane;
pub mod handler;
pub mod builder;

pub use error::{SessionError, Result};
pub use command::{Direction, parse_command, step_command};
pub use generator::{LLMStepGenerator, StepGenerator};
pub use coordinator::{Instruction, SessionCoordinator};
pub use assistant::CookingAssistant;
pub use similarity::{cosine_similarity, rank_top_k, Scored};
pub use matcher::RecipeMatcher;
pub use broadcaster::{Broadcaster, ConnectionId, EventReceiver};
pub use backplane::{Backplane, Envelope, NoopBackplane};
#[cfg(feature = "redis")]
pub use backplane::RedisBackplane;
pub use handler::{ConnectionContext, EventHandler};
pub use builder::{SessionService, SessionServiceBuilder};

// Re-export the wire types the socket layer needs
pub use jollof_types::{ClientEvent, CookingMode, RoomKey, ServerEvent, SessionConfig, SessionKey};
