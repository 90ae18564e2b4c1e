pub mod types;
pub mod traits;
pub mod config;
pub mod openai;

pub use traits::{
    ChatClient,
    EmbeddingClient,
    ChatRequest, ChatResponse, ChatOptions,
    EmbeddingRequest, EmbeddingResponse,
    TokenUsage,
};

pub use config::OpenAIConfig;
pub use openai::OpenAIClient;
pub use types::{Message, Content};
