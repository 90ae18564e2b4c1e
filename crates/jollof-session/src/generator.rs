use anyhow::Result;
use async_trait::async_trait;
use jollof_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use jollof_types::LLMConfig;
use regex::Regex;
use std::sync::{Arc, OnceLock};

const SYSTEM_PROMPT: &str = "Return a numbered list of short steps to cook the requested recipe.";

/// Turns a recipe name into ordered instruction strings
#[async_trait]
pub trait StepGenerator: Send + Sync {
    async fn generate(&self, recipe_name: &str) -> Result<Vec<String>>;
}

/// Step generator backed by a chat model
pub struct LLMStepGenerator {
    client: Arc<dyn ChatClient>,
    config: LLMConfig,
}

impl LLMStepGenerator {
    pub fn new(client: Arc<dyn ChatClient>, config: LLMConfig) -> Self {
        Self { client, config }
    }

    fn request(&self, recipe_name: &str) -> ChatRequest {
        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::human(format!(
                "Provide a numbered list of clear, short steps for cooking {}.",
                recipe_name
            )),
        ];

        let mut options = ChatOptions::new();
        if let Some(temp) = self.config.temperature {
            options = options.temperature(temp);
        }
        ChatRequest::new(self.config.model.clone(), messages).with_options(options)
    }
}

#[async_trait]
impl StepGenerator for LLMStepGenerator {
    async fn generate(&self, recipe_name: &str) -> Result<Vec<String>> {
        let response = self.client.chat(self.request(recipe_name)).await?;
        let steps = parse_steps(response.content.as_deref().unwrap_or_default());
        tracing::debug!(recipe_name, steps = steps.len(), "generated recipe steps");
        Ok(steps)
    }
}

fn step_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\d+\.\s*").expect("step marker pattern is valid"))
}

/// Split a numbered list into trimmed, non-empty steps
pub fn parse_steps(text: &str) -> Vec<String> {
    step_marker()
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
