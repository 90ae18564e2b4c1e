mod db_chat_message;
mod db_progress;
mod db_recipe;

// Database-agnostic models
pub use db_chat_message::{ChatMessage, ChatRole};
pub use db_progress::{Progress, StepPosition};
pub use db_recipe::{Recipe, RecipeFilter};
