mod chat;
mod progress;
mod recipe;

pub use chat::MongoChatRepository;
pub use progress::MongoProgressRepository;
pub use recipe::MongoRecipeRepository;
