use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction broadcast once the last step has been passed
pub const COMPLETION_MESSAGE: &str = "Done cooking!";

/// How the cook follows the recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookingMode {
    #[default]
    Voice,
    Text,
}

impl CookingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for CookingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CookingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voice" => Ok(Self::Voice),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown cooking mode: {}", other)),
        }
    }
}

/// Identifies one cook's progress through one recipe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub user_id: String,
    pub recipe_id: String,
}

impl SessionKey {
    /// Surrounding whitespace is not part of either id
    pub fn new(user_id: impl Into<String>, recipe_id: impl Into<String>) -> Self {
        Self {
            user_id: trimmed(user_id.into()),
            recipe_id: trimmed(recipe_id.into()),
        }
    }

    /// Key used by the session cache
    pub fn cache_key(&self) -> String {
        format!("session:{}:{}", self.user_id, self.recipe_id)
    }

    /// Personal broadcast room for this session
    pub fn room(&self) -> RoomKey {
        RoomKey::personal(&self.user_id, &self.recipe_id)
    }
}

fn trimmed(id: String) -> String {
    if id.trim().len() == id.len() {
        id
    } else {
        id.trim().to_string()
    }
}

/// Ephemeral projection of durable progress kept in the session cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user_id: String,
    pub recipe_id: String,
    pub mode: CookingMode,
    pub current_step: usize,
    #[serde(default)]
    pub completed: bool,
}

impl SessionState {
    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.user_id.clone(), self.recipe_id.clone())
    }
}

/// Broadcast group identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomKey(String);

impl RoomKey {
    /// `<user_id>:<recipe_id>`, one cook following one recipe
    pub fn personal(user_id: &str, recipe_id: &str) -> Self {
        Self(format!("{}:{}", user_id.trim(), recipe_id.trim()))
    }

    /// `cookalong:<recipe_id>`, shared by everyone cooking the recipe together
    pub fn cook_along(recipe_id: &str) -> Self {
        Self(format!("cookalong:{}", recipe_id.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shared cook-along room rather than a personal one
    pub fn is_cook_along(&self) -> bool {
        self.0.starts_with("cookalong:")
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_keys() {
        assert_eq!(RoomKey::personal("u1", "r1").as_str(), "u1:r1");
        assert_eq!(RoomKey::cook_along("r1").as_str(), "cookalong:r1");
        assert_eq!(SessionKey::new("u1", "r1").room(), RoomKey::personal("u1", "r1"));
        assert!(RoomKey::cook_along("r1").is_cook_along());
        assert!(!RoomKey::personal("u1", "r1").is_cook_along());
    }

    #[test]
    fn test_ids_are_trimmed() {
        let key = SessionKey::new(" u1", "r1 \t");
        assert_eq!(key, SessionKey::new("u1", "r1"));
        assert_eq!(key.cache_key(), "session:u1:r1");
        assert_eq!(RoomKey::cook_along(" r1 "), RoomKey::cook_along("r1"));
        assert_eq!(RoomKey::personal("u1 ", " r1"), RoomKey::personal("u1", "r1"));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(SessionKey::new("u1", "r1").cache_key(), "session:u1:r1");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("text".parse::<CookingMode>(), Ok(CookingMode::Text));
        assert_eq!(CookingMode::default(), CookingMode::Voice);
        assert!("shout".parse::<CookingMode>().is_err());
    }
}
