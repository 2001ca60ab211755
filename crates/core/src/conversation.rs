//! Conversation turn types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// User/visitor message
    User,
    /// Bot message
    Bot,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Bot => "bot",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation history.
///
/// History is append-only; turns are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the speaker
    pub role: TurnRole,
    /// Message content
    pub message: String,
    /// When the turn occurred
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(message: impl Into<String>) -> Self {
        Self::new(TurnRole::User, message)
    }

    /// Create a bot turn
    pub fn bot(message: impl Into<String>) -> Self {
        Self::new(TurnRole::Bot, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_creation() {
        let turn = Turn::user("I want to start an LLC");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.role.as_str(), "user");

        let turn = Turn::bot("Happy to help with that.");
        assert_eq!(turn.role, TurnRole::Bot);
    }
}
