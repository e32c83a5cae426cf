//! Chat message types.
//!
//! Messages are immutable once written by the chat workflow and are ordered
//! within their session by `created_at`, ties broken by insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Author of a stored message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'ai'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Ai,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "ai" => Ok(MessageRole::Ai),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single persisted message within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Role and content of a message before it is bound to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDraft {
    pub role: MessageRole,
    pub content: String,
}

impl MessageDraft {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Ai,
            content: content.into(),
        }
    }

    /// Attach the draft to a parent session.
    pub fn bind(self, session_id: Uuid) -> NewMessage {
        NewMessage {
            session_id,
            role: self.role,
            content: self.content,
        }
    }
}

/// Caller-supplied fields for creating a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
}

/// Sparse change set for a message. Nothing in the chat workflow issues one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MessageRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_display_and_parse() {
        for role in [MessageRole::User, MessageRole::Ai] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert_eq!("AI".parse::<MessageRole>().unwrap(), MessageRole::Ai);
    }

    #[test]
    fn test_message_role_rejects_other_roles() {
        let err = "assistant".parse::<MessageRole>().unwrap_err();
        assert!(err.contains("assistant"));
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde() {
        assert_eq!(serde_json::to_string(&MessageRole::Ai).unwrap(), "\"ai\"");
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
    }

    #[test]
    fn test_draft_bind() {
        let session_id = Uuid::now_v7();
        let new = MessageDraft::ai("").bind(session_id);
        assert_eq!(new.session_id, session_id);
        assert_eq!(new.role, MessageRole::Ai);
        assert!(new.content.is_empty());
    }
}
