//! Chat workflow input/output shapes.
//!
//! These are the values the chat orchestrator hands back to its callers
//! (REST handlers and CLI commands). Field names on the wire follow the
//! web client's camelCase convention where it expects it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;
use crate::session::SessionSummary;

/// Title given to a session before the model has named it.
pub const PROVISIONAL_TITLE: &str = "New Conversation";

/// Title used when the model fails to produce one.
pub const FALLBACK_TITLE: &str = "Untitled Conversation";

/// Label of the third recency bucket.
pub const PREVIOUS_30_DAYS: &str = "Previous 30 Days";

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "ai_response")]
    pub reply: String,
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "sessionTitle")]
    pub session_title: String,
}

/// A session together with its full, chronologically ordered history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistory {
    pub id: Uuid,
    pub title: String,
    pub chat_history: Vec<Message>,
}

/// Sessions bucketed by how recently they were created.
///
/// Each bucket keeps the order it was filled in (most recently updated first).
/// Sessions older than thirty days appear in no bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedSessions {
    #[serde(rename = "Today")]
    pub today: Vec<SessionSummary>,
    #[serde(rename = "Yesterday")]
    pub yesterday: Vec<SessionSummary>,
    #[serde(rename = "Previous 30 Days")]
    pub previous_30_days: Vec<SessionSummary>,
}

impl GroupedSessions {
    /// Total number of sessions across all buckets.
    pub fn len(&self) -> usize {
        self.today.len() + self.yesterday.len() + self.previous_30_days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
