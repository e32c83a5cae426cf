use thiserror::Error;
use uuid::Uuid;

/// Errors from repository operations (used by trait definitions in focusflow-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    #[error("invalid identifier: '{0}'")]
    InvalidId(String),

    #[error("invalid change set: {0}")]
    InvalidChanges(String),
}

/// Errors surfaced by the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The caller referenced a session that does not exist (stale id).
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// The model, or anything else unexpected in the turn, failed.
    #[error("service error: {0}")]
    Service(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<crate::llm::LlmError> for ChatError {
    fn from(e: crate::llm::LlmError) -> Self {
        ChatError::Service(format!("model error: {e}"))
    }
}
