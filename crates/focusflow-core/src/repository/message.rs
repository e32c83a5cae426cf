//! Message repository port.

use std::future::Future;

use uuid::Uuid;

use focusflow_types::error::RepositoryError;
use focusflow_types::message::{Message, MessageDraft, MessageUpdate, NewMessage};

use super::{ChangeSet, Entity, Repository};

impl ChangeSet for MessageUpdate {
    fn is_empty(&self) -> bool {
        self.role.is_none() && self.content.is_none()
    }
}

impl Entity for Message {
    type Id = Uuid;
    type Create = NewMessage;
    type Update = MessageUpdate;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn apply(&mut self, changes: &MessageUpdate) {
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
    }
}

/// Anything that can name a parent session: a `Uuid` or its text form.
pub trait IntoSessionId {
    fn into_session_id(self) -> Result<Uuid, RepositoryError>;
}

impl IntoSessionId for Uuid {
    fn into_session_id(self) -> Result<Uuid, RepositoryError> {
        Ok(self)
    }
}

impl IntoSessionId for &Uuid {
    fn into_session_id(self) -> Result<Uuid, RepositoryError> {
        Ok(*self)
    }
}

impl IntoSessionId for &str {
    fn into_session_id(self) -> Result<Uuid, RepositoryError> {
        Uuid::parse_str(self.trim()).map_err(|_| RepositoryError::InvalidId(self.to_string()))
    }
}

impl IntoSessionId for String {
    fn into_session_id(self) -> Result<Uuid, RepositoryError> {
        self.as_str().into_session_id()
    }
}

/// Message persistence scoped to a parent session.
pub trait MessageRepository: Repository<Message> {
    /// Create a message under `session_id`, which is parsed before storage.
    fn create_bound_to_session<S>(
        &self,
        draft: MessageDraft,
        session_id: S,
    ) -> impl Future<Output = Result<Message, RepositoryError>> + Send
    where
        S: IntoSessionId + Send,
    {
        let session_id = session_id.into_session_id();
        async move {
            let session_id = session_id?;
            self.create(draft.bind(session_id)).await
        }
    }

    /// All messages of a session, oldest first. Empty for unknown sessions.
    fn list_by_session(
        &self,
        session_id: &Uuid,
    ) -> impl Future<Output = Result<Vec<Message>, RepositoryError>> + Send;
}
