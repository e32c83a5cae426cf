//! SQLite message repository implementation.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use focusflow_core::repository::message::MessageRepository;
use focusflow_core::repository::{Entity, Repository};
use focusflow_types::error::RepositoryError;
use focusflow_types::message::{Message, MessageRole, MessageUpdate, NewMessage};

use super::pool::DatabasePool;
use super::{
    SqliteRecord, decode_rows, fetch_by_id, fetch_page, format_datetime, map_sqlx_error,
    parse_datetime, parse_uuid,
};

/// SQLite-backed implementation of `MessageRepository`.
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Message {
            id: parse_uuid(&self.id, "message id")?,
            session_id: parse_uuid(&self.session_id, "session_id")?,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl SqliteRecord for Message {
    const TABLE: &'static str = "messages";
    const COLUMNS: &'static str = "id, session_id, role, content, created_at";

    fn decode(row: &SqliteRow) -> Result<Self, RepositoryError> {
        MessageRow::from_row(row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_message()
    }
}

impl Repository<Message> for SqliteMessageRepository {
    async fn get(&self, id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        fetch_by_id(&self.pool.reader, id).await
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Message>, RepositoryError> {
        fetch_page(&self.pool.reader, skip, limit).await
    }

    async fn create(&self, fields: NewMessage) -> Result<Message, RepositoryError> {
        let id = Uuid::now_v7();
        let sql = format!(
            "INSERT INTO messages (id, session_id, role, content, created_at) VALUES (?, ?, ?, ?, ?) RETURNING {}",
            Message::COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(fields.session_id.to_string())
            .bind(fields.role.to_string())
            .bind(&fields.content)
            .bind(format_datetime(&Utc::now()))
            .fetch_one(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        Message::decode(&row)
    }

    async fn update(
        &self,
        existing: &Message,
        changes: MessageUpdate,
    ) -> Result<Message, RepositoryError> {
        let mut next = existing.clone();
        next.apply(&changes);

        let sql = format!(
            "UPDATE messages SET role = ?, content = ? WHERE id = ? RETURNING {}",
            Message::COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(next.role.to_string())
            .bind(&next.content)
            .bind(existing.id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepositoryError::NotFound)?;

        Message::decode(&row)
    }

    async fn remove(&self, id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let sql = format!("DELETE FROM messages WHERE id = ? RETURNING {}", Message::COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(Message::decode).transpose()
    }
}

impl MessageRepository for SqliteMessageRepository {
    async fn list_by_session(&self, session_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM messages WHERE session_id = ? ORDER BY created_at ASC, rowid ASC",
            Message::COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        decode_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use focusflow_core::repository::session::SessionRepository;
    use focusflow_types::message::MessageDraft;
    use focusflow_types::session::NewSession;

    use super::*;
    use crate::sqlite::session::SqliteSessionRepository;

    async fn test_pool_with(enforce_foreign_keys: bool) -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::connect(&url, enforce_foreign_keys).await.unwrap()
    }

    async fn repos() -> (SqliteSessionRepository, SqliteMessageRepository) {
        let pool = test_pool_with(true).await;
        (
            SqliteSessionRepository::new(pool.clone()),
            SqliteMessageRepository::new(pool),
        )
    }

    #[tokio::test]
    async fn test_messages_come_back_in_creation_order() {
        let (sessions, messages) = repos().await;
        let session = sessions.create(NewSession::new("Docker")).await.unwrap();

        let mut created = Vec::new();
        for i in 0..5 {
            let draft = if i % 2 == 0 {
                MessageDraft::user(format!("question {i}"))
            } else {
                MessageDraft::ai(format!("answer {i}"))
            };
            created.push(messages.create_bound_to_session(draft, session.id).await.unwrap());
        }

        let history = messages.list_by_session(&session.id).await.unwrap();
        assert_eq!(history, created);
        assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_list_by_session_is_scoped() {
        let (sessions, messages) = repos().await;
        let docker = sessions.create(NewSession::new("Docker")).await.unwrap();
        let fastapi = sessions.create(NewSession::new("FastAPI")).await.unwrap();

        messages
            .create_bound_to_session(MessageDraft::user("compose?"), docker.id)
            .await
            .unwrap();
        messages
            .create_bound_to_session(MessageDraft::user("routers?"), fastapi.id)
            .await
            .unwrap();

        let history = messages.list_by_session(&docker.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "compose?");

        assert!(messages.list_by_session(&Uuid::now_v7()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_accepts_textual_session_id() {
        let (sessions, messages) = repos().await;
        let session = sessions.create(NewSession::new("Docker")).await.unwrap();

        let text = session.id.to_string().to_uppercase();
        let message = messages
            .create_bound_to_session(MessageDraft::ai(""), text.as_str())
            .await
            .unwrap();
        assert_eq!(message.session_id, session.id);
        assert_eq!(message.content, "");
        assert_eq!(message.role, MessageRole::Ai);

        let err = messages
            .create_bound_to_session(MessageDraft::user("hi"), "not-a-uuid")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_dangling_session_rejected_when_enforced() {
        let (_, messages) = repos().await;
        let err = messages
            .create_bound_to_session(MessageDraft::user("orphan"), Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKey(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_dangling_session_accepted_when_relaxed() {
        let messages = SqliteMessageRepository::new(test_pool_with(false).await);
        let orphan_session = Uuid::now_v7();

        let message = messages
            .create_bound_to_session(MessageDraft::user("orphan"), orphan_session)
            .await
            .unwrap();
        assert_eq!(message.session_id, orphan_session);
        assert_eq!(messages.list_by_session(&orphan_session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_paginate_session_messages() {
        let (sessions, messages) = repos().await;
        let session = sessions.create(NewSession::new("Unit Testing")).await.unwrap();
        for i in 0..5 {
            messages
                .create_bound_to_session(MessageDraft::user(format!("m{i}")), session.id)
                .await
                .unwrap();
        }

        let first = messages.list(0, 3).await.unwrap();
        let second = messages.list(3, 3).await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        let contents: Vec<_> = first.iter().chain(&second).map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["m0", "m1", "m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_update_and_remove_message() {
        let (sessions, messages) = repos().await;
        let session = sessions.create(NewSession::new("Docker")).await.unwrap();
        let message = messages
            .create_bound_to_session(MessageDraft::ai("draft"), session.id)
            .await
            .unwrap();

        let edited = messages
            .update(
                &message,
                MessageUpdate {
                    content: Some("final".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.content, "final");
        assert_eq!(edited.role, MessageRole::Ai);
        assert_eq!(edited.created_at, message.created_at);

        let removed = messages.remove(&message.id).await.unwrap().unwrap();
        assert_eq!(removed.id, message.id);
        assert!(messages.get(&message.id).await.unwrap().is_none());
        assert!(messages.remove(&message.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_search_unaffected_by_messages() {
        let (sessions, messages) = repos().await;
        let session = sessions.create(NewSession::new("Docker Compose")).await.unwrap();
        messages
            .create_bound_to_session(MessageDraft::user("docker"), session.id)
            .await
            .unwrap();
        assert_eq!(sessions.search_by_title("compose").await.unwrap().len(), 1);
    }
}
