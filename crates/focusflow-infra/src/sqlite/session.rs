//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `focusflow-core` using sqlx with split
//! read/write pools, raw queries and a private Row struct.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use focusflow_core::repository::session::SessionRepository;
use focusflow_core::repository::{Entity, Repository};
use focusflow_types::error::RepositoryError;
use focusflow_types::session::{NewSession, Session, SessionUpdate};

use super::pool::DatabasePool;
use super::{
    SqliteRecord, decode_rows, fetch_by_id, fetch_page, format_datetime, map_sqlx_error,
    parse_datetime, parse_uuid,
};

/// Newest activity first; rowid settles equal timestamps in favor of the later insert.
const RECENCY_ORDER: &str = "ORDER BY updated_at DESC, rowid DESC";

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Session.
struct SessionRow {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<Session, RepositoryError> {
        Ok(Session {
            id: parse_uuid(&self.id, "session id")?,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl SqliteRecord for Session {
    const TABLE: &'static str = "sessions";
    const COLUMNS: &'static str = "id, title, created_at, updated_at";

    fn decode(row: &SqliteRow) -> Result<Self, RepositoryError> {
        SessionRow::from_row(row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_session()
    }
}

impl Repository<Session> for SqliteSessionRepository {
    async fn get(&self, id: &Uuid) -> Result<Option<Session>, RepositoryError> {
        fetch_by_id(&self.pool.reader, id).await
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Session>, RepositoryError> {
        fetch_page(&self.pool.reader, skip, limit).await
    }

    async fn create(&self, fields: NewSession) -> Result<Session, RepositoryError> {
        let now = Utc::now();
        let stamp = format_datetime(&now);
        let id = Uuid::now_v7();

        sqlx::query(
            "INSERT INTO sessions (id, title, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&fields.title)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        // Re-read the stored row so callers see exactly what was persisted.
        fetch_by_id(&self.pool.writer, &id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        existing: &Session,
        changes: SessionUpdate,
    ) -> Result<Session, RepositoryError> {
        let mut next = existing.clone();
        next.apply(&changes);

        // updated_at never moves backwards, even if the clock does.
        let sql = format!(
            "UPDATE sessions SET title = ?, updated_at = MAX(updated_at, ?) WHERE id = ? RETURNING {}",
            Session::COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&next.title)
            .bind(format_datetime(&Utc::now()))
            .bind(existing.id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepositoryError::NotFound)?;

        Session::decode(&row)
    }

    async fn remove(&self, id: &Uuid) -> Result<Option<Session>, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_error)?;

        let sql = format!("SELECT {} FROM sessions WHERE id = ?", Session::COLUMNS);
        let Some(row) = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
        else {
            return Ok(None);
        };
        let session = Session::decode(&row)?;

        // Children go first so no orphan survives even with FK enforcement off.
        let removed_messages = sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::debug!(session_id = %id, removed_messages, "removed session");
        Ok(Some(session))
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn list_all_by_recency(&self) -> Result<Vec<Session>, RepositoryError> {
        let sql = format!("SELECT {} FROM sessions {RECENCY_ORDER}", Session::COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        decode_rows(&rows)
    }

    async fn search_by_title(&self, keyword: &str) -> Result<Vec<Session>, RepositoryError> {
        // Unicode case folding; SQLite LIKE folds ASCII only.
        let needle = keyword.to_lowercase();
        let mut sessions = self.list_all_by_recency().await?;
        sessions.retain(|s| s.title.to_lowercase().contains(&needle));
        Ok(sessions)
    }
}
