//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools, plus the row-mapping helpers they share.

pub mod message;
pub mod pool;
pub mod session;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use focusflow_types::error::RepositoryError;

/// A domain entity stored one-per-row in its own table.
///
/// Implementors supply the table name, the column list and the row decoder;
/// the free functions below build the shared point and page queries from them.
pub(crate) trait SqliteRecord: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    fn decode(row: &SqliteRow) -> Result<Self, RepositoryError>;
}

pub(crate) async fn fetch_by_id<T: SqliteRecord>(
    pool: &SqlitePool,
    id: &Uuid,
) -> Result<Option<T>, RepositoryError> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?", T::COLUMNS, T::TABLE);
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx_error)?;

    row.as_ref().map(T::decode).transpose()
}

/// Offset/limit page in insertion (rowid) order.
pub(crate) async fn fetch_page<T: SqliteRecord>(
    pool: &SqlitePool,
    skip: u32,
    limit: u32,
) -> Result<Vec<T>, RepositoryError> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY rowid ASC LIMIT ? OFFSET ?",
        T::COLUMNS,
        T::TABLE
    );
    let rows = sqlx::query(&sql)
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(pool)
        .await
        .map_err(map_sqlx_error)?;

    decode_rows(&rows)
}

pub(crate) fn decode_rows<T: SqliteRecord>(rows: &[SqliteRow]) -> Result<Vec<T>, RepositoryError> {
    rows.iter().map(T::decode).collect()
}

/// Map a sqlx error onto the repository taxonomy, keeping constraint
/// violations distinguishable.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            RepositoryError::ForeignKey(db_err.message().to_string())
        }
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(db_err.message().to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::warn!(error = %err, "database connection failure");
            RepositoryError::Connection
        }
        _ => RepositoryError::Query(err.to_string()),
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(value).map_err(|e| RepositoryError::Query(format!("invalid {column}: {e}")))
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC form, so text order equals chronological order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
