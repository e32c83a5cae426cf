//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. This module provides a `DatabasePool`
//! with a multi-connection reader pool for concurrent reads and a single-connection
//! writer pool for serialized writes. Both use WAL journal mode.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database with foreign key enforcement on.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        Self::connect(database_url, true).await
    }

    /// Open the database, running migrations on the writer pool.
    ///
    /// With `enforce_foreign_keys` off, messages may reference sessions that
    /// do not exist.
    pub async fn connect(database_url: &str, enforce_foreign_keys: bool) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(enforce_foreign_keys)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Run migrations on writer before opening reader pool
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        tracing::debug!(enforce_foreign_keys, "database pool ready");
        Ok(Self { reader, writer })
    }
}

/// Default database URL under the data directory: `{data_dir}/focusflow.db`.
pub fn default_database_url(data_dir: &Path) -> String {
    format!("sqlite://{}/focusflow.db?mode=rwc", data_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_url(name: &str) -> String {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join(name);
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        format!("sqlite://{}?mode=rwc", db_path.display())
    }

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let pool = DatabasePool::new(&temp_url("test.db")).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, ["messages", "sessions"]);
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let pool = DatabasePool::new(&temp_url("test_wal.db")).await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_pool_foreign_keys_follow_flag() {
        let enforced = DatabasePool::connect(&temp_url("fk_on.db"), true).await.unwrap();
        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&enforced.writer)
            .await
            .unwrap();
        assert_eq!(result.0, 1, "foreign keys should be enabled");

        let relaxed = DatabasePool::connect(&temp_url("fk_off.db"), false).await.unwrap();
        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&relaxed.writer)
            .await
            .unwrap();
        assert_eq!(result.0, 0, "foreign keys should be disabled");
    }

    #[test]
    fn test_default_database_url() {
        let url = default_database_url(Path::new("/tmp/focusflow-data"));
        assert_eq!(url, "sqlite:///tmp/focusflow-data/focusflow.db?mode=rwc");
    }
}
