//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! ChatService is generic over the repository traits, but AppState pins it to
//! the SQLite implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use focusflow_core::chat::service::ChatService;
use focusflow_infra::config::{load_config, resolve_data_dir};
use focusflow_infra::llm::create_provider;
use focusflow_infra::sqlite::message::SqliteMessageRepository;
use focusflow_infra::sqlite::pool::{DatabasePool, default_database_url};
use focusflow_infra::sqlite::session::SqliteSessionRepository;
use focusflow_types::config::AppConfig;

/// Concrete type alias for the chat service pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteSessionRepository, SqliteMessageRepository>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;
        Self::from_config(config, &data_dir).await
    }

    /// Wire services from an already-loaded config.
    pub async fn from_config(config: AppConfig, data_dir: &Path) -> anyhow::Result<Self> {
        let db_url = config
            .database
            .url
            .clone()
            .unwrap_or_else(|| default_database_url(data_dir));
        let db_pool = DatabasePool::connect(&db_url, config.database.enforce_foreign_keys)
            .await
            .with_context(|| format!("failed to open database at {db_url}"))?;

        let provider = create_provider(&config.ollama)?;

        let chat_service = ChatService::new(
            SqliteSessionRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool),
            provider,
            config.ollama.model.clone(),
        )
        .with_temperature(config.ollama.temperature);

        tracing::debug!(
            model = %config.ollama.model,
            provider = chat_service.provider_name(),
            "application state ready"
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
        })
    }
}
