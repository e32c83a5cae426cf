//! Configuration loader for FocusFlow.
//!
//! Reads `config.toml` from the data directory (`~/.focusflow/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed, then applies `FOCUSFLOW_*`
//! environment overrides.

use std::path::{Path, PathBuf};

use focusflow_types::config::AppConfig;

use crate::sqlite::pool::default_database_url;

pub const ENV_DATA_DIR: &str = "FOCUSFLOW_DATA_DIR";
pub const ENV_DATABASE_URL: &str = "FOCUSFLOW_DATABASE_URL";
pub const ENV_OLLAMA_URL: &str = "FOCUSFLOW_OLLAMA_URL";
pub const ENV_MODEL: &str = "FOCUSFLOW_MODEL";

/// Resolve the data directory: `FOCUSFLOW_DATA_DIR`, else `~/.focusflow`.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var(ENV_DATA_DIR).ok())
}

fn data_dir_from(env_value: Option<String>) -> PathBuf {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".focusflow"),
    }
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Overlay `FOCUSFLOW_*` variables (read through `lookup`) onto `config`.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var(ENV_DATABASE_URL) {
        config.database.url = Some(url);
    }
    if let Some(url) = var(ENV_OLLAMA_URL) {
        config.ollama.base_url = url;
    }
    if let Some(model) = var(ENV_MODEL) {
        config.ollama.model = model;
    }
}

/// Load the file, apply process environment overrides, and fill in the
/// database URL from the data directory when none was given.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let mut config = load_config_file(data_dir).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if config.database.url.is_none() {
        config.database.url = Some(default_database_url(data_dir));
    }
    config
}
