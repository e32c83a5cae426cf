//! Configuration types for FocusFlow.
//!
//! `AppConfig` represents the top-level `config.toml` that controls the
//! database location, the local model endpoint, and the HTTP listener.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the FocusFlow backend.
///
/// Loaded from `~/.focusflow/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Relational store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL. When unset the loader derives one from the data dir.
    #[serde(default)]
    pub url: Option<String>,

    /// Reject messages whose `session_id` does not reference a session.
    #[serde(default = "default_enforce_foreign_keys")]
    pub enforce_foreign_keys: bool,
}

fn default_enforce_foreign_keys() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            enforce_foreign_keys: default_enforce_foreign_keys(),
        }
    }
}

/// Local model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Overall HTTP timeout for one model call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub temperature: Option<f64>,
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma:2b".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
            temperature: None,
        }
    }
}

/// HTTP listener settings for `focusflow serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert!(config.database.url.is_none());
        assert!(config.database.enforce_foreign_keys);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "gemma:2b");
        assert_eq!(config.ollama.request_timeout_secs, 300);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[ollama]
model = "llama3.2"

[database]
enforce_foreign_keys = false
"#,
        )
        .unwrap();
        assert_eq!(config.ollama.model, "llama3.2");
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert!(!config.database.enforce_foreign_keys);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.ollama.model, AppConfig::default().ollama.model);
    }
}
