//! Model provider implementations.
//!
//! Contains the concrete [`LlmProvider`](focusflow_core::llm::provider::LlmProvider)
//! for Ollama and a factory ([`create_provider`]) that builds it from
//! [`OllamaConfig`].

pub mod ollama;

use std::time::Duration;

use focusflow_core::llm::box_provider::BoxLlmProvider;
use focusflow_types::config::OllamaConfig;
use focusflow_types::llm::LlmError;

use self::ollama::OllamaProvider;

/// Create a [`BoxLlmProvider`] from the `[ollama]` config section.
pub fn create_provider(config: &OllamaConfig) -> Result<BoxLlmProvider, LlmError> {
    let provider = OllamaProvider::new(
        config.base_url.as_str(),
        config.model.as_str(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    tracing::debug!(base_url = %config.base_url, model = %config.model, "ollama provider ready");
    Ok(BoxLlmProvider::new(provider))
}
