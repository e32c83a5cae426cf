//! OllamaProvider -- concrete [`LlmProvider`] implementation for a local Ollama server.
//!
//! Sends requests to `/api/chat`. Supports both non-streaming (`complete`)
//! and streaming (`stream`) modes. Ollama needs no credentials.

use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use reqwest::StatusCode;

use focusflow_core::llm::provider::LlmProvider;
use focusflow_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent, Usage};

use super::streaming::create_ollama_stream;
use super::types::{OllamaChatChunk, OllamaChatRequest, OllamaErrorBody, OllamaMessage, OllamaOptions};

/// Ollama chat provider.
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// Create a provider for `base_url` (e.g. `http://localhost:11434`).
    ///
    /// `model` is used whenever a request leaves its own model empty.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a generic [`CompletionRequest`] into an [`OllamaChatRequest`].
    fn to_ollama_request(&self, request: &CompletionRequest, stream: bool) -> OllamaChatRequest {
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        OllamaChatRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream,
            options: OllamaOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }
}

/// Map a transport failure. An unreachable server is `Unavailable`.
pub(crate) fn map_send_error(err: reqwest::Error, url: &str) -> LlmError {
    if err.is_connect() || err.is_timeout() {
        LlmError::Unavailable(format!("cannot reach Ollama at {url}: {err}"))
    } else {
        LlmError::Provider {
            message: format!("HTTP request failed: {err}"),
        }
    }
}

/// Map a non-2xx response, preferring Ollama's own `{"error": ...}` text.
pub(crate) fn map_status_error(status: StatusCode, body: &str) -> LlmError {
    let detail = serde_json::from_str::<OllamaErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());

    match status.as_u16() {
        404 => LlmError::Provider {
            message: format!("model not found: {detail}"),
        },
        s if s >= 500 => LlmError::Unavailable(format!("HTTP {status}: {detail}")),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {detail}"),
        },
    }
}

/// Pass a 2xx response through; turn anything else into an `LlmError`.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %error_body, "Ollama error response");
    Err(map_status_error(status, &error_body))
}

impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[tracing::instrument(name = "ollama_complete", skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_ollama_request(request, false);
        let url = self.url("/api/chat");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(e, &url))?;
        let response = check_status(response).await?;

        let chunk: OllamaChatChunk = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        Ok(CompletionResponse {
            content: chunk.message.map(|m| m.content).unwrap_or_default(),
            model: if chunk.model.is_empty() {
                body.model
            } else {
                chunk.model
            },
            usage: Usage {
                input_tokens: chunk.prompt_eval_count.unwrap_or(0),
                output_tokens: chunk.eval_count.unwrap_or(0),
            },
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = self.to_ollama_request(&request, true);
        let url = self.url("/api/chat");

        create_ollama_stream(&self.client, &url, body)
    }
}
