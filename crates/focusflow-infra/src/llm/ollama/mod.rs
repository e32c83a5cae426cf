//! Ollama model provider implementation.
//!
//! This module provides the [`OllamaProvider`] which implements the
//! [`LlmProvider`](focusflow_core::llm::provider::LlmProvider) trait for a
//! local Ollama server's `/api/chat` endpoint, including NDJSON streaming.

pub mod client;
pub mod streaming;
pub mod types;

#[cfg(test)]
pub(crate) mod stub;

pub use client::OllamaProvider;
