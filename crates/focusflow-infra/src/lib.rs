//! Infrastructure layer for FocusFlow.
//!
//! Contains implementations of the ports defined in `focusflow-core`:
//! SQLite session/message storage, the Ollama model provider, and the
//! `config.toml` loader.

pub mod config;
pub mod llm;
pub mod sqlite;
