//! Business logic and repository trait definitions for FocusFlow.
//!
//! This crate defines the "ports" (repository and model provider traits) that
//! the infrastructure layer implements, plus the chat orchestrator built on
//! top of them. It depends only on `focusflow-types` -- never on
//! `focusflow-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
