//! Shared domain types for FocusFlow.
//!
//! This crate contains the domain types used across the FocusFlow backend:
//! chat sessions, messages, model request/response shapes, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod message;
pub mod session;
