//! Chat orchestration for FocusFlow.
//!
//! `ChatService` drives a conversation turn end to end: session lookup or
//! creation, message persistence, model streaming, title generation and the
//! recency bump. `grouping` buckets sessions for the sidebar listing.

pub mod grouping;
pub mod service;
pub mod title;
