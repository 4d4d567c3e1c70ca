//! chatlist
//!
//! Virtualization engine for chat message lists: maps a window of messages
//! onto an addressable sequence of item slots and separators, keeps the
//! scroll position anchored while pages arrive, and decides when to page.
//!
//! The core is sans-IO. A [`state::session::ConversationSession`] hands out
//! fetch requests and takes their results back; rendering and gestures go
//! through the traits in [`view`].

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;

// Transcript replay used by the binary
pub mod integration;
