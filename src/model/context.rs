//! Explicit per-session context.
//!
//! Everything a core operation needs to know about "who is looking at what"
//! travels in a [`SessionContext`] instead of being looked up globally.

use crate::model::{ConversationKey, UserId};

/// The local viewer and the conversation (or thread) being shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    current_user: UserId,
    key: ConversationKey,
}

impl SessionContext {
    /// Create a context for `current_user` looking at `key`.
    pub fn new(current_user: UserId, key: ConversationKey) -> Self {
        Self { current_user, key }
    }

    /// The local viewer
    pub fn current_user(&self) -> &UserId {
        &self.current_user
    }

    /// What is being shown
    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    /// True if `author` is the local viewer.
    pub fn is_own(&self, author: &UserId) -> bool {
        &self.current_user == author
    }
}
