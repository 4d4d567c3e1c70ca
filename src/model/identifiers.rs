//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use std::fmt;

/// Stable, server-assigned identifier of a single message.
/// NEVER export the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    /// Smart constructor: validates non-empty message ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidMessageId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidMessageId::Empty);
        }
        Ok(Self(raw))
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a chat participant (message author or local viewer).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Smart constructor: validates non-empty user ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidUserId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidUserId::Empty);
        }
        Ok(Self(raw))
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversation (channel) identifier, e.g. "messaging:general".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(String);

impl ConversationId {
    /// Smart constructor: validates non-empty conversation ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidConversationId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidConversationId::Empty);
        }
        Ok(Self(raw))
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the list being shown: a conversation, or one thread inside it.
///
/// Two keys are equal only if both the conversation and the thread root match.
/// Fetch results are checked against the active key when they are applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    conversation: ConversationId,
    thread_root: Option<MessageId>,
}

impl ConversationKey {
    /// Key for the main list of a conversation.
    pub fn conversation(conversation: ConversationId) -> Self {
        Self {
            conversation,
            thread_root: None,
        }
    }

    /// Key for the replies of `root` inside `conversation`.
    pub fn thread(conversation: ConversationId, root: MessageId) -> Self {
        Self {
            conversation,
            thread_root: Some(root),
        }
    }

    /// Conversation the list belongs to
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation
    }

    /// Root message, for a thread list
    pub fn thread_root(&self) -> Option<&MessageId> {
        self.thread_root.as_ref()
    }

    /// True for a thread list
    pub fn is_thread(&self) -> bool {
        self.thread_root.is_some()
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.thread_root {
            Some(root) => write!(f, "{}#{}", self.conversation, root),
            None => write!(f, "{}", self.conversation),
        }
    }
}

// ===== Error Types =====

/// Error returned by [`MessageId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMessageId {
    /// Empty input
    #[error("Message ID cannot be empty")]
    Empty,
}

/// Error returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUserId {
    /// Empty input
    #[error("User ID cannot be empty")]
    Empty,
}

/// Error returned by [`ConversationId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConversationId {
    /// Empty input
    #[error("Conversation ID cannot be empty")]
    Empty,
}

// ===== Tests =====
