//! Ordered, deduplicated message window with an id→position index.

use std::collections::HashMap;

use crate::model::{Message, MessageId};

/// The window of messages currently loaded for one conversation or thread.
///
/// Order is the display order handed in by the owner: newest-first for a
/// reversed list, oldest-first otherwise. The store never reorders.
///
/// # Invariant
/// `index` maps every id in `messages` to its position, and nothing else.
/// It is rebuilt on every [`replace`](Self::replace).
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    index: HashMap<MessageId, usize>,
}

impl MessageStore {
    /// Empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole window.
    ///
    /// The new sequence may be a superset, a subset or entirely disjoint from
    /// the previous one. Ids are expected to be unique; if one repeats, the
    /// index points at its last occurrence.
    pub fn replace(&mut self, messages: Vec<Message>) {
        let mut index = HashMap::with_capacity(messages.len());
        for (position, message) in messages.iter().enumerate() {
            if index.insert(message.id().clone(), position).is_some() {
                tracing::warn!(id = %message.id(), "duplicate message id in window");
            }
        }
        self.messages = messages;
        self.index = index;
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.index.clear();
    }

    /// Number of messages in the window.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the window is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Message at `position`, in layout order.
    pub fn get(&self, position: usize) -> Option<&Message> {
        self.messages.get(position)
    }

    /// Position of `id` in the window, O(1).
    pub fn index_of(&self, id: &MessageId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Whether `id` is loaded.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.index.contains_key(id)
    }

    /// Loaded message with `id`.
    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        self.index_of(id).and_then(|position| self.messages.get(position))
    }

    /// Message at position 0
    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    /// Message at the highest position
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages in layout order
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The window as a slice
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}
