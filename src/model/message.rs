//! Chat message values.
//!
//! Messages are immutable: an edit or deletion arrives as a replacement
//! value with the same [`MessageId`]. Raw constructors are never exported -
//! use [`Message::new`] and the `with_*` builders.

use crate::model::{MessageId, UserId};
use chrono::{DateTime, Utc};

// ===== AttachmentKind =====

/// Kind of media or link carried by a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Still image
    Image,
    /// Video clip
    Video,
    /// Animated GIF from the giphy command
    Giphy,
    /// Any other uploaded file
    File,
    /// Link preview card scraped from a URL in the message text
    UrlPreview,
    /// Kind reported by the server that this crate does not know about
    Other(String),
}

impl AttachmentKind {
    /// Parse the wire name of an attachment kind.
    ///
    /// Unknown names are preserved in [`AttachmentKind::Other`].
    pub fn from_wire(name: &str) -> Self {
        match name {
            "image" => Self::Image,
            "video" => Self::Video,
            "giphy" => Self::Giphy,
            "file" => Self::File,
            "url" | "url_preview" => Self::UrlPreview,
            other => Self::Other(other.to_string()),
        }
    }

    /// Short label used by text renderers.
    pub fn label(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Giphy => "giphy",
            Self::File => "file",
            Self::UrlPreview => "link",
            Self::Other(name) => name,
        }
    }
}

// ===== Attachment =====

/// A single attachment of a message. Order within a message is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    kind: AttachmentKind,
    title: Option<String>,
    url: Option<String>,
}

impl Attachment {
    /// Create an attachment. Title and URL are optional on the wire.
    pub fn new(kind: AttachmentKind, title: Option<String>, url: Option<String>) -> Self {
        Self { kind, title, url }
    }

    /// Attachment kind
    pub fn kind(&self) -> &AttachmentKind {
        &self.kind
    }

    /// Display title, usually the file name
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Where the media lives
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

// ===== Message =====

/// One chat message as delivered by the data source.
///
/// `is_deleted`, `is_system` and `is_ephemeral` are independent flags; a
/// deleted system message is possible and renderers decide precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    author_id: UserId,
    created_at: DateTime<Utc>,
    parent_id: Option<MessageId>,
    quoted_message_id: Option<MessageId>,
    reply_count: u32,
    is_deleted: bool,
    is_system: bool,
    is_ephemeral: bool,
    visible_in_channel: bool,
    text: String,
    attachments: Vec<Attachment>,
}

impl Message {
    /// Create a plain top-level message with no flags set.
    pub fn new(
        id: MessageId,
        author_id: UserId,
        created_at: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author_id,
            created_at,
            parent_id: None,
            quoted_message_id: None,
            reply_count: 0,
            is_deleted: false,
            is_system: false,
            is_ephemeral: false,
            visible_in_channel: false,
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    /// Mark this message as a reply inside the thread rooted at `parent`.
    pub fn with_parent(mut self, parent: MessageId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Mark this message as quoting `quoted`.
    pub fn with_quoted(mut self, quoted: MessageId) -> Self {
        self.quoted_message_id = Some(quoted);
        self
    }

    /// Set the number of thread replies under this message.
    pub fn with_reply_count(mut self, reply_count: u32) -> Self {
        self.reply_count = reply_count;
        self
    }

    /// Mark as soft-deleted. The message keeps its slot.
    pub fn with_deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }

    /// Mark as a system notice (joins, renames, etc.).
    pub fn with_system(mut self, is_system: bool) -> Self {
        self.is_system = is_system;
        self
    }

    /// Mark as ephemeral: shown only to the current user.
    pub fn with_ephemeral(mut self, is_ephemeral: bool) -> Self {
        self.is_ephemeral = is_ephemeral;
        self
    }

    /// Thread reply that is also shown in the main conversation list.
    pub fn with_visible_in_channel(mut self, visible: bool) -> Self {
        self.visible_in_channel = visible;
        self
    }

    /// Replace the attachment list.
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Unique identifier
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Who sent the message
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Server creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Thread root this message replies to
    pub fn parent_id(&self) -> Option<&MessageId> {
        self.parent_id.as_ref()
    }

    /// Message this one quotes, if any
    pub fn quoted_message_id(&self) -> Option<&MessageId> {
        self.quoted_message_id.as_ref()
    }

    /// Number of replies in the thread this message roots
    pub fn reply_count(&self) -> u32 {
        self.reply_count
    }

    /// Soft-deleted messages keep their slot but show a tombstone.
    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// System notices render through `RenderHooks::system_message`.
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Ephemeral messages are visible only to the local user.
    pub fn is_ephemeral(&self) -> bool {
        self.is_ephemeral
    }

    /// Whether a thread reply is also listed in the channel.
    pub fn visible_in_channel(&self) -> bool {
        self.visible_in_channel
    }

    /// Message body
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attachments in display order
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// True for replies that live inside a thread.
    pub fn is_thread_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// True if this message opened a thread that has replies.
    pub fn has_replies(&self) -> bool {
        self.reply_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn msg(id: &str) -> Message {
        Message::new(
            MessageId::new(id).unwrap(),
            UserId::new("alice").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            "hello",
        )
    }

    #[test]
    fn new_message_has_no_flags() {
        let m = msg("m1");
        assert!(!m.is_deleted());
        assert!(!m.is_system());
        assert!(!m.is_ephemeral());
        assert!(!m.is_thread_reply());
        assert!(!m.has_replies());
        assert!(m.attachments().is_empty());
    }

    #[test]
    fn builders_set_thread_fields() {
        let root = MessageId::new("root").unwrap();
        let m = msg("m1")
            .with_parent(root.clone())
            .with_visible_in_channel(true);

        assert_eq!(m.parent_id(), Some(&root));
        assert!(m.is_thread_reply());
        assert!(m.visible_in_channel());
    }

    #[test]
    fn reply_count_drives_has_replies() {
        assert!(msg("m1").with_reply_count(3).has_replies());
        assert!(!msg("m1").with_reply_count(0).has_replies());
    }

    #[test]
    fn attachment_kind_parses_known_and_unknown_names() {
        assert_eq!(AttachmentKind::from_wire("image"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::from_wire("url"), AttachmentKind::UrlPreview);
        assert_eq!(
            AttachmentKind::from_wire("poll"),
            AttachmentKind::Other("poll".to_string())
        );
        assert_eq!(AttachmentKind::from_wire("poll").label(), "poll");
    }

    #[test]
    fn replacement_value_with_same_id_is_not_equal_when_content_differs() {
        let original = msg("m1");
        let deleted = msg("m1").with_deleted(true);

        assert_eq!(original.id(), deleted.id());
        assert_ne!(original, deleted);
    }
}
