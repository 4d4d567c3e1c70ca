//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod context;
pub mod error;
pub mod identifiers;
pub mod malformed_line;
pub mod message;

// Re-export for convenience
pub use context::SessionContext;
pub use error::{AppError, FetchError, InputError, ListError, ParseError};
pub use identifiers::{
    ConversationId, ConversationKey, InvalidConversationId, InvalidMessageId, InvalidUserId,
    MessageId, UserId,
};
pub use malformed_line::MalformedLine;
pub use message::{Attachment, AttachmentKind, Message};
