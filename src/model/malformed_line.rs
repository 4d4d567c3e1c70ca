//! Transcript lines that could not be parsed.

use crate::model::ConversationId;

/// A transcript line that could not be turned into a message.
///
/// Kept so callers can report it and carry on with the following lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    line_number: usize,
    raw_line: String,
    error_message: String,
    conversation: Option<ConversationId>,
}

impl MalformedLine {
    /// Create a new malformed line.
    ///
    /// # Arguments
    ///
    /// * `line_number` - The line number in the transcript (1-indexed)
    /// * `raw_line` - The raw line content that failed to parse
    /// * `error_message` - Human-readable error message
    /// * `conversation` - Conversation id, if a partial parse recovered one
    pub fn new(
        line_number: usize,
        raw_line: impl Into<String>,
        error_message: impl Into<String>,
        conversation: Option<ConversationId>,
    ) -> Self {
        Self {
            line_number,
            raw_line: raw_line.into(),
            error_message: error_message.into(),
            conversation,
        }
    }

    /// Get the 1-indexed line number.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Get the raw line content.
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// Get the error message.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Conversation recovered from a partial parse
    pub fn conversation(&self) -> Option<&ConversationId> {
        self.conversation.as_ref()
    }
}
