//! JSONL parser for chat transcripts.
//!
//! This module provides pure parsing functions for converting JSONL lines
//! into validated [`Message`] values tagged with their conversation.
//!
//! One message per line:
//!
//! ```json
//! {"id":"m1","conversation_id":"general","author_id":"ann",
//!  "created_at":"2024-03-01T12:00:00Z","text":"hi"}
//! ```
//!
//! Optional fields: `parent_id`, `reply_count`, `deleted`, `system`,
//! `ephemeral`, `show_in_channel`, `quoted_message_id`, `attachments`.

use crate::model::{
    Attachment, AttachmentKind, ConversationId, MalformedLine, Message, MessageId, ParseError,
    UserId,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw JSON structure for deserializing transcript lines.
#[derive(Debug, Deserialize)]
struct RawMessage {
    id: String,
    conversation_id: String,
    author_id: String,
    created_at: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    reply_count: u32,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    system: bool,
    #[serde(default)]
    ephemeral: bool,
    #[serde(default)]
    show_in_channel: bool,
    #[serde(default)]
    quoted_message_id: Option<String>,
    #[serde(default)]
    attachments: Vec<RawAttachment>,
}

#[derive(Debug, Deserialize)]
struct RawAttachment {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// A parsed transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRecord {
    /// Conversation the line belongs to
    pub conversation: ConversationId,
    /// The parsed message
    pub message: Message,
}

/// Result of parsing a JSONL line with graceful error handling.
///
/// This allows the parser to continue processing subsequent lines
/// even when encountering malformed JSON.
#[derive(Debug, Clone)]
pub enum ParseResult {
    /// Successfully parsed a message.
    Valid(Box<TranscriptRecord>),
    /// Encountered a malformed line that could not be parsed.
    Malformed(MalformedLine),
}

/// Parse a single JSONL line gracefully.
///
/// Unlike [`parse_record`], this function never returns an error.
///
/// # Arguments
///
/// * `raw` - The raw JSONL line to parse
/// * `line_number` - The line number (1-indexed) for error reporting
pub fn parse_record_graceful(raw: &str, line_number: usize) -> ParseResult {
    match parse_record(raw, line_number) {
        Ok(record) => ParseResult::Valid(Box::new(record)),
        Err(parse_error) => ParseResult::Malformed(MalformedLine::new(
            line_number,
            raw,
            parse_error.to_string(),
            extract_conversation_best_effort(raw),
        )),
    }
}

/// Recover the conversation id from a line that failed to parse.
fn extract_conversation_best_effort(raw: &str) -> Option<ConversationId> {
    #[derive(Deserialize)]
    struct PartialMessage {
        conversation_id: Option<String>,
    }

    serde_json::from_str::<PartialMessage>(raw)
        .ok()
        .and_then(|partial| partial.conversation_id)
        .and_then(|id| ConversationId::new(id).ok())
}

/// Parse a single JSONL line into a [`TranscriptRecord`].
///
/// # Errors
///
/// Returns `ParseError` if:
/// - JSON is malformed or a required field is absent
/// - `id`, `conversation_id` or `author_id` is empty
/// - `created_at` is not RFC 3339
pub fn parse_record(raw: &str, line_number: usize) -> Result<TranscriptRecord, ParseError> {
    let raw_message: RawMessage =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
            line: line_number,
            message: e.to_string(),
        })?;

    let missing = |field: &'static str| ParseError::MissingField {
        line: line_number,
        field,
    };

    let id = MessageId::new(raw_message.id).map_err(|_| missing("id"))?;
    let conversation =
        ConversationId::new(raw_message.conversation_id).map_err(|_| missing("conversation_id"))?;
    let author = UserId::new(raw_message.author_id).map_err(|_| missing("author_id"))?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&raw_message.created_at)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTimestamp {
            line: line_number,
            raw: raw_message.created_at.clone(),
        })?;

    let attachments = raw_message
        .attachments
        .into_iter()
        .map(|a| Attachment::new(AttachmentKind::from_wire(&a.kind), a.title, a.url))
        .collect();

    let mut message = Message::new(id, author, created_at, raw_message.text)
        .with_reply_count(raw_message.reply_count)
        .with_deleted(raw_message.deleted)
        .with_system(raw_message.system)
        .with_ephemeral(raw_message.ephemeral)
        .with_visible_in_channel(raw_message.show_in_channel)
        .with_attachments(attachments);

    if let Some(parent) = raw_message.parent_id.filter(|p| !p.is_empty()) {
        message = message.with_parent(MessageId::new(parent).map_err(|_| missing("parent_id"))?);
    }
    if let Some(quoted) = raw_message.quoted_message_id.filter(|q| !q.is_empty()) {
        message = message
            .with_quoted(MessageId::new(quoted).map_err(|_| missing("quoted_message_id"))?);
    }

    Ok(TranscriptRecord {
        conversation,
        message,
    })
}

/// Parse every line of a transcript.
///
/// Blank lines are skipped. Malformed lines are collected, not fatal.
pub fn parse_transcript<I, S>(lines: I) -> (Vec<TranscriptRecord>, Vec<MalformedLine>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut malformed = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        match parse_record_graceful(line, index + 1) {
            ParseResult::Valid(record) => records.push(*record),
            ParseResult::Malformed(bad) => {
                tracing::warn!(
                    line = bad.line_number(),
                    error = bad.error_message(),
                    "skipping malformed transcript line"
                );
                malformed.push(bad);
            }
        }
    }

    (records, malformed)
}
