//! Error types for chatlist.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error of the replay binary
//!   - [`InputError`] - Transcript file/stdin reading failures
//!   - [`ParseError`] - Transcript line parsing failures
//!   - [`ConfigError`](crate::config::ConfigError) - Config file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing initialization failures
//! - [`ListError`] - Failures surfaced by a conversation session
//!   - [`FetchError`] - Failures reported by a data source
//!
//! # Recovery Strategy
//!
//! Nothing inside a session is fatal. A failed fetch clears the in-flight flag and
//! is reported; an unresolved jump leaves the session untouched. Empty and stale
//! fetch results are outcomes, not errors, and never appear here.

use crate::model::{ConversationKey, MessageId};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the transcript from file or stdin.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// A transcript line could not be parsed and parsing was asked to be strict.
    #[error("Failed to parse transcript: {0}")]
    Parse(#[from] ParseError),

    /// The configuration file exists but is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// A session operation failed while replaying the transcript.
    #[error("Message list error: {0}")]
    List(#[from] ListError),

    /// The transcript holds no message of the requested conversation.
    #[error("Conversation '{0}' not found in transcript")]
    UnknownConversation(String),

    /// The transcript holds no valid messages at all.
    #[error("Transcript contains no messages")]
    EmptyTranscript,
}

/// Errors encountered when reading transcript input from files or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified transcript file does not exist at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use chatlist::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// No input source was provided and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Generic I/O error reading from the input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered when parsing JSONL transcript lines.
///
/// Parsing errors are **non-fatal** by default: malformed lines are logged and
/// skipped, and the list is built from the remaining messages. All variants carry
/// the 1-based line number.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A transcript line contains syntactically invalid JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatlist::model::error::ParseError;
    ///
    /// let err = ParseError::InvalidJson {
    ///     line: 42,
    ///     message: "unexpected character '}' at position 15".to_string()
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number in the transcript.
        line: usize,
        /// Parser error message from `serde_json`.
        message: String,
    },

    /// A required field is missing or empty.
    #[error("Missing required field '{field}' at line {line}")]
    MissingField {
        /// 1-based line number in the transcript.
        line: usize,
        /// Name of the missing field, e.g. "id" or "author_id".
        field: &'static str,
    },

    /// The `created_at` field is not an RFC 3339 timestamp.
    #[error("Invalid timestamp '{raw}' at line {line}")]
    InvalidTimestamp {
        /// 1-based line number in the transcript.
        line: usize,
        /// The raw value that failed to parse.
        raw: String,
    },
}

/// Failure reported by a data source for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The backend could not be reached or answered with an error.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// The backend does not know the requested conversation.
    #[error("unknown conversation {0}")]
    UnknownConversation(String),

    /// The cursor message used for the page is not known to the backend.
    #[error("unknown cursor message {0}")]
    UnknownCursor(MessageId),
}

/// Errors surfaced by a conversation session to its caller.
///
/// These are local and non-fatal: the list stays interactive and scrollable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// A pagination or jump fetch failed. No retry has been scheduled.
    #[error("fetch failed for {conversation}: {source}")]
    FetchFailure {
        /// Conversation the failed request belonged to.
        conversation: ConversationKey,
        /// What the data source reported.
        #[source]
        source: FetchError,
    },

    /// A jump target could not be resolved, even after an out-of-band fetch.
    #[error("message {0} not found")]
    TargetNotFound(MessageId),

    /// The operation needs an attached conversation.
    #[error("no conversation attached")]
    NotAttached,
}
