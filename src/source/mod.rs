//! Message sources.
//!
//! - [`InputSource`]: where a JSONL transcript comes from (file or stdin)
//! - [`DataSource`]: the paging contract the host runs [`FetchRequest`]s
//!   against
//! - [`TranscriptSource`]: in-memory [`DataSource`] over a parsed transcript

use crate::model::error::InputError;
use crate::model::{ConversationKey, FetchError, Message, MessageId};
use crate::state::pagination::{FetchDirection, FetchRequest};
use std::path::PathBuf;

pub mod file;
pub mod stdin;
pub mod transcript;

pub use file::FileSource;
pub use stdin::StdinSource;
pub use transcript::TranscriptSource;

/// Unified input source for JSONL transcripts.
#[derive(Debug)]
pub enum InputSource {
    /// Transcript file given on the command line
    File(FileSource),
    /// Piped standard input
    Stdin(StdinSource<std::io::Stdin>),
}

impl InputSource {
    /// Read every line of the input.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for I/O errors.
    pub fn read_lines(self) -> Result<Vec<String>, InputError> {
        match self {
            InputSource::File(f) => Ok(f.into_lines()),
            InputSource::Stdin(s) => s.read_lines(),
        }
    }
}

/// Detect and create the appropriate input source.
///
/// # Logic:
/// 1. If a file path is provided: read that file
/// 2. Otherwise: read piped stdin
///
/// # Errors
///
/// Returns `InputError::NoInput` if no file is provided and stdin is a terminal.
/// Returns `InputError::FileNotFound` if the file does not exist.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(FileSource::new(path)?)),
        None => Ok(InputSource::Stdin(StdinSource::new()?)),
    }
}

/// Paged access to the messages of a conversation.
///
/// Pages are returned oldest-first.
pub trait DataSource {
    /// Up to `limit` messages created before `before`; the newest page when
    /// `before` is `None`.
    fn fetch_older(
        &self,
        key: &ConversationKey,
        before: Option<&MessageId>,
        limit: usize,
    ) -> Result<Vec<Message>, FetchError>;

    /// Up to `limit` messages created after `after`; the oldest page when
    /// `after` is `None`.
    fn fetch_newer(
        &self,
        key: &ConversationKey,
        after: Option<&MessageId>,
        limit: usize,
    ) -> Result<Vec<Message>, FetchError>;

    /// Up to `limit` messages around `id`, including it if it exists.
    fn fetch_around(
        &self,
        key: &ConversationKey,
        id: &MessageId,
        limit: usize,
    ) -> Result<Vec<Message>, FetchError>;

    /// Run a request issued by the session.
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Message>, FetchError> {
        match &request.direction {
            FetchDirection::Older => {
                self.fetch_older(&request.key, request.cursor.as_ref(), request.limit)
            }
            FetchDirection::Newer => {
                self.fetch_newer(&request.key, request.cursor.as_ref(), request.limit)
            }
            FetchDirection::Around(id) => self.fetch_around(&request.key, id, request.limit),
        }
    }
}
