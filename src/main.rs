//! chatlist - replay a chat transcript through the message-list engine

use chatlist::integration::{replay, ReplayPlan};
use chatlist::model::{AppError, ConversationId, MessageId, UserId};
use chatlist::source::TranscriptSource;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Replay a JSONL chat transcript: attach to a conversation, scroll back
/// through its history page by page and print the resulting list.
#[derive(Parser, Debug)]
#[command(name = "chatlist")]
#[command(version)]
#[command(about = "Replay a JSONL chat transcript through the virtualized message list")]
pub struct Args {
    /// Path to JSONL transcript (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Conversation to show (defaults to the first one in the transcript)
    #[arg(short, long, value_parser = parse_conversation_id)]
    pub conversation: Option<ConversationId>,

    /// Show the replies of this message instead of the conversation
    #[arg(long, value_parser = parse_message_id)]
    pub thread: Option<MessageId>,

    /// The local viewer; their messages are shown as "you"
    #[arg(short, long, default_value = "me", value_parser = parse_user_id)]
    pub user: UserId,

    /// Open at this message instead of the newest one
    #[arg(short, long, value_parser = parse_message_id)]
    pub target: Option<MessageId>,

    /// Maximum number of pages to fetch while scrolling back
    #[arg(short, long, default_value = "3")]
    pub pages: usize,

    /// Oldest message at the top and newest at the bottom of the sequence
    #[arg(long)]
    pub chronological: bool,

    /// Messages per page (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_limit: Option<u32>,

    /// Fail on the first malformed transcript line instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_conversation_id(raw: &str) -> Result<ConversationId, String> {
    ConversationId::new(raw).map_err(|e| e.to_string())
}

fn parse_message_id(raw: &str) -> Result<MessageId, String> {
    MessageId::new(raw).map_err(|e| e.to_string())
}

fn parse_user_id(raw: &str) -> Result<UserId, String> {
    UserId::new(raw).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let reverse_override = args.chronological.then_some(false);
    let page_limit_override = args.page_limit.map(|limit| limit as usize);
    let config = chatlist::config::resolve(args.config.clone(), reverse_override, page_limit_override)?;

    chatlist::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let options = config.list_options()?;

    let lines = chatlist::source::detect_input_source(args.file.clone())?.read_lines()?;
    let (records, malformed) = chatlist::parser::parse_transcript(&lines);

    if let Some(first) = malformed.first() {
        if args.strict {
            if let Err(err) = chatlist::parser::parse_record(first.raw_line(), first.line_number()) {
                return Err(err.into());
            }
        }
        eprintln!(
            "warning: skipped {} malformed line(s), first at line {}: {}",
            malformed.len(),
            first.line_number(),
            first.error_message()
        );
    }

    let source = TranscriptSource::from_records(records);
    let plan = ReplayPlan {
        conversation: args.conversation,
        thread: args.thread,
        user: args.user,
        target: args.target,
        pages: args.pages,
    };

    let report = replay(&source, options, &plan)?;
    for line in &report.lines {
        println!("{line}");
    }
    for error in &report.errors {
        eprintln!("warning: {error}");
    }
    info!(
        fetches = report.fetches,
        marked_read = report.marked_read.len(),
        "replay printed"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["chatlist", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["chatlist", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["chatlist"]);
        assert_eq!(args.file, None);
        assert_eq!(args.conversation, None);
        assert_eq!(args.thread, None);
        assert_eq!(args.user.as_str(), "me");
        assert_eq!(args.target, None);
        assert_eq!(args.pages, 3);
        assert!(!args.chronological);
        assert_eq!(args.page_limit, None);
        assert!(!args.strict);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_file_path_populates_file_field() {
        let args = Args::parse_from(["chatlist", "chat.jsonl"]);
        assert_eq!(args.file, Some(PathBuf::from("chat.jsonl")));
    }

    #[test]
    fn test_ids_are_parsed() {
        let args = Args::parse_from([
            "chatlist",
            "-c",
            "general",
            "-u",
            "ann",
            "-t",
            "m42",
            "--thread",
            "m1",
        ]);
        assert_eq!(args.conversation.unwrap().as_str(), "general");
        assert_eq!(args.user.as_str(), "ann");
        assert_eq!(args.target.unwrap().as_str(), "m42");
        assert_eq!(args.thread.unwrap().as_str(), "m1");
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = Args::try_parse_from(["chatlist", "--target", ""]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_page_limit_rejects_zero() {
        let result = Args::try_parse_from(["chatlist", "--page-limit", "0"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_combined_flags() {
        let args = Args::parse_from([
            "chatlist",
            "chat.jsonl",
            "-p",
            "5",
            "--chronological",
            "--page-limit",
            "50",
            "--strict",
            "--config",
            "/custom/config.toml",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("chat.jsonl")));
        assert_eq!(args.pages, 5);
        assert!(args.chronological);
        assert_eq!(args.page_limit, Some(50));
        assert!(args.strict);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_cli_flags_flow_through_config_precedence_chain() {
        use chatlist::config::{apply_cli_overrides, merge_config, ConfigFile};

        let file = ConfigFile {
            reverse: Some(true),
            page_limit: Some(10),
            ..ConfigFile::default()
        };
        let args = Args::parse_from(["chatlist", "--chronological", "--page-limit", "7"]);

        let resolved = apply_cli_overrides(
            merge_config(Some(file)),
            args.chronological.then_some(false),
            args.page_limit.map(|limit| limit as usize),
        );

        assert!(!resolved.reverse);
        assert_eq!(resolved.page_limit, 7);
    }
}
