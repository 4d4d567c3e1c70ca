//! Plain-text renderer.
//!
//! One string per list entry, suitable for printing a replayed conversation
//! to a terminal or comparing in snapshot tests.

use chrono::{FixedOffset, NaiveDate};

use crate::model::{ConversationKey, Message};
use crate::view_state::classifier::SpacingRules;

use super::hooks::{ListEnd, MessageItem, RenderHooks};

/// Spacing hints at or above this leave a blank line.
const BLANK_LINE_HINT: u16 = 8;

const DELETED_PLACEHOLDER: &str = "<message deleted>";

/// Default [`RenderHooks`] implementation producing plain text.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    time_zone: FixedOffset,
}

impl TextRenderer {
    /// Timestamps are printed in `time_zone`.
    pub fn new(time_zone: FixedOffset) -> Self {
        Self { time_zone }
    }

    fn time(&self, message: &Message) -> String {
        message
            .created_at()
            .with_timezone(&self.time_zone)
            .format("%H:%M")
            .to_string()
    }
}

impl RenderHooks for TextRenderer {
    type Output = String;

    fn message(&self, message: &Message, item: MessageItem) -> String {
        let marker = if item.highlighted { '>' } else { ' ' };
        let author = if item.own {
            "you".to_string()
        } else {
            message.author_id().to_string()
        };
        let body = if message.is_deleted() {
            DELETED_PLACEHOLDER
        } else {
            message.text()
        };

        let mut out = format!("{marker} [{}] {author}: {body}", self.time(message));
        if message.is_ephemeral() {
            out.push_str(" (only visible to you)");
        }
        if !message.is_deleted() {
            for attachment in message.attachments() {
                let label = attachment.title().or(attachment.url()).unwrap_or_default();
                out.push_str(&format!("\n      [{}] {label}", attachment.kind().label()));
            }
        }
        if message.has_replies() {
            let noun = if message.reply_count() == 1 {
                "reply"
            } else {
                "replies"
            };
            out.push_str(&format!("\n      {} {noun}", message.reply_count()));
        }
        out
    }

    fn system_message(&self, message: &Message, _item: MessageItem) -> String {
        format!("  ~ {} ~", message.text())
    }

    fn date_divider(&self, date: NaiveDate) -> String {
        format!("--- {} ---", date.format("%A, %B %-d, %Y"))
    }

    fn spacing(&self, rules: SpacingRules) -> Option<String> {
        (rules.spacing_hint() >= BLANK_LINE_HINT).then(String::new)
    }

    fn loading_indicator(&self, end: ListEnd) -> Option<String> {
        Some(match end {
            ListEnd::Historical => "  ... loading older messages".to_string(),
            ListEnd::Live => "  ... loading newer messages".to_string(),
        })
    }

    fn empty_state(&self) -> Option<String> {
        Some("  (no messages yet)".to_string())
    }

    fn error(&self, end: ListEnd, message: &str) -> Option<String> {
        let which = match end {
            ListEnd::Historical => "older",
            ListEnd::Live => "newer",
        };
        Some(format!("  ! could not load {which} messages: {message}"))
    }

    fn header(&self, key: &ConversationKey) -> Option<String> {
        Some(match key.thread_root() {
            Some(_) => format!("== thread in #{} ==", key.conversation_id()),
            None => format!("== #{} ==", key.conversation_id()),
        })
    }

    fn thread_parent(&self, parent: &Message) -> Option<String> {
        Some(format!(
            "  [{}] {}: {}",
            self.time(parent),
            parent.author_id(),
            parent.text()
        ))
    }

    fn thread_separator(&self, parent: &Message) -> Option<String> {
        let count = parent.reply_count();
        let noun = if count == 1 { "reply" } else { "replies" };
        Some(format!("--- {count} {noun} ---"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, AttachmentKind, MessageId, UserId};
    use crate::view_state::classifier::SpacingRule;
    use crate::view_state::types::SlotIndex;
    use chrono::{Offset, TimeZone, Utc};

    fn renderer() -> TextRenderer {
        TextRenderer::new(Utc.fix())
    }

    fn item() -> MessageItem {
        MessageItem {
            slot: SlotIndex::new(2),
            highlighted: false,
            own: false,
        }
    }

    fn msg(text: &str) -> Message {
        Message::new(
            MessageId::new("m1").unwrap(),
            UserId::new("ann").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap(),
            text,
        )
    }

    #[test]
    fn message_line_has_time_author_and_text() {
        assert_eq!(renderer().message(&msg("hi"), item()), "  [09:05] ann: hi");
    }

    #[test]
    fn own_and_highlighted_messages_are_marked() {
        let item = MessageItem {
            highlighted: true,
            own: true,
            ..item()
        };
        assert_eq!(renderer().message(&msg("hi"), item), "> [09:05] you: hi");
    }

    #[test]
    fn timestamps_follow_renderer_time_zone() {
        let east = TextRenderer::new(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(east.message(&msg("hi"), item()), "  [11:05] ann: hi");
    }

    #[test]
    fn deleted_message_hides_text_and_attachments() {
        let message = msg("secret")
            .with_deleted(true)
            .with_attachments(vec![Attachment::new(
                AttachmentKind::Image,
                Some("cat.png".to_string()),
                None,
            )]);
        assert_eq!(
            renderer().message(&message, item()),
            "  [09:05] ann: <message deleted>"
        );
    }

    #[test]
    fn attachments_and_replies_on_extra_lines() {
        let message = msg("look")
            .with_reply_count(2)
            .with_attachments(vec![Attachment::new(
                AttachmentKind::Image,
                Some("cat.png".to_string()),
                None,
            )]);
        insta::assert_snapshot!(renderer().message(&message, item()), @r"
          [09:05] ann: look
              [image] cat.png
              2 replies
        ");
    }

    #[test]
    fn date_divider_names_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(renderer().date_divider(date), "--- Friday, March 1, 2024 ---");
    }

    #[test]
    fn only_wide_spacing_leaves_a_blank_line() {
        let default: SpacingRules = [SpacingRule::Default].into_iter().collect();
        let author: SpacingRules = [SpacingRule::AuthorChange].into_iter().collect();
        let deleted: SpacingRules = [SpacingRule::Deleted].into_iter().collect();

        assert_eq!(renderer().spacing(default), None);
        assert_eq!(renderer().spacing(deleted), None);
        assert_eq!(renderer().spacing(author), Some(String::new()));
    }

    #[test]
    fn thread_separator_pluralizes() {
        let one = msg("root").with_reply_count(1);
        let many = msg("root").with_reply_count(3);
        assert_eq!(renderer().thread_separator(&one).unwrap(), "--- 1 reply ---");
        assert_eq!(renderer().thread_separator(&many).unwrap(), "--- 3 replies ---");
    }
}
