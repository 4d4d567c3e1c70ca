//! In-memory data source over a parsed transcript.

use std::collections::HashMap;

use crate::model::{ConversationId, ConversationKey, FetchError, Message, MessageId};
use crate::parser::TranscriptRecord;
use crate::state::session::admits;

use super::DataSource;

/// Every message of every conversation in a transcript, sorted by creation
/// time. Serves pages the way a chat backend would.
#[derive(Debug, Clone, Default)]
pub struct TranscriptSource {
    conversations: HashMap<ConversationId, Vec<Message>>,
}

impl TranscriptSource {
    /// Empty source with no conversations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parsed records. Later records replace earlier ones with the
    /// same id.
    pub fn from_records(records: impl IntoIterator<Item = TranscriptRecord>) -> Self {
        let mut source = Self::new();
        for record in records {
            source.insert(record.conversation, record.message);
        }
        source
    }

    /// Add or replace a message.
    pub fn insert(&mut self, conversation: ConversationId, message: Message) {
        let messages = self.conversations.entry(conversation).or_default();
        messages.retain(|m| m.id() != message.id());
        let position = messages.partition_point(|m| {
            (m.created_at(), m.id()) <= (message.created_at(), message.id())
        });
        messages.insert(position, message);
    }

    /// Conversation ids, sorted.
    pub fn conversations(&self) -> Vec<&ConversationId> {
        let mut ids: Vec<_> = self.conversations.keys().collect();
        ids.sort();
        ids
    }

    /// Any message of `conversation` by id, including thread replies.
    pub fn message(&self, conversation: &ConversationId, id: &MessageId) -> Option<&Message> {
        self.conversations
            .get(conversation)?
            .iter()
            .find(|m| m.id() == id)
    }

    /// Root message of a thread key.
    pub fn parent(&self, key: &ConversationKey) -> Option<&Message> {
        self.message(key.conversation_id(), key.thread_root()?)
    }

    /// Messages listed for `key`, oldest first.
    fn listed(&self, key: &ConversationKey) -> Result<Vec<&Message>, FetchError> {
        let messages = self
            .conversations
            .get(key.conversation_id())
            .ok_or_else(|| FetchError::UnknownConversation(key.conversation_id().to_string()))?;
        Ok(messages.iter().filter(|m| admits(key, m)).collect())
    }

    fn position(listed: &[&Message], id: &MessageId) -> Result<usize, FetchError> {
        listed
            .iter()
            .position(|m| m.id() == id)
            .ok_or_else(|| FetchError::UnknownCursor(id.clone()))
    }
}

impl DataSource for TranscriptSource {
    fn fetch_older(
        &self,
        key: &ConversationKey,
        before: Option<&MessageId>,
        limit: usize,
    ) -> Result<Vec<Message>, FetchError> {
        let listed = self.listed(key)?;
        let end = match before {
            Some(id) => Self::position(&listed, id)?,
            None => listed.len(),
        };
        let start = end.saturating_sub(limit);
        Ok(listed[start..end].iter().map(|m| (*m).clone()).collect())
    }

    fn fetch_newer(
        &self,
        key: &ConversationKey,
        after: Option<&MessageId>,
        limit: usize,
    ) -> Result<Vec<Message>, FetchError> {
        let listed = self.listed(key)?;
        let start = match after {
            Some(id) => Self::position(&listed, id)? + 1,
            None => 0,
        };
        let end = (start + limit).min(listed.len());
        Ok(listed[start..end].iter().map(|m| (*m).clone()).collect())
    }

    fn fetch_around(
        &self,
        key: &ConversationKey,
        id: &MessageId,
        limit: usize,
    ) -> Result<Vec<Message>, FetchError> {
        let listed = self.listed(key)?;
        let Some(center) = listed.iter().position(|m| m.id() == id) else {
            return Ok(Vec::new());
        };
        let limit = limit.max(1);
        let start = center.saturating_sub(limit / 2);
        let end = (start + limit).min(listed.len());
        let start = end.saturating_sub(limit);
        Ok(listed[start..end].iter().map(|m| (*m).clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use chrono::{Duration, TimeZone, Utc};

    fn id(raw: &str) -> MessageId {
        MessageId::new(raw).unwrap()
    }

    fn general() -> ConversationId {
        ConversationId::new("general").unwrap()
    }

    fn msg(raw_id: &str, minute: i64) -> Message {
        Message::new(
            id(raw_id),
            UserId::new("ann").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute),
            raw_id,
        )
    }

    /// m0..m9 one minute apart, inserted out of order.
    fn source() -> TranscriptSource {
        let mut source = TranscriptSource::new();
        for i in (0..10).rev() {
            source.insert(general(), msg(&format!("m{i}"), i));
        }
        source
    }

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.id().as_str()).collect()
    }

    fn key() -> ConversationKey {
        ConversationKey::conversation(general())
    }

    #[test]
    fn conversations_are_listed_in_sorted_order() {
        let mut source = source();
        let random = ConversationId::new("random").unwrap();
        let announcements = ConversationId::new("announcements").unwrap();
        source.insert(random.clone(), msg("r0", 0));
        source.insert(announcements.clone(), msg("a0", 0));

        assert_eq!(
            source.conversations(),
            vec![&announcements, &general(), &random]
        );
    }

    #[test]
    fn older_without_cursor_is_newest_page() {
        let page = source().fetch_older(&key(), None, 3).unwrap();
        assert_eq!(ids(&page), vec!["m7", "m8", "m9"]);
    }

    #[test]
    fn older_before_cursor() {
        let page = source().fetch_older(&key(), Some(&id("m4")), 3).unwrap();
        assert_eq!(ids(&page), vec!["m1", "m2", "m3"]);

        let short = source().fetch_older(&key(), Some(&id("m1")), 3).unwrap();
        assert_eq!(ids(&short), vec!["m0"]);

        assert!(source().fetch_older(&key(), Some(&id("m0")), 3).unwrap().is_empty());
    }

    #[test]
    fn newer_after_cursor() {
        let page = source().fetch_newer(&key(), Some(&id("m7")), 5).unwrap();
        assert_eq!(ids(&page), vec!["m8", "m9"]);
        assert!(source().fetch_newer(&key(), Some(&id("m9")), 5).unwrap().is_empty());
    }

    #[test]
    fn around_centers_on_target() {
        let page = source().fetch_around(&key(), &id("m5"), 4).unwrap();
        assert_eq!(ids(&page), vec!["m3", "m4", "m5", "m6"]);

        let at_end = source().fetch_around(&key(), &id("m9"), 4).unwrap();
        assert_eq!(ids(&at_end), vec!["m6", "m7", "m8", "m9"]);
    }

    #[test]
    fn around_unknown_target_is_empty() {
        assert!(source().fetch_around(&key(), &id("nope"), 4).unwrap().is_empty());
    }

    #[test]
    fn unknown_cursor_and_conversation_are_errors() {
        assert_eq!(
            source().fetch_older(&key(), Some(&id("nope")), 3),
            Err(FetchError::UnknownCursor(id("nope")))
        );
        let elsewhere = ConversationKey::conversation(ConversationId::new("random").unwrap());
        assert_eq!(
            source().fetch_newer(&elsewhere, None, 3),
            Err(FetchError::UnknownConversation("random".to_string()))
        );
    }

    #[test]
    fn thread_key_pages_only_replies() {
        let mut source = source();
        source.insert(general(), msg("r1", 3).with_parent(id("m2")));
        source.insert(general(), msg("r2", 4).with_parent(id("m2")));

        let thread = ConversationKey::thread(general(), id("m2"));
        let page = source.fetch_older(&thread, None, 10).unwrap();

        assert_eq!(ids(&page), vec!["r1", "r2"]);
        assert_eq!(source.parent(&thread).unwrap().id().as_str(), "m2");
        // hidden replies stay out of the conversation itself
        assert_eq!(source.fetch_older(&key(), None, 20).unwrap().len(), 10);
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut source = source();
        source.insert(general(), msg("m3", 3).with_deleted(true));

        let page = source.fetch_older(&key(), None, 20).unwrap();
        assert_eq!(page.len(), 10);
        assert!(page[3].is_deleted());
    }

    #[test]
    fn dispatch_follows_request_direction() {
        use crate::state::pagination::{FetchDirection, FetchRequest, PaginationCoordinator};

        let ticket = PaginationCoordinator::default().issue_ticket();
        let request = FetchRequest {
            ticket,
            key: key(),
            direction: FetchDirection::Around(id("m5")),
            cursor: Some(id("m5")),
            limit: 2,
        };
        let page = source().fetch(&request).unwrap();
        assert_eq!(ids(&page), vec!["m4", "m5"]);
    }
}
