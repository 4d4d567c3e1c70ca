//! Property-based tests for the list invariants.
//!
//! Tests validate:
//! 1. Identifier constructors reject empty strings
//! 2. slot_count(n) == n + 5 and resolution is total and idempotent
//! 3. classify is deterministic and date dividers take precedence
//! 4. Growth at the start edge shifts the anchor from i to i + k
//! 5. At most one fetch is outstanding per edge

use chatlist::model::{
    ConversationId, ConversationKey, Message, MessageId, SessionContext, UserId,
};
use chatlist::state::pagination::{FetchDirection, PaginationConfig};
use chatlist::state::session::{AttachRequest, ConversationSession, FetchOutcome, ListOptions};
use chatlist::state::{MessageStore, Transition};
use chatlist::view_state::classifier::{LayoutClassifier, Separator};
use chatlist::view_state::scroll::ScrollTarget;
use chatlist::view_state::slots::{slot_count, VirtualItemSequence};
use chatlist::view_state::types::{SlotIndex, ViewportEdge};
use chatlist::view_state::viewport::ViewportReading;
use chrono::{Duration, FixedOffset, TimeZone, Utc};
use proptest::prelude::*;

// ===== Test Helpers =====

fn msg(index: usize, author: u8, minutes: i64) -> Message {
    Message::new(
        MessageId::new(format!("m{index:04}")).unwrap(),
        UserId::new(format!("user{author}")).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
        "text",
    )
}

/// Messages with strictly increasing timestamps built from gaps in minutes.
fn timeline(gaps: &[(u8, i64)]) -> Vec<Message> {
    let mut minutes = 0;
    gaps.iter()
        .enumerate()
        .map(|(index, (author, gap))| {
            minutes += gap;
            msg(index, *author, minutes)
        })
        .collect()
}

fn gaps_strategy(max_len: usize) -> impl Strategy<Value = Vec<(u8, i64)>> {
    prop::collection::vec((0u8..3, 0i64..3000), 0..max_len)
}

fn ctx() -> SessionContext {
    SessionContext::new(
        UserId::new("me").unwrap(),
        ConversationKey::conversation(ConversationId::new("general").unwrap()),
    )
}

// ===== Property 1: Identifier Constructors =====

proptest! {
    #[test]
    fn message_id_rejects_only_empty_strings(s in any::<String>()) {
        prop_assert_eq!(MessageId::new(s.clone()).is_ok(), !s.is_empty());
    }

    #[test]
    fn user_id_rejects_only_empty_strings(s in any::<String>()) {
        prop_assert_eq!(UserId::new(s.clone()).is_ok(), !s.is_empty());
    }

    #[test]
    fn conversation_id_rejects_only_empty_strings(s in any::<String>()) {
        prop_assert_eq!(ConversationId::new(s.clone()).is_ok(), !s.is_empty());
    }
}

// ===== Property 2: Slot Layout =====

proptest! {
    #[test]
    fn slot_count_is_message_count_plus_five(n in 0usize..10_000) {
        prop_assert_eq!(slot_count(n), n + 5);
    }

    #[test]
    fn resolution_is_total_and_idempotent(
        gaps in gaps_strategy(40),
        reverse in any::<bool>(),
    ) {
        let mut store = MessageStore::new();
        store.replace(timeline(&gaps));
        let classifier = LayoutClassifier::utc();
        let sequence = VirtualItemSequence::new(&store, &classifier, reverse);

        prop_assert_eq!(sequence.slot_count(), store.len() + 5);
        prop_assert_eq!(sequence.flat_len(), 2 * sequence.slot_count() - 1);

        for slot in 0..sequence.slot_count() {
            let slot = SlotIndex::new(slot);
            let first = sequence.resolve(slot);
            prop_assert!(first.is_some());
            prop_assert_eq!(first, sequence.resolve(slot));
        }
        for flat in 0..sequence.flat_len() {
            let first = sequence.resolve_flat(flat);
            prop_assert!(first.is_some(), "flat position {} unresolved", flat);
            prop_assert_eq!(first, sequence.resolve_flat(flat));
        }
        prop_assert!(sequence.resolve(SlotIndex::new(sequence.slot_count())).is_none());
        prop_assert!(sequence.resolve_flat(sequence.flat_len()).is_none());
    }

    #[test]
    fn every_message_is_found_at_its_slot(gaps in gaps_strategy(40), reverse in any::<bool>()) {
        let mut store = MessageStore::new();
        store.replace(timeline(&gaps));
        let classifier = LayoutClassifier::utc();
        let sequence = VirtualItemSequence::new(&store, &classifier, reverse);

        for (position, message) in store.iter().enumerate() {
            prop_assert_eq!(
                sequence.find_index_for_message_id(message.id()),
                Some(SlotIndex::new(position + 2))
            );
        }
    }
}

// ===== Property 3: Classification =====

proptest! {
    #[test]
    fn classify_is_deterministic_regardless_of_call_order(
        gaps in prop::collection::vec((0u8..3, 0i64..3000), 2..30),
        offset_hours in -12i32..=14,
    ) {
        let messages = timeline(&gaps);
        let classifier = LayoutClassifier::new(FixedOffset::east_opt(offset_hours * 3600).unwrap());

        let forward: Vec<Separator> = messages
            .windows(2)
            .map(|pair| classifier.classify(&pair[0], &pair[1]))
            .collect();
        let mut backward: Vec<Separator> = messages
            .windows(2)
            .rev()
            .map(|pair| classifier.classify(&pair[0], &pair[1]))
            .collect();
        backward.reverse();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn day_boundary_always_yields_date_divider(
        gaps in prop::collection::vec((0u8..3, 0i64..3000), 2..30),
    ) {
        let messages = timeline(&gaps);
        let classifier = LayoutClassifier::utc();

        for pair in messages.windows(2) {
            let crosses = classifier.calendar_day(&pair[0]) != classifier.calendar_day(&pair[1]);
            let separator = classifier.classify(&pair[0], &pair[1]);
            match separator {
                Separator::DateDivider(_) => prop_assert!(crosses),
                Separator::Spacing(rules) => {
                    prop_assert!(!crosses);
                    prop_assert!(!rules.is_empty());
                }
            }
        }
    }
}

// ===== Property 4: Anchor Stability =====

proptest! {
    #[test]
    fn growth_at_start_edge_shifts_anchor_by_k(
        n in 20usize..60,
        k in 1usize..15,
        i in 2usize..=7,
        leading_edge in -0.9f64..0.0,
    ) {
        let all: Vec<Message> = (0..n + k).map(|index| msg(index, 1, index as i64)).collect();
        let options = ListOptions {
            pagination: PaginationConfig { page_limit: k, lookahead: 6 },
            ..ListOptions::default()
        };
        let mut session = ConversationSession::new(options);
        session.attach(AttachRequest::new(ctx(), all[..n].to_vec()).with_caught_up(false));

        let reading = ViewportReading::new(SlotIndex::new(i), SlotIndex::new(i + 3), leading_edge);
        let effects = session.observe_viewport(reading).unwrap();
        let newer = effects
            .fetches
            .iter()
            .find(|request| request.direction == FetchDirection::Newer)
            .cloned();
        prop_assert!(newer.is_some());
        let newer = newer.unwrap();

        let outcome = session.complete_fetch(&newer, Ok(all[n..].to_vec()));
        match outcome {
            FetchOutcome::Applied { edge, added, adjustment, .. } => {
                prop_assert_eq!(edge, ViewportEdge::Start);
                prop_assert_eq!(added, k);
                let adjustment = adjustment.unwrap();
                prop_assert_eq!(adjustment.transition, Transition::Jump);
                match adjustment.target {
                    ScrollTarget::Anchor(anchor) => {
                        prop_assert_eq!(anchor.index, SlotIndex::new(i + k));
                        prop_assert_eq!(anchor.leading_edge, leading_edge);
                    }
                    ScrollTarget::LiveEdge => prop_assert!(false, "expected anchored target"),
                }
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }
}

// ===== Property 5: One Fetch Per Edge =====

proptest! {
    #[test]
    fn overlapping_edge_signals_keep_one_fetch_per_edge(
        n in 0usize..30,
        readings in prop::collection::vec((0usize..40, 0usize..8), 1..20),
    ) {
        let window: Vec<Message> = (0..n).map(|index| msg(index, 1, index as i64)).collect();
        let mut session = ConversationSession::default();
        session.attach(AttachRequest::new(ctx(), window).with_caught_up(false));

        let mut issued = Vec::new();
        for (first, len) in readings {
            let last_slot = session.layout().last_slot().get();
            let first = first.min(last_slot);
            let last = (first + len).min(last_slot);
            let reading = ViewportReading::new(SlotIndex::new(first), SlotIndex::new(last), 0.0);
            issued.extend(session.observe_viewport(reading).unwrap().fetches);
        }

        let older = issued.iter().filter(|r| r.direction == FetchDirection::Older).count();
        let newer = issued.iter().filter(|r| r.direction == FetchDirection::Newer).count();
        prop_assert!(older <= 1, "older fetches: {}", older);
        prop_assert!(newer <= 1, "newer fetches: {}", newer);
    }
}
