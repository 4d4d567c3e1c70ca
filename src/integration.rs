//! Transcript replay: drives a [`ConversationSession`] against a
//! [`TranscriptSource`] the way an interactive host would.
//!
//! The replay attaches to one conversation (or thread), settles the
//! viewport at the live edge or the jump target, then scrolls toward
//! history, running every fetch the session asks for until the page budget
//! is spent or history is exhausted. No I/O happens here; the binary only
//! reads input and prints [`ReplayReport::lines`].

use std::collections::VecDeque;

use crate::model::{
    AppError, ConversationId, ConversationKey, ListError, MessageId, SessionContext, UserId,
};
use crate::source::{DataSource, TranscriptSource};
use crate::state::pagination::{FetchDirection, FetchRequest};
use crate::state::session::{
    AttachRequest, ConversationSession, Effects, FetchOutcome, ListOptions,
};
use crate::view::{render_range, ListStatus, TextRenderer};
use crate::view_state::scroll::ScrollTarget;
use crate::view_state::slots::SlotLayout;
use crate::view_state::types::{SlotIndex, ViewportEdge};
use crate::view_state::viewport::ViewportReading;

/// Item slots the simulated viewport shows at once.
pub const VIEWPORT_SLOTS: usize = 6;

/// What to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPlan {
    /// Conversation to show; the first one in the transcript when `None`.
    pub conversation: Option<ConversationId>,
    /// Show the replies of this message instead of the conversation.
    pub thread: Option<MessageId>,
    /// The local viewer.
    pub user: UserId,
    /// Open at this message instead of the live edge.
    pub target: Option<MessageId>,
    /// Maximum number of fetches to run after attaching.
    pub pages: usize,
}

/// What happened during a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Rendered list, top of the screen first.
    pub lines: Vec<String>,
    /// Fetches run against the source, including a jump fetch.
    pub fetches: usize,
    /// Mark-read signals in the order they fired.
    pub marked_read: Vec<MessageId>,
    /// Non-fatal list errors.
    pub errors: Vec<ListError>,
}

/// Pick the conversation to replay.
///
/// # Errors
///
/// Returns `AppError::UnknownConversation` if `requested` is not in the
/// transcript and `AppError::EmptyTranscript` if there is nothing to pick.
pub fn select_conversation(
    source: &TranscriptSource,
    requested: Option<ConversationId>,
) -> Result<ConversationId, AppError> {
    let available = source.conversations();
    match requested {
        Some(id) if available.contains(&&id) => Ok(id),
        Some(id) => Err(AppError::UnknownConversation(id.to_string())),
        None => available
            .first()
            .map(|id| (*id).clone())
            .ok_or(AppError::EmptyTranscript),
    }
}

/// Reading of `slots` item slots flush against `edge`.
pub fn edge_reading(layout: SlotLayout, edge: ViewportEdge, slots: usize) -> ViewportReading {
    let span = slots.max(1) - 1;
    let last_slot = layout.last_slot().get();
    let (first, last) = match edge {
        ViewportEdge::Start => (0, span.min(last_slot)),
        ViewportEdge::End => (last_slot.saturating_sub(span), last_slot),
    };
    ViewportReading::new(SlotIndex::new(first), SlotIndex::new(last), 0.0)
}

/// Reading that shows `target` after the session settled on it.
fn settled_reading(layout: SlotLayout, target: ScrollTarget) -> ViewportReading {
    match target.anchor() {
        Some(anchor) => {
            let last_slot = layout.last_slot().get();
            let first = anchor.index.get().min(last_slot);
            let last = (first + VIEWPORT_SLOTS - 1).min(last_slot);
            ViewportReading::new(SlotIndex::new(first), SlotIndex::new(last), anchor.leading_edge)
        }
        None => edge_reading(layout, layout.live_edge(), VIEWPORT_SLOTS),
    }
}

/// Replay `plan` against `source`.
///
/// # Errors
///
/// Returns `AppError` if the conversation cannot be selected or the
/// initial window cannot be loaded. Failures after attaching are collected
/// in [`ReplayReport::errors`].
pub fn replay(
    source: &TranscriptSource,
    options: ListOptions,
    plan: &ReplayPlan,
) -> Result<ReplayReport, AppError> {
    let conversation = select_conversation(source, plan.conversation.clone())?;
    let key = match &plan.thread {
        Some(root) => ConversationKey::thread(conversation, root.clone()),
        None => ConversationKey::conversation(conversation),
    };

    let window = source
        .fetch_older(&key, None, options.pagination.page_limit)
        .map_err(|source| ListError::FetchFailure {
            conversation: key.clone(),
            source,
        })?;

    let ctx = SessionContext::new(plan.user.clone(), key.clone());
    let mut request = AttachRequest::new(ctx, window);
    if let Some(parent) = source.parent(&key) {
        request = request.with_parent(parent.clone());
    }
    if let Some(target) = &plan.target {
        request = request.with_target(target.clone());
    }

    let mut session = ConversationSession::new(options);
    let mut report = ReplayReport::default();
    let mut failed_edge = None;

    let outcome = session.attach(request);
    let mut scroll = outcome.scroll;
    if let Some(jump) = outcome.fetch {
        report.fetches += 1;
        match session.complete_jump(&jump, source.fetch(&jump)) {
            Ok(Some(target)) => scroll = target,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "jump during replay failed");
                report.errors.push(err);
            }
        }
    }

    let effects = session.observe_viewport(settled_reading(session.layout(), scroll))?;
    let mut pending: VecDeque<FetchRequest> = collect(&mut report, effects).into();
    let mut budget = plan.pages;

    'scroll: loop {
        while let Some(request) = pending.front().cloned() {
            // requests past the budget stay in flight and render as loaders
            if budget == 0 {
                break 'scroll;
            }
            pending.pop_front();
            budget -= 1;
            report.fetches += 1;

            let edge = edge_for(session.layout(), &request.direction);
            match session.complete_fetch(&request, source.fetch(&request)) {
                FetchOutcome::Applied { follow_up, .. }
                | FetchOutcome::Exhausted { follow_up, .. } => pending.extend(follow_up),
                FetchOutcome::Stale => {}
                FetchOutcome::Failed(err) => {
                    tracing::warn!(error = %err, "page fetch during replay failed");
                    failed_edge = Some((edge, err.to_string()));
                    report.errors.push(err);
                }
            }
        }

        let layout = session.layout();
        let reading = edge_reading(layout, layout.historical_edge(), VIEWPORT_SLOTS);
        let effects = session.observe_viewport(reading)?;
        let fetches = collect(&mut report, effects);
        if fetches.is_empty() {
            break;
        }
        pending.extend(fetches);
    }

    tracing::info!(
        key = %key,
        fetches = report.fetches,
        messages = session.store().len(),
        "replay finished"
    );

    let mut status = ListStatus::of(&session);
    if let Some((edge, message)) = failed_edge {
        status = status.with_error(edge, message);
    }
    report.lines = render_lines(&session, &status);
    Ok(report)
}

/// Render the whole list, top of the screen first.
pub fn render_lines(session: &ConversationSession, status: &ListStatus) -> Vec<String> {
    let renderer = TextRenderer::new(session.classifier().time_zone());
    let layout = session.layout();
    let mut lines: Vec<String> =
        render_range(session, &renderer, status, SlotIndex::new(0), layout.last_slot())
            .into_iter()
            .map(|rendered| rendered.output)
            .collect();
    // slot 0 is the bottom of the screen in a reversed list
    if layout.is_reverse() {
        lines.reverse();
    }
    lines
}

fn collect(report: &mut ReplayReport, effects: Effects) -> Vec<FetchRequest> {
    report.marked_read.extend(effects.mark_read);
    effects.fetches
}

fn edge_for(layout: SlotLayout, direction: &FetchDirection) -> ViewportEdge {
    match direction {
        FetchDirection::Newer => layout.live_edge(),
        FetchDirection::Older | FetchDirection::Around(_) => layout.historical_edge(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use chrono::{Duration, TimeZone, Utc};

    fn general() -> ConversationId {
        ConversationId::new("general").unwrap()
    }

    fn msg(id: &str, minute: i64) -> Message {
        Message::new(
            MessageId::new(id).unwrap(),
            UserId::new("ann").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute),
            format!("text {id}"),
        )
    }

    fn source(count: i64) -> TranscriptSource {
        let mut source = TranscriptSource::new();
        for i in 0..count {
            source.insert(general(), msg(&format!("m{i}"), i * 10));
        }
        source
    }

    fn plan(pages: usize) -> ReplayPlan {
        ReplayPlan {
            conversation: None,
            thread: None,
            user: UserId::new("me").unwrap(),
            target: None,
            pages,
        }
    }

    fn options(page_limit: usize) -> ListOptions {
        let mut options = ListOptions::default();
        options.pagination.page_limit = page_limit;
        options
    }

    #[test]
    fn select_conversation_defaults_to_first() {
        let mut source = source(1);
        source.insert(ConversationId::new("alpha").unwrap(), msg("a", 0));

        assert_eq!(select_conversation(&source, None).unwrap().as_str(), "alpha");
        assert_eq!(
            select_conversation(&source, Some(general())).unwrap(),
            general()
        );
        assert!(matches!(
            select_conversation(&source, Some(ConversationId::new("nope").unwrap())),
            Err(AppError::UnknownConversation(name)) if name == "nope"
        ));
        assert!(matches!(
            select_conversation(&TranscriptSource::new(), None),
            Err(AppError::EmptyTranscript)
        ));
    }

    #[test]
    fn edge_reading_clamps_to_layout() {
        let layout = SlotLayout::new(2, true);
        let start = edge_reading(layout, ViewportEdge::Start, 4);
        assert_eq!((start.first_visible.get(), start.last_visible.get()), (0, 3));

        let end = edge_reading(layout, ViewportEdge::End, 20);
        assert_eq!((end.first_visible.get(), end.last_visible.get()), (0, 6));
    }

    #[test]
    fn replay_pages_through_whole_history() {
        let report = replay(&source(12), options(4), &plan(10)).unwrap();

        let message_lines = report.lines.iter().filter(|l| l.contains("text m")).count();
        assert_eq!(message_lines, 12);
        assert!(report.errors.is_empty());
        assert_eq!(report.marked_read, vec![MessageId::new("m11").unwrap()]);
        // two pages of older messages plus one empty page
        assert_eq!(report.fetches, 3);
    }

    #[test]
    fn replay_respects_page_budget() {
        let report = replay(&source(12), options(4), &plan(1)).unwrap();

        let message_lines = report.lines.iter().filter(|l| l.contains("text m")).count();
        assert_eq!(message_lines, 8);
        assert_eq!(report.fetches, 1);
        assert!(report
            .lines
            .iter()
            .any(|l| l.contains("loading older messages")));
    }

    #[test]
    fn reversed_replay_prints_oldest_first() {
        let report = replay(&source(3), options(20), &plan(0)).unwrap();
        let messages: Vec<&String> = report.lines.iter().filter(|l| l.contains("text m")).collect();

        assert!(messages[0].contains("text m0"));
        assert!(messages[2].contains("text m2"));
        assert_eq!(report.lines.first().map(String::as_str), Some("== #general =="));
    }

    #[test]
    fn replay_with_target_outside_window_jumps() {
        let mut plan = plan(0);
        plan.target = Some(MessageId::new("m1").unwrap());

        let report = replay(&source(12), options(4), &plan).unwrap();

        assert_eq!(report.fetches, 1);
        assert!(report.lines.iter().any(|l| l.starts_with("> ") && l.contains("text m1")));
        // window is behind live data after a jump, nothing is marked read
        assert!(report.marked_read.is_empty());
    }

    #[test]
    fn replay_with_unknown_target_reports_error() {
        let mut plan = plan(0);
        plan.target = Some(MessageId::new("ghost").unwrap());

        let report = replay(&source(3), options(20), &plan).unwrap();

        assert_eq!(
            report.errors,
            vec![ListError::TargetNotFound(MessageId::new("ghost").unwrap())]
        );
    }
}
