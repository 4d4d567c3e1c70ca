//! Conversation session: the per-conversation state that ties the store,
//! the anchor controller and the pagination coordinator together.
//!
//! The session never performs I/O. Operations return [`FetchRequest`]s; the
//! host runs them however it likes and reports back through
//! [`complete_fetch`](ConversationSession::complete_fetch) or
//! [`complete_jump`](ConversationSession::complete_jump). A result is only
//! applied if its ticket is still outstanding and its conversation key is the
//! one attached at the time the result arrives.
//!
//! Messages handed to the session (initial window, pages, live events) may
//! arrive in any order. The session keeps the window sorted by creation time
//! and lays it out newest-first when `reverse` is set.

use std::collections::HashMap;

use chrono::{FixedOffset, Offset, Utc};

use crate::model::{
    ConversationId, ConversationKey, FetchError, ListError, Message, MessageId, SessionContext,
};
use crate::view_state::classifier::LayoutClassifier;
use crate::view_state::scroll::ScrollTarget;
use crate::view_state::slots::{SlotKind, SlotLayout, VirtualItemSequence};
use crate::view_state::types::{SlotIndex, ViewportEdge};
use crate::view_state::viewport::ViewportReading;

use super::anchor::{
    AnchorAdjustment, AnchorState, DetachOutcome, LengthChange, ScrollAnchorController,
};
use super::message_store::MessageStore;
use super::pagination::{
    FetchDirection, FetchRequest, FetchTicket, PageResult, PageWindow, PaginationConfig,
    PaginationCoordinator,
};

/// Tunables shared by every conversation a session shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListOptions {
    /// Newest message at slot 0 (bottom-anchored chat list).
    pub reverse: bool,
    /// Page limit and lookahead.
    pub pagination: PaginationConfig,
    /// Viewport fraction left in front of a jump target.
    pub jump_leading_edge: f64,
    /// Time zone used to decide calendar days for date dividers.
    pub time_zone: FixedOffset,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            reverse: true,
            pagination: PaginationConfig::default(),
            jump_leading_edge: 0.1,
            time_zone: Utc.fix(),
        }
    }
}

/// Everything needed to show one conversation or thread.
#[derive(Debug, Clone)]
pub struct AttachRequest {
    /// Viewer and conversation key.
    pub ctx: SessionContext,
    /// Initial window of messages.
    pub window: Vec<Message>,
    /// Thread root shown in the parent-message slot.
    pub parent: Option<Message>,
    /// The window already contains the newest message of the conversation.
    pub caught_up: bool,
    /// Message to open at instead of the live edge.
    pub target: Option<MessageId>,
}

impl AttachRequest {
    /// Attach `window`, caught up, at the live edge.
    pub fn new(ctx: SessionContext, window: Vec<Message>) -> Self {
        Self {
            ctx,
            window,
            parent: None,
            caught_up: true,
            target: None,
        }
    }

    /// Show `parent` in the parent-message slot.
    pub fn with_parent(mut self, parent: Message) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Whether `window` already holds the newest message.
    pub fn with_caught_up(mut self, caught_up: bool) -> Self {
        self.caught_up = caught_up;
        self
    }

    /// Open at `target` instead of the live edge.
    pub fn with_target(mut self, target: MessageId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Result of attaching.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachOutcome {
    /// Initial scroll position.
    pub scroll: ScrollTarget,
    /// Out-of-band fetch for a target that is not in the initial window.
    pub fetch: Option<FetchRequest>,
}

/// Side effects the host must carry out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    /// Page requests to run, at most one per edge.
    pub fetches: Vec<FetchRequest>,
    /// Tell the read-tracking collaborator this message was seen.
    pub mark_read: Option<MessageId>,
    /// Scroll correction after the window changed.
    pub adjustment: Option<AnchorAdjustment>,
}

impl Effects {
    /// True when there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.fetches.is_empty() && self.mark_read.is_none() && self.adjustment.is_none()
    }
}

/// What became of a completed pagination fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The page was merged into the window.
    Applied {
        /// Edge the page was fetched for.
        edge: ViewportEdge,
        /// Messages that were not already loaded.
        added: usize,
        /// Scroll correction keeping the anchored content in place.
        adjustment: Option<AnchorAdjustment>,
        /// Requests triggered by re-checking the latest reading.
        follow_up: Vec<FetchRequest>,
    },
    /// The page was empty; `edge` will not be fetched again.
    Exhausted {
        /// Edge that is now closed.
        edge: ViewportEdge,
        /// Requests triggered by re-checking the latest reading.
        follow_up: Vec<FetchRequest>,
    },
    /// The request no longer belongs to the attached conversation.
    Stale,
    /// The fetch failed. Nothing is retried.
    Failed(ListError),
}

/// Result of a jump request.
#[derive(Debug, Clone, PartialEq)]
pub enum JumpOutcome {
    /// The target was already loaded.
    Anchored(ScrollTarget),
    /// The target must be fetched first; finish with
    /// [`ConversationSession::complete_jump`].
    Fetch(FetchRequest),
}

/// A change pushed by the live-update stream.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEvent {
    /// Conversation the change happened in.
    pub conversation: ConversationId,
    /// What changed.
    pub change: LiveChange,
}

/// Kind of live change.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveChange {
    /// Freshly sent message.
    New(Message),
    /// Replacement value for an already delivered message.
    Updated(Message),
    /// Hard removal.
    Deleted(MessageId),
}

/// What the anchored slot showed before the window changed.
#[derive(Debug, Clone, PartialEq)]
enum Pinned {
    Message { slot: SlotIndex, id: MessageId },
    /// Top loader, trailing header/footer or parent: moves with every row.
    Trailing,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingJump {
    ticket: FetchTicket,
    target: MessageId,
}

/// Per-attachment state that is thrown away on detach.
#[derive(Debug, Clone)]
struct Attached {
    ctx: SessionContext,
    parent: Option<Message>,
    pending_jump: Option<PendingJump>,
    highlighted: Option<MessageId>,
    newest_visible: bool,
    last_marked: Option<MessageId>,
}

/// One message list.
///
/// # Example
///
/// ```
/// # use chatlist::model::*;
/// # use chatlist::state::session::{AttachRequest, ConversationSession, ListOptions};
/// # use chrono::{TimeZone, Utc};
/// let ctx = SessionContext::new(
///     UserId::new("me").unwrap(),
///     ConversationKey::conversation(ConversationId::new("general").unwrap()),
/// );
/// let hello = Message::new(
///     MessageId::new("m1").unwrap(),
///     UserId::new("ann").unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
///     "hello",
/// );
///
/// let mut session = ConversationSession::new(ListOptions::default());
/// session.attach(AttachRequest::new(ctx, vec![hello]));
/// assert_eq!(session.sequence().slot_count(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct ConversationSession {
    options: ListOptions,
    classifier: LayoutClassifier,
    store: MessageStore,
    anchor: ScrollAnchorController,
    pagination: PaginationCoordinator,
    attached: Option<Attached>,
}

impl ConversationSession {
    /// Unattached session.
    pub fn new(options: ListOptions) -> Self {
        Self {
            classifier: LayoutClassifier::new(options.time_zone),
            store: MessageStore::new(),
            anchor: ScrollAnchorController::new(options.jump_leading_edge),
            pagination: PaginationCoordinator::new(options.pagination),
            attached: None,
            options,
        }
    }

    // ===== Accessors =====

    /// Options the session was built with
    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Loaded messages in layout order
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Separator classifier in the configured zone
    pub fn classifier(&self) -> &LayoutClassifier {
        &self.classifier
    }

    /// Slot layout for the current window
    pub fn layout(&self) -> SlotLayout {
        SlotLayout::new(self.store.len(), self.options.reverse)
    }

    /// The addressable item sequence over the current window.
    pub fn sequence(&self) -> VirtualItemSequence<'_> {
        VirtualItemSequence::new(&self.store, &self.classifier, self.options.reverse)
    }

    /// True while a conversation is shown
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Viewer and key of the attached conversation
    pub fn context(&self) -> Option<&SessionContext> {
        self.attached.as_ref().map(|attached| &attached.ctx)
    }

    /// Key of the attached conversation
    pub fn key(&self) -> Option<&ConversationKey> {
        self.context().map(SessionContext::key)
    }

    /// Thread root, when showing a thread
    pub fn parent(&self) -> Option<&Message> {
        self.attached.as_ref().and_then(|attached| attached.parent.as_ref())
    }

    /// Scroll-anchor state
    pub fn anchor_state(&self) -> AnchorState {
        self.anchor.state()
    }

    /// Per-edge request state
    pub fn pagination(&self) -> &PaginationCoordinator {
        &self.pagination
    }

    /// The window reaches the live end of the conversation
    pub fn is_caught_up(&self) -> bool {
        self.pagination.is_caught_up()
    }

    /// Message currently highlighted after a jump.
    pub fn highlighted(&self) -> Option<&MessageId> {
        self.attached
            .as_ref()
            .and_then(|attached| attached.highlighted.as_ref())
    }

    /// The host finished the highlight animation.
    pub fn finish_highlight(&mut self) {
        if let Some(attached) = self.attached.as_mut() {
            attached.highlighted = None;
        }
    }

    /// The newest loaded message.
    pub fn newest(&self) -> Option<&Message> {
        if self.options.reverse {
            self.store.first()
        } else {
            self.store.last()
        }
    }

    /// The oldest loaded message.
    pub fn oldest(&self) -> Option<&Message> {
        if self.options.reverse {
            self.store.last()
        } else {
            self.store.first()
        }
    }

    // ===== Lifecycle =====

    /// Show a conversation or thread. Replaces any previous attachment.
    pub fn attach(&mut self, request: AttachRequest) -> AttachOutcome {
        if self.attached.is_some() {
            self.detach();
        }

        let AttachRequest {
            ctx,
            window,
            parent,
            caught_up,
            target,
        } = request;

        let key = ctx.key().clone();
        let admitted: Vec<Message> = window.into_iter().filter(|m| admits(&key, m)).collect();
        self.store.replace(self.arrange(admitted));
        self.pagination.reset(caught_up);

        tracing::info!(
            %key,
            messages = self.store.len(),
            caught_up,
            jump_target = target.as_ref().map(MessageId::as_str),
            "conversation attached"
        );

        self.attached = Some(Attached {
            ctx,
            parent,
            pending_jump: None,
            highlighted: None,
            newest_visible: false,
            last_marked: None,
        });

        match target {
            None => AttachOutcome {
                scroll: self.anchor.attach(None),
                fetch: None,
            },
            Some(target) => match self.sequence().find_index_for_message_id(&target) {
                Some(slot) => {
                    let scroll = self.anchor.attach(Some(slot));
                    self.set_highlight(target);
                    AttachOutcome {
                        scroll,
                        fetch: None,
                    }
                }
                None => {
                    let scroll = self.anchor.attach(None);
                    AttachOutcome {
                        scroll,
                        fetch: Some(self.request_jump(key, target)),
                    }
                }
            },
        }
    }

    /// Stop showing the current conversation and drop all its state.
    pub fn detach(&mut self) -> DetachOutcome {
        let caught_up = self.pagination.is_caught_up();
        let outcome = self.anchor.detach(caught_up);
        if let Some(attached) = self.attached.take() {
            tracing::info!(
                key = %attached.ctx.key(),
                reload_required = outcome.reload_required,
                "conversation detached"
            );
        }
        self.store.clear();
        self.pagination.reset(true);
        outcome
    }

    /// Detach from the current conversation and attach to another.
    ///
    /// Outstanding fetches of the previous conversation become stale.
    pub fn switch_to(&mut self, request: AttachRequest) -> AttachOutcome {
        self.detach();
        self.attach(request)
    }

    // ===== Viewport =====

    /// Feed the latest viewport reading.
    pub fn observe_viewport(&mut self, reading: ViewportReading) -> Result<Effects, ListError> {
        let key = self.key().cloned().ok_or(ListError::NotAttached)?;
        let layout = self.layout();
        self.anchor.observe(&reading, layout);

        let (oldest, newest) = self.window_bounds();
        let window = PageWindow {
            key: &key,
            layout,
            oldest: oldest.as_ref(),
            newest: newest.as_ref(),
        };
        let fetches = self.pagination.observe(reading, &window);

        Ok(Effects {
            fetches,
            mark_read: self.update_read_state(&reading),
            adjustment: None,
        })
    }

    // ===== Fetch completion =====

    /// Apply the result of a pagination request.
    pub fn complete_fetch(
        &mut self,
        request: &FetchRequest,
        result: Result<Vec<Message>, FetchError>,
    ) -> FetchOutcome {
        if self.key() != Some(&request.key) {
            tracing::debug!(key = %request.key, ticket = %request.ticket, "dropping stale page");
            return FetchOutcome::Stale;
        }

        let layout = self.layout();
        let page_result = match &result {
            Ok(page) => PageResult::Received(page.len()),
            Err(_) => PageResult::Failed,
        };
        let Some(edge) = self.pagination.complete(request.ticket, page_result, layout) else {
            tracing::debug!(ticket = %request.ticket, "dropping page for unknown ticket");
            return FetchOutcome::Stale;
        };

        let page = match result {
            Ok(page) => page,
            Err(source) => {
                tracing::warn!(key = %request.key, ?edge, error = %source, "page fetch failed");
                return FetchOutcome::Failed(ListError::FetchFailure {
                    conversation: request.key.clone(),
                    source,
                });
            }
        };

        if page.is_empty() {
            return FetchOutcome::Exhausted {
                edge,
                follow_up: self.reevaluate(&request.key),
            };
        }

        let old_len = self.store.len();
        let pinned = self.pinned();
        self.merge(page);
        let added = self.store.len().saturating_sub(old_len);
        tracing::debug!(key = %request.key, ?edge, added, "page applied");

        let adjustment = self.adjust_anchor(old_len, pinned);
        FetchOutcome::Applied {
            edge,
            added,
            adjustment,
            follow_up: self.reevaluate(&request.key),
        }
    }

    // ===== Live updates =====

    /// Apply a change from the live-update stream.
    pub fn apply_live_event(&mut self, event: LiveEvent) -> Result<Effects, ListError> {
        let key = self.key().cloned().ok_or(ListError::NotAttached)?;
        if &event.conversation != key.conversation_id() {
            return Ok(Effects::default());
        }

        let old_len = self.store.len();
        let pinned = self.pinned();
        match event.change {
            LiveChange::New(message) => {
                if !admits(&key, &message) {
                    return Ok(Effects::default());
                }
                if !self.pagination.is_caught_up() {
                    tracing::trace!(id = %message.id(), "window behind live data, new message deferred");
                    return Ok(Effects::default());
                }
                self.merge(vec![message]);
            }
            LiveChange::Updated(message) => {
                if let Some(parent) = self.attached.as_mut().and_then(|a| a.parent.as_mut()) {
                    if parent.id() == message.id() {
                        *parent = message.clone();
                    }
                }
                if !self.store.contains(message.id()) {
                    return Ok(Effects::default());
                }
                if admits(&key, &message) {
                    self.merge(vec![message]);
                } else {
                    self.remove(message.id());
                }
            }
            LiveChange::Deleted(id) => {
                if !self.store.contains(&id) {
                    return Ok(Effects::default());
                }
                self.remove(&id);
            }
        }

        let adjustment = self.adjust_anchor(old_len, pinned);
        let mark_read = self
            .pagination
            .last_reading()
            .and_then(|reading| self.update_read_state(&reading));

        Ok(Effects {
            fetches: Vec::new(),
            mark_read,
            adjustment,
        })
    }

    // ===== Jumps =====

    /// Scroll to a message, fetching a window around it if it is not loaded.
    pub fn jump_to_message(&mut self, id: &MessageId) -> Result<JumpOutcome, ListError> {
        let key = self.key().cloned().ok_or(ListError::NotAttached)?;

        if let Some(slot) = self.sequence().find_index_for_message_id(id) {
            let scroll = self.anchor.anchor_to(slot);
            self.set_highlight(id.clone());
            return Ok(JumpOutcome::Anchored(scroll));
        }

        Ok(JumpOutcome::Fetch(self.request_jump(key, id.clone())))
    }

    /// Apply the result of a jump fetch.
    ///
    /// Returns `Ok(None)` for a stale result. If the target is not in the
    /// fetched page, or the fetch failed, the session is left unchanged.
    pub fn complete_jump(
        &mut self,
        request: &FetchRequest,
        result: Result<Vec<Message>, FetchError>,
    ) -> Result<Option<ScrollTarget>, ListError> {
        let Some(attached) = self.attached.as_mut() else {
            return Ok(None);
        };
        if attached.ctx.key() != &request.key {
            return Ok(None);
        }
        let target = match attached.pending_jump.take() {
            Some(pending) if pending.ticket == request.ticket => pending.target,
            other => {
                attached.pending_jump = other;
                return Ok(None);
            }
        };

        let page = result.map_err(|source| {
            tracing::warn!(key = %request.key, error = %source, "jump fetch failed");
            ListError::FetchFailure {
                conversation: request.key.clone(),
                source,
            }
        })?;

        let admitted: Vec<Message> = page
            .into_iter()
            .filter(|m| admits(&request.key, m))
            .collect();
        if !admitted.iter().any(|m| m.id() == &target) {
            tracing::info!(id = %target, "jump target not found");
            return Err(ListError::TargetNotFound(target));
        }

        self.store.replace(self.arrange(admitted));
        self.pagination.reset(false);
        let slot = self
            .sequence()
            .find_index_for_message_id(&target)
            .ok_or_else(|| ListError::TargetNotFound(target.clone()))?;
        let scroll = self.anchor.anchor_to(slot);
        self.set_highlight(target);
        Ok(Some(scroll))
    }

    // ===== Internals =====

    fn request_jump(&mut self, key: ConversationKey, target: MessageId) -> FetchRequest {
        let ticket = self.pagination.issue_ticket();
        if let Some(attached) = self.attached.as_mut() {
            attached.pending_jump = Some(PendingJump {
                ticket,
                target: target.clone(),
            });
        }
        tracing::debug!(%key, id = %target, %ticket, "jump fetch issued");
        FetchRequest {
            ticket,
            key,
            direction: FetchDirection::Around(target.clone()),
            cursor: Some(target),
            limit: self.options.pagination.page_limit,
        }
    }

    fn set_highlight(&mut self, id: MessageId) {
        if let Some(attached) = self.attached.as_mut() {
            attached.highlighted = Some(id);
        }
    }

    fn reevaluate(&mut self, key: &ConversationKey) -> Vec<FetchRequest> {
        let (oldest, newest) = self.window_bounds();
        let window = PageWindow {
            key,
            layout: self.layout(),
            oldest: oldest.as_ref(),
            newest: newest.as_ref(),
        };
        self.pagination.reevaluate(&window)
    }

    /// Ids of the oldest and newest loaded messages.
    fn window_bounds(&self) -> (Option<MessageId>, Option<MessageId>) {
        (
            self.oldest().map(|m| m.id().clone()),
            self.newest().map(|m| m.id().clone()),
        )
    }

    /// Capture the anchored item ahead of a window change.
    fn pinned(&self) -> Option<Pinned> {
        let anchor = self.anchor.pinned(self.pagination.last_reading())?;
        let layout = self.layout();
        match layout.kind_of(anchor.index)? {
            SlotKind::Message { index_in_store } => {
                self.store.get(index_in_store).map(|m| Pinned::Message {
                    slot: anchor.index,
                    id: m.id().clone(),
                })
            }
            _ if anchor.index >= layout.top_loader_slot() => Some(Pinned::Trailing),
            _ => None,
        }
    }

    /// Rows that landed in front of the item captured by [`Self::pinned`].
    fn inserted_ahead(&self, pinned: Option<Pinned>, old_len: usize) -> usize {
        match pinned {
            Some(Pinned::Message { slot, id }) => self
                .sequence()
                .find_index_for_message_id(&id)
                .map_or(0, |moved| moved.get().saturating_sub(slot.get())),
            Some(Pinned::Trailing) => self.store.len().saturating_sub(old_len),
            None => 0,
        }
    }

    fn adjust_anchor(&mut self, old_len: usize, pinned: Option<Pinned>) -> Option<AnchorAdjustment> {
        let ctx = self.context()?.clone();
        let newest_author = self.newest().map(|m| m.author_id().clone());
        let change = LengthChange {
            old_len,
            new_len: self.store.len(),
            viewport: self.pagination.last_reading(),
            newest_author: newest_author.as_ref(),
            inserted_ahead: self.inserted_ahead(pinned, old_len),
            caught_up: self.pagination.is_caught_up(),
        };
        let layout = self.layout();
        self.anchor.on_length_changed(&change, &ctx, layout)
    }

    /// Fire mark-read once per transition of the newest message into view.
    fn update_read_state(&mut self, reading: &ViewportReading) -> Option<MessageId> {
        let newest = self.newest().map(|m| m.id().clone());
        let newest_slot = newest
            .as_ref()
            .and_then(|id| self.sequence().find_index_for_message_id(id));
        let visible = self.pagination.is_caught_up()
            && newest_slot.is_some_and(|slot| reading.contains(slot));

        let attached = self.attached.as_mut()?;
        let fire = visible && (!attached.newest_visible || attached.last_marked != newest);
        attached.newest_visible = visible;
        if fire {
            attached.last_marked = newest.clone();
            tracing::debug!(id = ?newest.as_ref().map(MessageId::as_str), "mark read");
            newest
        } else {
            None
        }
    }

    /// Merge `incoming` into the window, replacing messages with equal ids.
    fn merge(&mut self, incoming: Vec<Message>) {
        let mut messages: Vec<Message> = self.store.iter().cloned().collect();
        messages.extend(incoming);
        let merged = self.arrange(messages);
        self.store.replace(merged);
    }

    fn remove(&mut self, id: &MessageId) {
        let remaining: Vec<Message> = self.store.iter().filter(|m| m.id() != id).cloned().collect();
        self.store.replace(remaining);
    }

    /// Keep the last copy of every id, sort chronologically, then flip for a
    /// reversed list.
    fn arrange(&self, messages: Vec<Message>) -> Vec<Message> {
        let mut by_id: HashMap<MessageId, Message> = HashMap::with_capacity(messages.len());
        for message in messages {
            by_id.insert(message.id().clone(), message);
        }
        let mut messages: Vec<Message> = by_id.into_values().collect();
        messages.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        if self.options.reverse {
            messages.reverse();
        }
        messages
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(ListOptions::default())
    }
}

/// Whether `message` belongs in the list shown for `key`.
///
/// A conversation lists top-level messages and thread replies that were also
/// sent to the channel; a thread lists only replies to its root.
pub fn admits(key: &ConversationKey, message: &Message) -> bool {
    match key.thread_root() {
        Some(root) => message.parent_id() == Some(root),
        None => !message.is_thread_reply() || message.visible_in_channel(),
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
