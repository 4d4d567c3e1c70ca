//! Pagination coordinator.
//!
//! Decides when a viewport reading should turn into a directional fetch and
//! keeps at most one request in flight per edge.
//!
//! # Edges
//! - Historical edge: fetch older messages while more history may exist.
//! - Live edge: fetch newer messages only while the window is behind the live
//!   stream. Once caught up, live updates take over and live-edge fetches are
//!   suppressed.
//!
//! An empty page exhausts its edge for the rest of the conversation.
//! Completing a request never retries it; after a successful page the most
//! recent viewport reading is checked again, which may issue a follow-up.

use std::fmt;

use crate::model::{ConversationKey, MessageId};
use crate::view_state::slots::SlotLayout;
use crate::view_state::types::ViewportEdge;
use crate::view_state::viewport::ViewportReading;

/// Opaque identifier of one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    /// Raw ticket number, unique for the coordinator's lifetime.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which page to fetch relative to the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDirection {
    /// Messages created before the cursor.
    Older,
    /// Messages created after the cursor.
    Newer,
    /// A window centred on the given message (out-of-band jump).
    Around(MessageId),
}

/// A fetch the host should perform and report back with
/// [`ConversationSession::complete_fetch`](crate::state::session::ConversationSession::complete_fetch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Matches the result back to this request.
    pub ticket: FetchTicket,
    /// Conversation or thread the page belongs to.
    pub key: ConversationKey,
    /// Which page to fetch.
    pub direction: FetchDirection,
    /// Boundary message of the current window; `None` for an empty window.
    pub cursor: Option<MessageId>,
    /// Maximum number of messages to return.
    pub limit: usize,
}

/// What the coordinator needs to know about the current window.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow<'a> {
    /// Attached conversation.
    pub key: &'a ConversationKey,
    /// Slot layout of the current window.
    pub layout: SlotLayout,
    /// Cursor for an older page.
    pub oldest: Option<&'a MessageId>,
    /// Cursor for a newer page.
    pub newest: Option<&'a MessageId>,
}

/// Outcome of a pagination fetch as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageResult {
    /// The page arrived with this many messages (possibly zero).
    Received(usize),
    /// The fetch failed.
    Failed,
}

/// Tunables for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size requested from the data source.
    pub page_limit: usize,
    /// How many slots before a loader already count as "near the edge".
    pub lookahead: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_limit: 20,
            lookahead: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EdgeState {
    in_flight: Option<FetchTicket>,
    exhausted: bool,
}

/// Per-conversation pagination bookkeeping.
#[derive(Debug, Clone)]
pub struct PaginationCoordinator {
    config: PaginationConfig,
    start: EdgeState,
    end: EdgeState,
    /// The window reaches the live end of the conversation.
    caught_up: bool,
    last_reading: Option<ViewportReading>,
    /// Never reset, so tickets stay unique across conversation switches.
    next_ticket: u64,
}

impl PaginationCoordinator {
    /// Coordinator with no requests issued, caught up.
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            config,
            start: EdgeState::default(),
            end: EdgeState::default(),
            caught_up: true,
            last_reading: None,
            next_ticket: 1,
        }
    }

    /// Page limit and lookahead
    pub fn config(&self) -> PaginationConfig {
        self.config
    }

    /// Forget all per-conversation state. Ticket numbering continues.
    pub fn reset(&mut self, caught_up: bool) {
        self.start = EdgeState::default();
        self.end = EdgeState::default();
        self.caught_up = caught_up;
        self.last_reading = None;
    }

    /// The window reaches the live end of the conversation.
    pub fn is_caught_up(&self) -> bool {
        self.caught_up
    }

    /// Override the caught-up flag, e.g. after a reload.
    pub fn set_caught_up(&mut self, caught_up: bool) {
        self.caught_up = caught_up;
    }

    /// Whether a request is outstanding at `edge`.
    pub fn in_flight_at(&self, edge: ViewportEdge) -> bool {
        self.edge(edge).in_flight.is_some()
    }

    /// Whether an empty page closed `edge` for this conversation.
    pub fn is_exhausted(&self, edge: ViewportEdge) -> bool {
        self.edge(edge).exhausted
    }

    /// Reading most recently passed to [`Self::observe`].
    pub fn last_reading(&self) -> Option<ViewportReading> {
        self.last_reading
    }

    /// Allocate a ticket for a request the coordinator does not track itself.
    pub fn issue_ticket(&mut self) -> FetchTicket {
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Edges the reading is close to, in `[Start, End]` order.
    pub fn near_edges(&self, reading: &ViewportReading, layout: SlotLayout) -> Vec<ViewportEdge> {
        let mut edges = Vec::with_capacity(2);
        let start_limit = layout.bottom_loader_slot().get() + self.config.lookahead;
        if reading.first_visible.get() <= start_limit {
            edges.push(ViewportEdge::Start);
        }
        if reading.last_visible.get() + self.config.lookahead >= layout.top_loader_slot().get() {
            edges.push(ViewportEdge::End);
        }
        edges
    }

    /// Record `reading` as the latest viewport and fetch at every edge it is near.
    pub fn observe(&mut self, reading: ViewportReading, window: &PageWindow<'_>) -> Vec<FetchRequest> {
        self.last_reading = Some(reading);
        self.near_edges(&reading, window.layout)
            .into_iter()
            .filter_map(|edge| self.on_viewport_edge_reached(edge, window))
            .collect()
    }

    /// Re-check the latest recorded reading, e.g. after a page landed.
    pub fn reevaluate(&mut self, window: &PageWindow<'_>) -> Vec<FetchRequest> {
        match self.last_reading {
            Some(reading) => self.observe(reading, window),
            None => Vec::new(),
        }
    }

    /// Issue a fetch at `edge` unless one is outstanding or the edge is done.
    pub fn on_viewport_edge_reached(
        &mut self,
        edge: ViewportEdge,
        window: &PageWindow<'_>,
    ) -> Option<FetchRequest> {
        let state = self.edge(edge);
        if let Some(ticket) = state.in_flight {
            tracing::trace!(?edge, %ticket, "fetch already in flight");
            return None;
        }
        if state.exhausted {
            return None;
        }

        let (direction, cursor) = if edge == window.layout.live_edge() {
            if self.caught_up {
                return None;
            }
            (FetchDirection::Newer, window.newest.cloned())
        } else {
            (FetchDirection::Older, window.oldest.cloned())
        };

        let ticket = self.issue_ticket();
        self.edge_mut(edge).in_flight = Some(ticket);
        tracing::debug!(
            key = %window.key,
            ?edge,
            ?direction,
            %ticket,
            "pagination fetch issued"
        );

        Some(FetchRequest {
            ticket,
            key: window.key.clone(),
            direction,
            cursor,
            limit: self.config.page_limit,
        })
    }

    /// Clear the in-flight flag for `ticket` and record the outcome.
    ///
    /// Returns the edge the ticket belonged to, or `None` for a ticket this
    /// coordinator is not waiting on.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: PageResult,
        layout: SlotLayout,
    ) -> Option<ViewportEdge> {
        let edge = [ViewportEdge::Start, ViewportEdge::End]
            .into_iter()
            .find(|edge| self.edge(*edge).in_flight == Some(ticket))?;

        let is_live = edge == layout.live_edge();
        let state = self.edge_mut(edge);
        state.in_flight = None;

        if result == PageResult::Received(0) {
            state.exhausted = true;
            if is_live {
                self.caught_up = true;
            }
            tracing::debug!(?edge, %ticket, "edge exhausted");
        }
        Some(edge)
    }

    fn edge(&self, edge: ViewportEdge) -> &EdgeState {
        match edge {
            ViewportEdge::Start => &self.start,
            ViewportEdge::End => &self.end,
        }
    }

    fn edge_mut(&mut self, edge: ViewportEdge) -> &mut EdgeState {
        match edge {
            ViewportEdge::Start => &mut self.start,
            ViewportEdge::End => &mut self.end,
        }
    }
}

impl Default for PaginationCoordinator {
    fn default() -> Self {
        Self::new(PaginationConfig::default())
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
