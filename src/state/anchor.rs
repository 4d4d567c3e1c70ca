//! Scroll-anchor controller.
//!
//! Tracks which slot is pinned to the viewport and decides how the scroll
//! position must move when the list length changes underneath it.
//!
//! # State machine
//!
//! ```text
//! Unattached --attach--> AtLiveEdge | AnchoredAtOffset
//!     ^                        |  (scroll, length change, jump)
//!     +--------detach----------+
//! ```

use crate::model::{SessionContext, UserId};
use crate::view_state::scroll::{ScrollAnchor, ScrollTarget};
use crate::view_state::slots::SlotLayout;
use crate::view_state::types::{SlotIndex, ViewportEdge};
use crate::view_state::viewport::ViewportReading;

/// Where the controller believes the viewport is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnchorState {
    /// No conversation attached.
    #[default]
    Unattached,
    /// Showing the live-edge loader or the newest messages.
    AtLiveEdge,
    /// Pinned somewhere in history.
    AnchoredAtOffset(ScrollAnchor),
}

/// How the host should move to a new scroll target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Instantly, with no visible movement of the anchored content.
    Jump,
    /// With a short animation.
    Animate,
}

/// A scroll correction the host must apply after a length change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorAdjustment {
    /// Where to scroll.
    pub target: ScrollTarget,
    /// How to get there.
    pub transition: Transition,
}

/// What happened to the message window.
#[derive(Debug, Clone, Copy)]
pub struct LengthChange<'a> {
    /// Message count before the change.
    pub old_len: usize,
    /// Message count after the change.
    pub new_len: usize,
    /// Latest viewport reading, if the renderer reported one.
    pub viewport: Option<ViewportReading>,
    /// Author of the newest message after the change.
    pub newest_author: Option<&'a UserId>,
    /// Rows that landed in front of the anchored slot.
    pub inserted_ahead: usize,
    /// The window reaches the live end of the conversation.
    pub caught_up: bool,
}

/// Result of detaching from a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachOutcome {
    /// The window had fallen behind live data; reload it on the next attach.
    pub reload_required: bool,
}

/// Scroll-anchor state for one attached conversation.
#[derive(Debug, Clone)]
pub struct ScrollAnchorController {
    state: AnchorState,
    jump_leading_edge: f64,
}

impl ScrollAnchorController {
    /// `jump_leading_edge` is the fraction of the viewport left in front of
    /// a jump target.
    pub fn new(jump_leading_edge: f64) -> Self {
        Self {
            state: AnchorState::Unattached,
            jump_leading_edge,
        }
    }

    /// Current state
    pub fn state(&self) -> AnchorState {
        self.state
    }

    /// False between detach and the next attach.
    pub fn is_attached(&self) -> bool {
        self.state != AnchorState::Unattached
    }

    /// Following the live edge
    pub fn is_at_live_edge(&self) -> bool {
        self.state == AnchorState::AtLiveEdge
    }

    /// Reset for a newly attached conversation.
    ///
    /// With a target slot the anchor sits a little in from the viewport
    /// boundary, otherwise the list opens at the live edge.
    pub fn attach(&mut self, target: Option<SlotIndex>) -> ScrollTarget {
        match target {
            Some(slot) => self.anchor_to(slot),
            None => {
                self.state = AnchorState::AtLiveEdge;
                ScrollTarget::LiveEdge
            }
        }
    }

    /// Pin `slot` with the configured jump offset.
    pub fn anchor_to(&mut self, slot: SlotIndex) -> ScrollTarget {
        let anchor = ScrollAnchor::new(slot, self.jump_leading_edge);
        self.state = AnchorState::AnchoredAtOffset(anchor);
        tracing::debug!(slot = slot.get(), leading_edge = anchor.leading_edge, "anchored");
        ScrollTarget::Anchor(anchor)
    }

    /// Follow the user's scrolling.
    pub fn observe(&mut self, reading: &ViewportReading, layout: SlotLayout) {
        if !self.is_attached() {
            return;
        }
        let at_live_edge = match layout.live_edge() {
            ViewportEdge::Start => reading.first_visible <= layout.bottom_loader_slot(),
            ViewportEdge::End => reading.last_visible >= layout.top_loader_slot(),
        };
        self.state = if at_live_edge {
            AnchorState::AtLiveEdge
        } else {
            AnchorState::AnchoredAtOffset(reading.anchor())
        };
    }

    /// The slot pinned to the viewport: the stored anchor, or the first
    /// visible slot of `viewport` while at the live edge.
    pub fn pinned(&self, viewport: Option<ViewportReading>) -> Option<ScrollAnchor> {
        match self.state {
            AnchorState::Unattached => None,
            AnchorState::AtLiveEdge => viewport.map(|reading| reading.anchor()),
            AnchorState::AnchoredAtOffset(anchor) => Some(anchor),
        }
    }

    /// Decide how the viewport must move after the window changed length.
    ///
    /// - Own new message while caught up at the live edge: animate to the
    ///   live edge.
    /// - `k` rows inserted in front of the anchored slot: shift the anchor by
    ///   `k` slots with the same leading edge. In a reversed list a newest
    ///   message from the local user does not shift.
    /// - Anything else, including growth behind the anchor: no adjustment.
    pub fn on_length_changed(
        &mut self,
        change: &LengthChange<'_>,
        ctx: &SessionContext,
        layout: SlotLayout,
    ) -> Option<AnchorAdjustment> {
        if !self.is_attached() || change.new_len <= change.old_len {
            return None;
        }
        let own_newest = change.newest_author.is_some_and(|author| ctx.is_own(author));

        if own_newest && change.caught_up && self.is_at_live_edge() {
            tracing::debug!("own message at live edge, scrolling to live edge");
            return Some(AnchorAdjustment {
                target: ScrollTarget::LiveEdge,
                transition: Transition::Animate,
            });
        }

        let start_is_live = layout.live_edge() == ViewportEdge::Start;
        if change.inserted_ahead == 0 || (start_is_live && own_newest) {
            return None;
        }

        let base = self.pinned(change.viewport)?;
        let delta = isize::try_from(change.inserted_ahead).ok()?;
        let shifted = base.shifted(delta);
        self.state = AnchorState::AnchoredAtOffset(shifted);
        tracing::debug!(
            from = base.index.get(),
            to = shifted.index.get(),
            "anchor shifted past inserted rows"
        );

        Some(AnchorAdjustment {
            target: ScrollTarget::Anchor(shifted),
            transition: Transition::Jump,
        })
    }

    /// Leave the conversation.
    pub fn detach(&mut self, caught_up: bool) -> DetachOutcome {
        self.state = AnchorState::Unattached;
        DetachOutcome {
            reload_required: !caught_up,
        }
    }
}

impl Default for ScrollAnchorController {
    fn default() -> Self {
        Self::new(0.1)
    }
}
