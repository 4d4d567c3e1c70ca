//! Semantic scroll anchor

use super::height_index::HeightIndex;
use super::types::SlotIndex;

/// Slot pinned to the viewport plus where its leading edge sits.
///
/// `leading_edge` is a fraction of the viewport extent, measured from the
/// viewport's leading edge (the slot-0 side) to the slot's leading edge:
/// `0.0` puts the slot flush against the viewport boundary, `0.1` leaves a
/// tenth of the viewport in front of it, negative values mean the slot
/// starts before the viewport.
///
/// An anchor survives list-length changes: shifting `index` by the number of
/// slots inserted in front of it keeps the same content on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnchor {
    /// Anchored item slot.
    pub index: SlotIndex,
    /// Viewport fraction in front of the slot.
    pub leading_edge: f64,
}

impl ScrollAnchor {
    /// Anchor `index` at `leading_edge`.
    pub fn new(index: SlotIndex, leading_edge: f64) -> Self {
        Self {
            index,
            leading_edge,
        }
    }

    /// Anchor flush against slot 0.
    pub fn origin() -> Self {
        Self::new(SlotIndex::new(0), 0.0)
    }

    /// Same leading edge, index moved by `delta` slots.
    pub fn shifted(&self, delta: isize) -> Self {
        Self::new(self.index.shifted(delta), self.leading_edge)
    }

    /// Resolve to a scroll offset from the slot-0 end.
    ///
    /// Clamped to `[0, max(0, total - viewport_extent)]` so the viewport is
    /// never blank. Slots past the end resolve against the end of the list.
    pub fn resolve(&self, heights: &HeightIndex, viewport_extent: u32) -> u64 {
        let max_offset = heights.total().saturating_sub(u64::from(viewport_extent));
        let slot_offset = heights.offset_of(self.index.get()) as f64;
        let lead = self.leading_edge * f64::from(viewport_extent);
        let offset = (slot_offset - lead).round();
        if offset <= 0.0 {
            0
        } else {
            (offset as u64).min(max_offset)
        }
    }
}

impl Default for ScrollAnchor {
    fn default() -> Self {
        Self::origin()
    }
}

/// Where the list should be scrolled to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScrollTarget {
    /// Show the newest messages.
    #[default]
    LiveEdge,
    /// Keep a specific slot at a specific position.
    Anchor(ScrollAnchor),
}

impl ScrollTarget {
    /// Resolve to a scroll offset from the slot-0 end.
    ///
    /// The live edge is slot 0 in a reversed list and the far end otherwise.
    pub fn resolve(&self, heights: &HeightIndex, viewport_extent: u32, reverse: bool) -> u64 {
        match self {
            Self::LiveEdge if reverse => 0,
            Self::LiveEdge => heights.total().saturating_sub(u64::from(viewport_extent)),
            Self::Anchor(anchor) => anchor.resolve(heights, viewport_extent),
        }
    }

    /// The pinned slot, unless following the live edge.
    pub fn anchor(&self) -> Option<ScrollAnchor> {
        match self {
            Self::LiveEdge => None,
            Self::Anchor(anchor) => Some(*anchor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights() -> HeightIndex {
        // slots: [0..10) [10..30) [30..55) [55..100) [100..200)
        HeightIndex::from_heights(&[10, 20, 25, 45, 100])
    }

    #[test]
    fn default_is_live_edge() {
        assert_eq!(ScrollTarget::default(), ScrollTarget::LiveEdge);
        assert_eq!(ScrollAnchor::default(), ScrollAnchor::origin());
    }

    #[test]
    fn flush_anchor_resolves_to_slot_offset() {
        let anchor = ScrollAnchor::new(SlotIndex::new(2), 0.0);
        assert_eq!(anchor.resolve(&heights(), 50), 30);
    }

    #[test]
    fn leading_edge_leaves_room_in_front_of_slot() {
        let anchor = ScrollAnchor::new(SlotIndex::new(3), 0.1);
        // 55 - 0.1 * 50
        assert_eq!(anchor.resolve(&heights(), 50), 50);
    }

    #[test]
    fn negative_leading_edge_scrolls_past_slot_start() {
        let anchor = ScrollAnchor::new(SlotIndex::new(1), -0.2);
        // 10 + 0.2 * 50
        assert_eq!(anchor.resolve(&heights(), 50), 20);
    }

    #[test]
    fn anchor_clamps_to_scrollable_range() {
        let near_start = ScrollAnchor::new(SlotIndex::new(0), 0.5);
        assert_eq!(near_start.resolve(&heights(), 50), 0);

        let past_end = ScrollAnchor::new(SlotIndex::new(40), 0.0);
        assert_eq!(past_end.resolve(&heights(), 50), 150);
    }

    #[test]
    fn viewport_larger_than_content_resolves_to_zero() {
        let anchor = ScrollAnchor::new(SlotIndex::new(3), 0.0);
        assert_eq!(anchor.resolve(&heights(), 500), 0);
        assert_eq!(ScrollTarget::LiveEdge.resolve(&heights(), 500, false), 0);
    }

    #[test]
    fn live_edge_depends_on_orientation() {
        assert_eq!(ScrollTarget::LiveEdge.resolve(&heights(), 50, true), 0);
        assert_eq!(ScrollTarget::LiveEdge.resolve(&heights(), 50, false), 150);
    }

    #[test]
    fn shifted_keeps_leading_edge() {
        let anchor = ScrollAnchor::new(SlotIndex::new(4), 0.25).shifted(3);
        assert_eq!(anchor, ScrollAnchor::new(SlotIndex::new(7), 0.25));
    }
}
