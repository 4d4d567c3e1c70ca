//! Viewport readings: which slots are on screen and where.

use super::height_index::HeightIndex;
use super::scroll::ScrollAnchor;
use super::types::SlotIndex;

/// Snapshot of the viewport as reported by the renderer.
///
/// # Invariants
/// - `first_visible <= last_visible`
/// - `leading_edge` is the position of `first_visible`'s leading edge as a
///   fraction of the viewport extent (`<= 0.0` when measured)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportReading {
    /// First item slot with any visible pixel.
    pub first_visible: SlotIndex,
    /// Last item slot with any visible pixel.
    pub last_visible: SlotIndex,
    /// Leading-edge fraction of `first_visible`.
    pub leading_edge: f64,
}

impl ViewportReading {
    /// Create new reading.
    ///
    /// # Panics
    /// In debug builds, panics if first_visible > last_visible.
    pub fn new(first_visible: SlotIndex, last_visible: SlotIndex, leading_edge: f64) -> Self {
        debug_assert!(
            first_visible <= last_visible,
            "first_visible {first_visible:?} > last_visible {last_visible:?}"
        );
        Self {
            first_visible,
            last_visible,
            leading_edge,
        }
    }

    /// Measure the viewport from slot heights and a scroll offset.
    ///
    /// Returns `None` for an empty index or an offset past the end.
    pub fn measure(heights: &HeightIndex, scroll_offset: u64, viewport_extent: u32) -> Option<Self> {
        let first = heights.lower_bound(scroll_offset)?;
        let far_edge = scroll_offset + u64::from(viewport_extent.max(1)) - 1;
        let last = heights
            .lower_bound(far_edge)
            .unwrap_or_else(|| heights.len() - 1);

        let extent = f64::from(viewport_extent.max(1));
        let leading_edge = (heights.offset_of(first) as f64 - scroll_offset as f64) / extent;

        Some(Self::new(
            SlotIndex::new(first),
            SlotIndex::new(last.max(first)),
            leading_edge,
        ))
    }

    /// Number of visible slots.
    pub fn len(&self) -> usize {
        self.last_visible.get() - self.first_visible.get() + 1
    }

    /// Check if a specific slot is visible.
    pub fn contains(&self, slot: SlotIndex) -> bool {
        self.first_visible <= slot && slot <= self.last_visible
    }

    /// Iterate over visible slot indices.
    pub fn indices(&self) -> impl Iterator<Item = SlotIndex> {
        (self.first_visible.get()..=self.last_visible.get()).map(SlotIndex::new)
    }

    /// Anchor that reproduces this reading: the first visible slot where it is now.
    pub fn anchor(&self) -> ScrollAnchor {
        ScrollAnchor::new(self.first_visible, self.leading_edge)
    }
}
