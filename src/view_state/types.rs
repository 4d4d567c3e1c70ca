//! Core view-state newtypes

/// Index of an item slot in the virtual item sequence. 0-indexed.
///
/// Slot 0 is the edge next to the live end in a reversed list (the bottom of
/// the screen) and the top of the screen otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// Create a new SlotIndex from a raw 0-based value.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw 0-based index value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Get the next slot index.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the previous slot index, saturating at 0.
    pub fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Shift by `delta` slots, saturating at 0.
    pub fn shifted(&self, delta: isize) -> Self {
        Self(self.0.saturating_add_signed(delta))
    }

    /// Position of this item slot in the flat item/separator sequence.
    pub fn to_flat(&self) -> usize {
        self.0 * 2
    }
}

impl From<usize> for SlotIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// One end of the virtual item sequence.
///
/// `Start` is the slot-0 side, `End` the side of the parent-message slot.
/// Which one holds the live end depends on the list's `reverse` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEdge {
    /// Slot-0 side.
    Start,
    /// Parent-message side.
    End,
}

impl ViewportEdge {
    /// The other end.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_index_prev_saturates_at_zero() {
        assert_eq!(SlotIndex::new(0).prev(), SlotIndex::new(0));
        assert_eq!(SlotIndex::new(3).prev(), SlotIndex::new(2));
    }

    #[test]
    fn slot_index_shifted_in_both_directions() {
        assert_eq!(SlotIndex::new(4).shifted(3), SlotIndex::new(7));
        assert_eq!(SlotIndex::new(4).shifted(-2), SlotIndex::new(2));
        assert_eq!(SlotIndex::new(1).shifted(-5), SlotIndex::new(0));
    }

    #[test]
    fn item_slots_land_on_even_flat_positions() {
        assert_eq!(SlotIndex::new(0).to_flat(), 0);
        assert_eq!(SlotIndex::new(3).to_flat(), 6);
    }

    #[test]
    fn edge_opposite_round_trips() {
        assert_eq!(ViewportEdge::Start.opposite(), ViewportEdge::End);
        assert_eq!(ViewportEdge::End.opposite().opposite(), ViewportEdge::End);
    }
}
