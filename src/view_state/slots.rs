//! Virtual item sequence: structural items, messages and separators as one
//! addressable sequence.
//!
//! # Item slots
//!
//! For `n` messages there are `c = n + 5` item slots:
//!
//! | slot            | reversed list    | chronological list |
//! |-----------------|------------------|--------------------|
//! | `0`             | footer           | header             |
//! | `1`             | bottom loader    | bottom loader      |
//! | `2 ..= n + 1`   | `store[slot - 2]`| `store[slot - 2]`  |
//! | `c - 3`         | top loader       | top loader         |
//! | `c - 2`         | header           | footer             |
//! | `c - 1`         | parent message   | parent message     |
//!
//! # Separators
//!
//! Between item slot `k` and `k + 1` sits one separator. The two outermost
//! gaps around the loaders (`k == 0`, `k == c - 3`) are fixed edge spacers,
//! the gaps between a loader and the first/last message (`k == 1`,
//! `k == c - 4`) are zero spacers, `k == c - 2` is the thread separator in
//! front of the parent message, and every other gap is classified from the
//! two messages it separates.
//!
//! # Flat sequence
//!
//! Items and separators interleave in a flat sequence of `2c - 1` positions:
//! even positions are item slots, odd positions separators.
//!
//! All resolution here is a total, pure function of the slot index, the
//! message count and `reverse`; out-of-range positions resolve to `None`.

use crate::model::{Message, MessageId};
use crate::state::message_store::MessageStore;

use super::classifier::{LayoutClassifier, Separator};
use super::types::{SlotIndex, ViewportEdge};

/// Number of non-message item slots: two loaders, header, footer, parent.
pub const STRUCTURAL_SLOTS: usize = 5;

/// Slot index of the first message.
const FIRST_MESSAGE_SLOT: usize = 2;

/// Item slot count for `message_count` messages.
pub fn slot_count(message_count: usize) -> usize {
    message_count + STRUCTURAL_SLOTS
}

/// What an item slot holds, without borrowing the messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Next to the oldest message.
    Header,
    /// Next to the newest message.
    Footer,
    /// Loader past the last message slot.
    TopLoader,
    /// Loader at slot 1.
    BottomLoader,
    /// Thread root, always the last slot.
    ParentMessage,
    /// A message of the window.
    Message {
        /// Position in the store, `slot - 2`.
        index_in_store: usize,
    },
}

/// Fixed spacer sizes used at the structural edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpacerSize {
    /// Collapsed gap between a loader and the adjacent message.
    Zero,
    /// Small gap between a loader and the header/footer.
    Edge,
}

/// What a separator gap holds, without borrowing the messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeparatorKind {
    /// Fixed gap around a loader.
    Spacer(SpacerSize),
    /// Between the header/footer and the parent message of a thread.
    Thread,
    /// Between `store[index_in_store]` and `store[index_in_store + 1]`.
    Between {
        /// Store position of the message in front of the gap.
        index_in_store: usize,
    },
}

/// Entry of the flat sequence, without borrowing the messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatKind {
    /// Even flat position.
    Item(SlotKind),
    /// Odd flat position.
    Separator {
        /// Item slot in front of the separator.
        after: SlotIndex,
        /// What the gap holds.
        kind: SeparatorKind,
    },
}

/// Slot arithmetic for a given message count and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    message_count: usize,
    reverse: bool,
}

impl SlotLayout {
    /// Layout for `message_count` messages, newest first when `reverse`.
    pub fn new(message_count: usize, reverse: bool) -> Self {
        Self {
            message_count,
            reverse,
        }
    }

    /// Messages in the window.
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    /// Newest message at slot 0.
    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Number of item slots, always `message_count + 5`.
    pub fn slot_count(&self) -> usize {
        slot_count(self.message_count)
    }

    /// Number of positions in the flat item/separator sequence.
    pub fn flat_len(&self) -> usize {
        self.slot_count() * 2 - 1
    }

    /// Highest valid item slot, `c - 1`.
    pub fn last_slot(&self) -> SlotIndex {
        SlotIndex::new(self.slot_count() - 1)
    }

    /// Loader at the start edge.
    pub fn bottom_loader_slot(&self) -> SlotIndex {
        SlotIndex::new(1)
    }

    /// Loader at the end edge, `c - 3`.
    pub fn top_loader_slot(&self) -> SlotIndex {
        SlotIndex::new(self.slot_count() - 3)
    }

    /// Slot of the thread root.
    pub fn parent_slot(&self) -> SlotIndex {
        self.last_slot()
    }

    /// The edge holding the newest messages.
    pub fn live_edge(&self) -> ViewportEdge {
        if self.reverse {
            ViewportEdge::Start
        } else {
            ViewportEdge::End
        }
    }

    /// The edge holding the oldest messages.
    pub fn historical_edge(&self) -> ViewportEdge {
        self.live_edge().opposite()
    }

    /// Slot of the message at `index_in_store`, if it exists.
    pub fn slot_for_store_index(&self, index_in_store: usize) -> Option<SlotIndex> {
        (index_in_store < self.message_count)
            .then(|| SlotIndex::new(index_in_store + FIRST_MESSAGE_SLOT))
    }

    /// Classify an item slot.
    pub fn kind_of(&self, slot: SlotIndex) -> Option<SlotKind> {
        let count = self.slot_count();
        let i = slot.get();
        if i >= count {
            return None;
        }

        let kind = if i == count - 1 {
            SlotKind::ParentMessage
        } else if i == count - 2 {
            if self.reverse {
                SlotKind::Header
            } else {
                SlotKind::Footer
            }
        } else if i == count - 3 {
            SlotKind::TopLoader
        } else if i == 1 {
            SlotKind::BottomLoader
        } else if i == 0 {
            if self.reverse {
                SlotKind::Footer
            } else {
                SlotKind::Header
            }
        } else {
            SlotKind::Message {
                index_in_store: i - FIRST_MESSAGE_SLOT,
            }
        };
        Some(kind)
    }

    /// Classify the separator between `after` and the next item slot.
    pub fn separator_after(&self, after: SlotIndex) -> Option<SeparatorKind> {
        let count = self.slot_count();
        let k = after.get();
        if k + 1 >= count {
            return None;
        }

        let kind = if k == count - 2 {
            SeparatorKind::Thread
        } else if k == 0 || k == count - 3 {
            SeparatorKind::Spacer(SpacerSize::Edge)
        } else if k == 1 || k == count - 4 {
            SeparatorKind::Spacer(SpacerSize::Zero)
        } else {
            SeparatorKind::Between {
                index_in_store: k - FIRST_MESSAGE_SLOT,
            }
        };
        Some(kind)
    }

    /// Classify a flat position.
    pub fn flat_kind(&self, flat: usize) -> Option<FlatKind> {
        if flat >= self.flat_len() {
            return None;
        }
        let slot = SlotIndex::new(flat / 2);
        if flat % 2 == 0 {
            self.kind_of(slot).map(FlatKind::Item)
        } else {
            self.separator_after(slot)
                .map(|kind| FlatKind::Separator { after: slot, kind })
        }
    }
}

/// A resolved item slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// Next to the oldest message.
    Header,
    /// Next to the newest message.
    Footer,
    /// Loader at the end edge.
    TopLoader,
    /// Loader at the start edge.
    BottomLoader,
    /// Thread root, supplied by the session rather than the store.
    ParentMessage,
    /// A message of the window.
    Message {
        /// The message itself.
        message: &'a Message,
        /// Its position in the store.
        index_in_store: usize,
    },
}

/// A resolved separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorSlot {
    /// Fixed gap around a loader.
    Spacer(SpacerSize),
    /// In front of the thread root.
    Thread,
    /// Classified from the two neighbouring messages.
    Computed(Separator),
}

/// A resolved position of the flat sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatSlot<'a> {
    /// Even flat position.
    Item(Slot<'a>),
    /// Odd flat position.
    Separator(SeparatorSlot),
}

/// Read-only view binding a [`SlotLayout`] to the messages of a store.
///
/// Cheap to construct; rebuild it after every store mutation.
#[derive(Debug, Clone, Copy)]
pub struct VirtualItemSequence<'a> {
    layout: SlotLayout,
    store: &'a MessageStore,
    classifier: &'a LayoutClassifier,
}

impl<'a> VirtualItemSequence<'a> {
    /// Bind the current contents of `store`.
    pub fn new(store: &'a MessageStore, classifier: &'a LayoutClassifier, reverse: bool) -> Self {
        Self {
            layout: SlotLayout::new(store.len(), reverse),
            store,
            classifier,
        }
    }

    /// The slot arithmetic this view resolves with.
    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Number of item slots, `message_count + 5`.
    pub fn slot_count(&self) -> usize {
        self.layout.slot_count()
    }

    /// Number of flat positions, `2 * slot_count - 1`.
    pub fn flat_len(&self) -> usize {
        self.layout.flat_len()
    }

    /// Resolve an item slot.
    pub fn resolve(&self, slot: SlotIndex) -> Option<Slot<'a>> {
        let resolved = match self.layout.kind_of(slot)? {
            SlotKind::Header => Slot::Header,
            SlotKind::Footer => Slot::Footer,
            SlotKind::TopLoader => Slot::TopLoader,
            SlotKind::BottomLoader => Slot::BottomLoader,
            SlotKind::ParentMessage => Slot::ParentMessage,
            SlotKind::Message { index_in_store } => Slot::Message {
                message: self.store.get(index_in_store)?,
                index_in_store,
            },
        };
        Some(resolved)
    }

    /// Resolve the separator between `after` and the next item slot.
    pub fn resolve_separator(&self, after: SlotIndex) -> Option<SeparatorSlot> {
        let resolved = match self.layout.separator_after(after)? {
            SeparatorKind::Spacer(size) => SeparatorSlot::Spacer(size),
            SeparatorKind::Thread => SeparatorSlot::Thread,
            SeparatorKind::Between { index_in_store } => {
                let message = self.store.get(index_in_store)?;
                let next = self.store.get(index_in_store + 1)?;
                SeparatorSlot::Computed(self.classifier.classify(message, next))
            }
        };
        Some(resolved)
    }

    /// Resolve a position of the flat sequence.
    pub fn resolve_flat(&self, flat: usize) -> Option<FlatSlot<'a>> {
        match self.layout.flat_kind(flat)? {
            FlatKind::Item(_) => self.resolve(SlotIndex::new(flat / 2)).map(FlatSlot::Item),
            FlatKind::Separator { after, .. } => {
                self.resolve_separator(after).map(FlatSlot::Separator)
            }
        }
    }

    /// Current slot of the message with `id`, O(1) through the store index.
    pub fn find_index_for_message_id(&self, id: &MessageId) -> Option<SlotIndex> {
        self.store
            .index_of(id)
            .and_then(|position| self.layout.slot_for_store_index(position))
    }
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
