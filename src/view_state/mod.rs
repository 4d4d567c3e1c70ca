//! View-state layer: slot arithmetic, separators, heights and scroll anchors.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (SlotIndex, ViewportEdge)
//! - `classifier`: LayoutClassifier - separator between two adjacent messages
//! - `slots`: SlotLayout and VirtualItemSequence - the addressable item sequence
//! - `height_index`: HeightIndex - O(log n) prefix sums via Fenwick tree
//! - `scroll`: ScrollAnchor / ScrollTarget - semantic scroll position
//! - `viewport`: ViewportReading - visible slot range reported by the renderer

pub mod classifier;
pub mod height_index;
pub mod scroll;
pub mod slots;
pub mod types;
pub mod viewport;
