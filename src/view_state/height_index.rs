//! HeightIndex - O(log n) prefix sums and lower_bound via Fenwick tree
//!
//! Holds the measured extent of every item slot along the scroll axis so a
//! pixel offset can be turned into a slot (and back) without a linear scan.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `prefix_sum` / `offset_of`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: amortized O(log n)
//! - `total`: O(log n)
//! - `len`: O(1)

/// Fenwick-tree backed cumulative heights of item slots.
///
/// Slot `i` covers the pixel range `[offset_of(i), offset_of(i) + height(i))`,
/// measured from the slot-0 end of the list.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick tree backing storage, sized to `capacity`.
    tree: Vec<i64>,
    /// Raw heights, kept so the tree can be rebuilt when it grows.
    heights: Vec<u32>,
}

impl HeightIndex {
    /// Creates an empty index with room for `capacity` slots.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlist::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::new(100);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            heights: Vec::with_capacity(capacity),
        }
    }

    /// Builds an index from measured heights.
    ///
    /// ```
    /// # use chatlist::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[10, 20, 15]);
    /// assert_eq!(index.total(), 45);
    /// assert_eq!(index.offset_of(2), 30);
    /// ```
    pub fn from_heights(heights: &[u32]) -> Self {
        let mut index = Self::new(heights.len());
        for &height in heights {
            index.push(height);
        }
        index
    }

    /// Sets the height of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, height: u32) {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let delta = i64::from(height) - i64::from(self.heights[index]);
        self.heights[index] = height;
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Height of slot `index`, if it exists.
    pub fn height(&self, index: usize) -> Option<u32> {
        self.heights.get(index).copied()
    }

    /// Cumulative height of slots `0..=index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn prefix_sum(&self, index: usize) -> u64 {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let sum = fenwick::array::prefix_sum(&self.tree, index);
        sum.max(0) as u64
    }

    /// Leading offset of slot `index`: the total height of all slots before it.
    ///
    /// `offset_of(len())` is the total height.
    pub fn offset_of(&self, index: usize) -> u64 {
        if index == 0 || self.is_empty() {
            0
        } else {
            self.prefix_sum(index.min(self.len()) - 1)
        }
    }

    /// First slot whose range extends past `value`, i.e. the slot containing
    /// pixel `value`.
    ///
    /// Returns `None` if `value >= total()` or the index is empty.
    ///
    /// ```
    /// # use chatlist::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[10, 20, 15]);
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(44), Some(2));
    /// assert_eq!(index.lower_bound(45), None);
    /// ```
    pub fn lower_bound(&self, value: u64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        let mut left = 0;
        let mut right = self.len();

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > value {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.len()).then_some(left)
    }

    /// Total height of all slots.
    pub fn total(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.prefix_sum(self.len() - 1)
        }
    }

    /// Number of slots tracked.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// True when no slot is tracked.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Appends a slot with the given height, growing the tree if needed.
    pub fn push(&mut self, height: u32) {
        self.heights.push(height);
        if self.heights.len() > self.tree.len() {
            // Fenwick nodes past the old capacity cover ranges that include
            // existing slots, so the tree is rebuilt rather than zero-extended.
            self.rebuild(self.tree.len().max(1) * 2);
        } else {
            fenwick::array::update(&mut self.tree, self.heights.len() - 1, i64::from(height));
        }
    }

    /// Clears all slots, retaining capacity.
    pub fn clear(&mut self) {
        self.tree.iter_mut().for_each(|node| *node = 0);
        self.heights.clear();
    }

    fn rebuild(&mut self, capacity: usize) {
        self.tree = vec![0; capacity];
        for (index, &height) in self.heights.iter().enumerate() {
            fenwick::array::update(&mut self.tree, index, i64::from(height));
        }
    }
}
