//! Bounded record of recently chosen corpus entries.

use std::collections::VecDeque;

/// The last `capacity` chosen corpus indices, oldest first.
///
/// Owned by whoever drives a conversion and passed by reference into each
/// match call.
#[derive(Debug, Clone, Default)]
pub struct RecentlyUsed {
    capacity: usize,
    entries: VecDeque<usize>,
}

impl RecentlyUsed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a choice, evicting the oldest once full.
    pub fn push(&mut self, index: usize) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(index);
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains(&index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
