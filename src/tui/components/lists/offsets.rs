//! Memoized page start offsets.

use std::ops::Index;

/// Sorted set of item indices where pages begin.
///
/// Holds `0` whenever the list is not empty and partitions the items into
/// contiguous pages once discovery has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetTable {
    offsets: Vec<usize>,
}

impl OffsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over for a sequence of `count` items
    pub fn reset(&mut self, count: usize) {
        self.offsets.clear();
        if count > 0 {
            self.offsets.push(0);
        }
    }

    /// Record a page start, keeping the table sorted and free of duplicates
    pub fn insert(&mut self, offset: usize) {
        if let Err(position) = self.offsets.binary_search(&offset) {
            self.offsets.insert(position, offset);
        }
    }

    /// Greatest page start `<= index`
    pub fn resolve(&self, index: usize) -> Option<usize> {
        let end = self.offsets.partition_point(|&offset| offset <= index);
        end.checked_sub(1).map(|rank| self.offsets[rank])
    }

    /// Page rank of a page start
    pub fn rank(&self, offset: usize) -> Option<usize> {
        self.offsets.binary_search(&offset).ok()
    }

    pub fn get(&self, rank: usize) -> Option<usize> {
        self.offsets.get(rank).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }
}

impl Index<usize> for OffsetTable {
    type Output = usize;

    fn index(&self, rank: usize) -> &usize {
        &self.offsets[rank]
    }
}
