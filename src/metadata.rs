use alloc::vec::Vec;

use crate::{ItemMetadata, VirtualIndexRange};

/// Lazily extended offset/size cache over virtual indexes.
///
/// The measured run is the contiguous interval `[first, first + entries.len())`. It only grows
/// forward, one index at a time, so every entry's offset is the running sum of the sizes before
/// it. Anything outside the run is unknown and gets estimated.
#[derive(Clone, Debug)]
pub(crate) struct MetadataStore {
    entries: Vec<ItemMetadata>, // entries[i] belongs to virtual index `first + i`
    first: usize,
    estimated_item_size: u32,
}

impl MetadataStore {
    pub(crate) fn new(estimated_item_size: u32) -> Self {
        Self {
            entries: Vec::new(),
            first: 0,
            estimated_item_size,
        }
    }

    pub(crate) fn set_estimated_item_size(&mut self, size: u32) {
        self.estimated_item_size = size;
    }

    pub(crate) fn first_measured(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.first)
    }

    pub(crate) fn last_measured(&self) -> Option<usize> {
        (!self.entries.is_empty()).then(|| self.first + self.entries.len() - 1)
    }

    pub(crate) fn measured_len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the entry for `index` only if it lies inside the measured run.
    pub(crate) fn cached(&self, index: usize) -> Option<ItemMetadata> {
        index
            .checked_sub(self.first)
            .and_then(|i| self.entries.get(i))
            .copied()
    }

    /// Returns the metadata for `index`, measuring forward from the end of the run as needed.
    ///
    /// `min_index` is where offsets start at zero. A run that starts anywhere else was measured
    /// against a different origin and is discarded first.
    pub(crate) fn get(
        &mut self,
        index: usize,
        min_index: usize,
        size_of: &mut impl FnMut(usize) -> u32,
    ) -> ItemMetadata {
        debug_assert!(
            index >= min_index,
            "metadata requested below the list start (index={index}, min={min_index})"
        );
        let index = index.max(min_index);

        if self.entries.is_empty() || self.first != min_index {
            self.entries.clear();
            self.first = min_index;
        }
        if let Some(meta) = self.cached(index) {
            return meta;
        }
        self.extend_to(index, size_of);
        self.entries[index - self.first]
    }

    /// Measures every index after the run up to and including `index`.
    pub(crate) fn extend_to(&mut self, index: usize, size_of: &mut impl FnMut(usize) -> u32) {
        let (mut next, mut offset) = match self.entries.last() {
            Some(last) => (self.first + self.entries.len(), last.end()),
            None => (self.first, 0),
        };
        if next > index {
            return;
        }
        self.entries.reserve(index - next + 1);
        while next <= index {
            let size = size_of(next);
            self.entries.push(ItemMetadata { offset, size });
            offset = offset.saturating_add(size as u64);
            next += 1;
        }
    }

    /// Forgets every entry at or after `index`.
    pub(crate) fn truncate_from(&mut self, index: usize) {
        if index <= self.first {
            self.entries.clear();
        } else {
            self.entries.truncate(index - self.first);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.entries.clear();
    }

    /// Measured extent up to the last measured item plus estimates for the rest.
    pub(crate) fn estimated_total_size(&self, bounds: VirtualIndexRange) -> u64 {
        let est = self.estimated_item_size as u64;
        let measured = self
            .last_measured()
            .filter(|_| self.first == bounds.min_index)
            .map(|last| last.min(bounds.max_index));
        match measured {
            Some(last) => {
                let end = self.entries[last - self.first].end();
                let rest = (bounds.max_index - last) as u64;
                end.saturating_add(rest.saturating_mul(est))
            }
            None => {
                let count = (bounds.max_index - bounds.min_index + 1) as u64;
                count.saturating_mul(est)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min_index: usize, max_index: usize) -> VirtualIndexRange {
        VirtualIndexRange {
            min_index,
            max_index,
            initial_index: min_index,
        }
    }

    #[test]
    fn measures_lazily_and_accumulates_offsets() {
        let mut calls = 0usize;
        let mut size_of = |i: usize| {
            calls += 1;
            (i - 100) as u32 + 1
        };
        let mut store = MetadataStore::new(10);

        let m = store.get(103, 100, &mut size_of);
        assert_eq!(m, ItemMetadata { offset: 1 + 2 + 3, size: 4 });
        assert_eq!(store.first_measured(), Some(100));
        assert_eq!(store.last_measured(), Some(103));

        // Cached lookups don't call the size function again.
        let m = store.get(101, 100, &mut size_of);
        assert_eq!(m, ItemMetadata { offset: 1, size: 2 });
        drop(size_of);
        assert_eq!(calls, 4);
    }

    #[test]
    fn truncate_and_reset_shrink_the_run() {
        let mut size_of = |_: usize| 5u32;
        let mut store = MetadataStore::new(5);
        store.get(9, 0, &mut size_of);

        store.truncate_from(4);
        assert_eq!(store.last_measured(), Some(3));
        assert_eq!(store.cached(4), None);

        store.truncate_from(0);
        assert_eq!(store.last_measured(), None);

        store.get(2, 0, &mut size_of);
        store.reset();
        assert_eq!(store.measured_len(), 0);
    }

    #[test]
    fn moving_min_index_discards_the_run() {
        let mut size_of = |_: usize| 10u32;
        let mut store = MetadataStore::new(10);
        store.get(20, 10, &mut size_of);

        let m = store.get(20, 5, &mut size_of);
        assert_eq!(store.first_measured(), Some(5));
        assert_eq!(m.offset, 150);
    }

    #[test]
    fn total_size_mixes_measured_and_estimated() {
        let mut size_of = |_: usize| 20u32;
        let mut store = MetadataStore::new(50);
        assert_eq!(store.estimated_total_size(bounds(0, 9)), 500);

        store.get(3, 0, &mut size_of);
        // 4 measured * 20 + 6 estimated * 50
        assert_eq!(store.estimated_total_size(bounds(0, 9)), 80 + 300);

        // List shrank below the measured run.
        assert_eq!(store.estimated_total_size(bounds(0, 1)), 40);
    }
}
