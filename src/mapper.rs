//! Conversion between real (caller-facing) indexes and internal virtual indexes.
//!
//! Virtual indexes are shifted by a fixed origin so that prepending items (which raises
//! `origin_index`) leaves the virtual index of every existing item unchanged:
//!
//! `virtual = real + (VIRTUAL_ORIGIN - origin_index)`
//!
//! The mapping is stateless and re-derived whenever `item_count` or `origin_index` changes.

use core::ops::RangeInclusive;

use crate::{Range, VirtualIndexRange};

/// Fixed virtual index of real index 0 while `origin_index == 0`.
///
/// `origin_index` may grow up to `VIRTUAL_ORIGIN` (about a billion prepended items) before the
/// shift would go negative. The largest virtual index stays below `VIRTUAL_ORIGIN + item_count`,
/// which fits a 32-bit `usize` for lists of up to `3 * 2^30` items.
pub const VIRTUAL_ORIGIN: usize = 1 << 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexMapper {
    origin_index: usize,
}

impl IndexMapper {
    pub fn new(origin_index: usize) -> Self {
        debug_assert!(
            origin_index <= VIRTUAL_ORIGIN,
            "origin_index exceeds supported growth (origin={origin_index}, max={VIRTUAL_ORIGIN})"
        );
        Self { origin_index }
    }

    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    fn shift(&self) -> usize {
        VIRTUAL_ORIGIN.saturating_sub(self.origin_index)
    }

    pub fn to_virtual(&self, real_index: usize) -> usize {
        real_index.saturating_add(self.shift())
    }

    pub fn to_real(&self, virtual_index: usize) -> usize {
        virtual_index.saturating_sub(self.shift())
    }

    /// Real indexes covered by a virtual [`Range`].
    pub fn to_real_range(&self, range: Range) -> RangeInclusive<usize> {
        self.to_real(range.start_index)..=self.to_real(range.stop_index)
    }

    /// Virtual bounds for `item_count` items, or `None` for an empty list.
    ///
    /// `initial_index` (real) is clamped into the list.
    pub fn bounds(
        &self,
        item_count: usize,
        initial_index: Option<usize>,
    ) -> Option<VirtualIndexRange> {
        if item_count == 0 {
            return None;
        }
        let min_index = self.to_virtual(0);
        let max_index = self.to_virtual(item_count - 1);
        let initial_index = initial_index
            .map(|i| self.to_virtual(i.min(item_count - 1)))
            .unwrap_or(min_index);
        Some(VirtualIndexRange {
            min_index,
            max_index,
            initial_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_keeps_existing_virtual_indexes() {
        let before = IndexMapper::new(0);
        let after = IndexMapper::new(10);
        let v = before.to_virtual(25);
        assert_eq!(after.to_real(v), 35);
        assert_eq!(after.to_virtual(35), v);
    }

    #[test]
    fn round_trips_for_any_origin() {
        for origin in [0usize, 1, 7, 1000, VIRTUAL_ORIGIN] {
            let m = IndexMapper::new(origin);
            for real in [0usize, 1, 99, 123_456] {
                assert_eq!(m.to_real(m.to_virtual(real)), real);
            }
        }
    }

    #[test]
    fn bounds_track_count_and_origin() {
        assert_eq!(IndexMapper::new(0).bounds(0, None), None);

        let b = IndexMapper::new(3).bounds(10, Some(50)).unwrap();
        assert_eq!(b.min_index, VIRTUAL_ORIGIN - 3);
        assert_eq!(b.max_index, VIRTUAL_ORIGIN + 6);
        assert_eq!(b.initial_index, b.max_index);
        assert!(b.min_index <= b.max_index);
    }
}
