#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::{Range, RenderedItem};

#[cfg(feature = "std")]
type PlacementMap = HashMap<usize, RenderedItem>;
#[cfg(not(feature = "std"))]
type PlacementMap = BTreeMap<usize, RenderedItem>;

/// Index-keyed cache of resolved item placements handed to the renderer.
///
/// Entries go stale whenever offsets downstream of a reset change, and when scrolling stops
/// (renderers may key presentation off the scrolling flag), so both paths clear it. Every range
/// change also trims it to the new window.
#[derive(Clone, Debug, Default)]
pub(crate) struct PlacementCache {
    items: PlacementMap,
}

impl PlacementCache {
    pub(crate) fn get(&self, virtual_index: usize) -> Option<RenderedItem> {
        self.items.get(&virtual_index).copied()
    }

    pub(crate) fn insert(&mut self, item: RenderedItem) {
        self.items.insert(item.virtual_index, item);
    }

    /// Drops every placement at or after `virtual_index`.
    pub(crate) fn truncate_from(&mut self, virtual_index: usize) {
        self.items.retain(|&index, _| index < virtual_index);
    }

    /// Keeps only the placements inside `range` (virtual, inclusive).
    pub(crate) fn retain_range(&mut self, range: Range) {
        self.items.retain(|&index, _| range.contains(index));
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
