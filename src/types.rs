/// Measured layout of a single item.
///
/// `offset` is the distance from the start of the list to the top of the item, `size` its
/// extent in the scroll axis. Items never overlap: for measured `i < j`,
/// `offset(j) >= offset(i) + size(i)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemMetadata {
    pub offset: u64,
    pub size: u32,
}

impl ItemMetadata {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Viewport geometry. `main` is the scroll axis (height for vertical lists).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

/// Inclusive range of virtual indexes to render.
///
/// An empty list yields `Range::default()` (`{0, 0}`), which never overlaps real virtual
/// indexes because those start at `VIRTUAL_ORIGIN - origin_index`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start_index: usize,
    pub stop_index: usize, // inclusive
}

impl Range {
    pub fn len(&self) -> usize {
        self.stop_index.saturating_sub(self.start_index) + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..=self.stop_index).contains(&index)
    }
}

/// Virtual-index bounds for the current `item_count`/`origin_index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualIndexRange {
    /// Virtual index of real index 0.
    pub min_index: usize,
    /// Virtual index of real index `item_count - 1`.
    pub max_index: usize,
    /// Virtual index the list opens at (`initial_index`, or `min_index`).
    pub initial_index: usize,
}

impl VirtualIndexRange {
    pub fn clamp(&self, index: usize) -> usize {
        index.clamp(self.min_index, self.max_index)
    }
}

/// An item plus a pixel distance from its top.
///
/// For the anchor this is the distance from the item's top to the current scroll offset; for a
/// target it is the distance to the scroll offset the container should be moved to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionItem {
    /// Virtual index.
    pub index: usize,
    pub offset: u64,
}

/// Container readback delivered with every scroll event and to boundary callbacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub client_height: u64,
    pub scroll_height: u64,
    pub scroll_top: u64,
}

impl ScrollMetrics {
    /// Largest scroll offset the container can physically reach.
    pub fn max_scroll_top(&self) -> u64 {
        self.scroll_height.saturating_sub(self.client_height)
    }
}

/// An item the rendering collaborator should paint, with its absolute placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedItem {
    /// Real (caller-facing) index.
    pub index: usize,
    pub virtual_index: usize,
    pub offset: u64,
    pub size: u32,
}

impl RenderedItem {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }
}
