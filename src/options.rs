use alloc::sync::Arc;

use crate::list::VirtualList;
use crate::{Rect, ScrollMetrics};

/// Fallback extent for items that haven't been measured yet.
pub const DEFAULT_ESTIMATED_ITEM_SIZE: u32 = 50;

/// Default debounce before `is_scrolling` falls back to `false`.
pub const DEFAULT_IS_SCROLLING_RESET_DELAY_MS: u64 = 150;

/// Returns the extent of the item at a real index.
///
/// Must be non-negative and stable for a given index/origin until the list is told otherwise
/// through [`VirtualList::reset_after_index`].
pub type ItemSizeFn = Arc<dyn Fn(usize) -> u32 + Send + Sync>;

/// A callback fired when the list's state changes. The second argument is `is_scrolling`.
pub type OnChangeCallback = Arc<dyn Fn(&VirtualList, bool) + Send + Sync>;

/// A boundary notification (`start_reached` / `end_reached`).
pub type ReachCallback = Arc<dyn Fn(ScrollMetrics) + Send + Sync>;

/// Configuration for [`VirtualList`].
///
/// Cheap to clone: closures are held in `Arc`s, so adapters can tweak a field and hand the
/// options back through [`VirtualList::set_options`].
pub struct ListOptions {
    pub item_count: usize,
    pub item_size: ItemSizeFn,
    /// Used for the total-size estimate of the unmeasured tail.
    pub estimated_item_size: u32,
    /// Extra items on each side of the visible window. At least one is always rendered.
    pub overscan_count: usize,
    pub viewport: Rect,

    /// Growth-origin marker. Raise it by `n` when `n` items are prepended.
    pub origin_index: usize,

    /// Distance from either end within which boundary callbacks fire.
    pub reach_threshold: u64,

    /// Real index to reveal when the list is attached.
    pub initial_index: Option<usize>,
    /// Scroll offset to restore when the list is attached (wins over `initial_index`).
    pub initial_scroll_offset: Option<u64>,

    pub is_scrolling_reset_delay_ms: u64,

    pub on_change: Option<OnChangeCallback>,
    pub on_start_reached: Option<ReachCallback>,
    pub on_end_reached: Option<ReachCallback>,
}

impl Clone for ListOptions {
    fn clone(&self) -> Self {
        Self {
            item_count: self.item_count,
            item_size: Arc::clone(&self.item_size),
            estimated_item_size: self.estimated_item_size,
            overscan_count: self.overscan_count,
            viewport: self.viewport,
            origin_index: self.origin_index,
            reach_threshold: self.reach_threshold,
            initial_index: self.initial_index,
            initial_scroll_offset: self.initial_scroll_offset,
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            on_change: self.on_change.clone(),
            on_start_reached: self.on_start_reached.clone(),
            on_end_reached: self.on_end_reached.clone(),
        }
    }
}

impl ListOptions {
    /// Creates options for `item_count` items sized by `item_size(real_index)`.
    pub fn new(item_count: usize, item_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            item_count,
            item_size: Arc::new(item_size),
            estimated_item_size: DEFAULT_ESTIMATED_ITEM_SIZE,
            overscan_count: 1,
            viewport: Rect::default(),
            origin_index: 0,
            reach_threshold: 0,
            initial_index: None,
            initial_scroll_offset: None,
            is_scrolling_reset_delay_ms: DEFAULT_IS_SCROLLING_RESET_DELAY_MS,
            on_change: None,
            on_start_reached: None,
            on_end_reached: None,
        }
    }

    pub fn with_item_size(mut self, item_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        self.item_size = Arc::new(item_size);
        self
    }

    pub fn with_estimated_item_size(mut self, estimated_item_size: u32) -> Self {
        self.estimated_item_size = estimated_item_size;
        self
    }

    pub fn with_overscan_count(mut self, overscan_count: usize) -> Self {
        self.overscan_count = overscan_count;
        self
    }

    /// Sets the viewport; `main` is the scroll axis.
    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_viewport_height(mut self, height: u32) -> Self {
        self.viewport.main = height;
        self
    }

    pub fn with_origin_index(mut self, origin_index: usize) -> Self {
        self.origin_index = origin_index;
        self
    }

    pub fn with_reach_threshold(mut self, reach_threshold: u64) -> Self {
        self.reach_threshold = reach_threshold;
        self
    }

    pub fn with_initial_index(mut self, initial_index: Option<usize>) -> Self {
        self.initial_index = initial_index;
        self
    }

    pub fn with_initial_scroll_offset(mut self, initial_scroll_offset: Option<u64>) -> Self {
        self.initial_scroll_offset = initial_scroll_offset;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&VirtualList, bool) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_start_reached(
        mut self,
        f: Option<impl Fn(ScrollMetrics) + Send + Sync + 'static>,
    ) -> Self {
        self.on_start_reached = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_end_reached(
        mut self,
        f: Option<impl Fn(ScrollMetrics) + Send + Sync + 'static>,
    ) -> Self {
        self.on_end_reached = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for ListOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("item_count", &self.item_count)
            .field("estimated_item_size", &self.estimated_item_size)
            .field("overscan_count", &self.overscan_count)
            .field("viewport", &self.viewport)
            .field("origin_index", &self.origin_index)
            .field("reach_threshold", &self.reach_threshold)
            .field("initial_index", &self.initial_index)
            .field("initial_scroll_offset", &self.initial_scroll_offset)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .finish_non_exhaustive()
    }
}
