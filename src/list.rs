use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::anchor::{AnchorTracker, TrackerState};
use crate::mapper::IndexMapper;
use crate::metadata::MetadataStore;
use crate::placement::PlacementCache;
use crate::scroll::{ScrollEvent, ScrollPhase, ScrollState};
use crate::search::find_nearest_item;
use crate::{
    ItemMetadata, ListOptions, PositionItem, Range, Rect, RenderedItem, ScrollContainer,
    ScrollDirection, ScrollMetrics, VirtualIndexRange,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    #[default]
    Detached,
    Attached,
}

/// A headless windowing engine for long lists whose item sizes are only known once measured.
///
/// The list holds no UI objects. An adapter drives it at three points:
/// - [`VirtualList::on_attach`] once the scroll container exists,
/// - [`VirtualList::on_committed_update`] after every render that was committed,
/// - [`VirtualList::on_detach`] before the container goes away,
///
/// and in between forwards scroll events ([`VirtualList::on_scroll`]) and clock ticks
/// ([`VirtualList::tick`]). Rendering reads [`VirtualList::range`] or iterates
/// [`VirtualList::for_each_item`].
///
/// Indexes passed in and out of public methods are real indexes unless a type says otherwise;
/// [`Range`] and [`PositionItem`] carry virtual indexes (see [`IndexMapper`]).
#[derive(Clone, Debug)]
pub struct VirtualList {
    options: ListOptions,
    mapper: IndexMapper,
    bounds: Option<VirtualIndexRange>,

    store: MetadataStore,
    placements: PlacementCache,
    range: Range,
    tracker: AnchorTracker,
    scroll: ScrollState,
    follow_output: bool,
    lifecycle: Lifecycle,

    // Length as of the last committed update.
    observed_count: usize,
    observed_origin: usize,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl VirtualList {
    /// Creates a detached list.
    ///
    /// `initial_scroll_offset` (or, failing that, `initial_index`) becomes the first target and is
    /// written to the container by [`VirtualList::on_attach`].
    pub fn new(options: ListOptions) -> Self {
        let mapper = IndexMapper::new(options.origin_index);
        let bounds = mapper.bounds(options.item_count, options.initial_index);
        vdebug!(
            item_count = options.item_count,
            origin_index = options.origin_index,
            overscan_count = options.overscan_count,
            "VirtualList::new"
        );
        let mut v = Self {
            mapper,
            bounds,
            store: MetadataStore::new(options.estimated_item_size),
            placements: PlacementCache::default(),
            range: Range::default(),
            tracker: AnchorTracker::new(PositionItem {
                index: bounds.map_or(0, |b| b.min_index),
                offset: 0,
            }),
            scroll: ScrollState::new(options.initial_scroll_offset.unwrap_or(0)),
            follow_output: false,
            lifecycle: Lifecycle::Detached,
            observed_count: options.item_count,
            observed_origin: options.origin_index,
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };

        match (v.options.initial_scroll_offset, v.bounds) {
            (Some(offset), _) => {
                let target = v.anchor_at(offset);
                v.tracker.locate(target);
                v.compute_range(offset);
            }
            // `bounds` already carries `initial_index`, clamped and mapped.
            (None, Some(bounds)) if v.options.initial_index.is_some() => {
                v.locate(bounds, bounds.initial_index, 0);
            }
            _ => {
                v.compute_range(0);
            }
        }
        v
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Replaces the options.
    ///
    /// Length changes (`item_count`, `origin_index`) are reconciled on the next
    /// [`VirtualList::on_committed_update`]. A different `item_size` closure (by identity)
    /// discards all measurements.
    pub fn set_options(&mut self, options: ListOptions) {
        let size_fn_unchanged = Arc::ptr_eq(&self.options.item_size, &options.item_size);
        let origin_unchanged = self.options.origin_index == options.origin_index;
        self.options = options;
        vtrace!(
            item_count = self.options.item_count,
            origin_index = self.options.origin_index,
            overscan_count = self.options.overscan_count,
            "VirtualList::set_options"
        );

        self.mapper = IndexMapper::new(self.options.origin_index);
        self.bounds = self
            .mapper
            .bounds(self.options.item_count, self.options.initial_index);
        self.store
            .set_estimated_item_size(self.options.estimated_item_size);
        if !size_fn_unchanged {
            vdebug!("item_size changed, dropping measurements");
            self.store.reset();
        }
        if !size_fn_unchanged || !origin_unchanged {
            // Placements carry real indexes, which depend on the origin.
            self.placements.clear();
        }
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut ListOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        if self.options.item_count == item_count {
            return;
        }
        self.update_options(|o| o.item_count = item_count);
    }

    /// Sets the length and growth origin together, e.g. `(count + n, origin + n)` after
    /// prepending `n` items.
    pub fn set_length(&mut self, item_count: usize, origin_index: usize) {
        self.update_options(|o| {
            o.item_count = item_count;
            o.origin_index = origin_index;
        });
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.options.viewport == viewport {
            return;
        }
        self.options.viewport = viewport;
        self.notify();
    }

    pub fn set_overscan_count(&mut self, overscan_count: usize) {
        self.options.overscan_count = overscan_count;
        self.notify();
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&VirtualList, bool) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    fn emit_change(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.is_scrolling());
        }
    }

    // Inside `batch_update` a change is only recorded; the outermost batch emits it.
    fn notify(&self) {
        match self.notify_depth.get() {
            0 => self.emit_change(),
            _ => self.notify_pending.set(true),
        }
    }

    /// Runs `f` and reports whatever it changed through a single `on_change` call.
    ///
    /// Scroll events and committed updates already run inside a batch. Nested batches fold into
    /// the outermost one.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.notify_depth.set(self.notify_depth.get().saturating_add(1));
        f(self);

        debug_assert!(self.notify_depth.get() > 0, "unbalanced batch_update");
        let depth = self.notify_depth.get().saturating_sub(1);
        self.notify_depth.set(depth);
        if depth == 0 && self.notify_pending.replace(false) {
            self.emit_change();
        }
    }

    pub fn item_count(&self) -> usize {
        self.options.item_count
    }

    pub fn mapper(&self) -> IndexMapper {
        self.mapper
    }

    /// Virtual bounds of the list, `None` when it is empty.
    pub fn bounds(&self) -> Option<VirtualIndexRange> {
        self.bounds
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll.offset()
    }

    pub fn scroll_direction(&self) -> ScrollDirection {
        self.scroll.direction()
    }

    pub fn scroll_phase(&self) -> ScrollPhase {
        self.scroll.phase()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.phase() == ScrollPhase::Scrolling
    }

    /// `true` between a scroll write-back and the scroll event it produces.
    pub fn is_adjusting_scroll(&self) -> bool {
        self.scroll.is_adjusting()
    }

    pub fn is_following_output(&self) -> bool {
        self.follow_output
    }

    /// The last rendered range (virtual indexes, inclusive, overscan included).
    pub fn range(&self) -> Range {
        self.range
    }

    pub fn anchor(&self) -> PositionItem {
        self.tracker.anchor()
    }

    pub fn target(&self) -> PositionItem {
        self.tracker.target()
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }

    /// Real index of the item at the top of the viewport.
    pub fn anchor_real_index(&self) -> Option<usize> {
        self.bounds
            .map(|b| self.mapper.to_real(b.clamp(self.tracker.anchor().index)))
    }

    /// Number of items measured so far.
    pub fn measured_item_count(&self) -> usize {
        self.store.measured_len()
    }

    pub fn placement_cache_len(&self) -> usize {
        self.placements.len()
    }

    pub fn estimated_total_size(&self) -> u64 {
        match self.bounds {
            Some(b) => self.store.estimated_total_size(b),
            None => 0,
        }
    }

    fn size_of(&self) -> impl FnMut(usize) -> u32 + use<> {
        let item_size = Arc::clone(&self.options.item_size);
        let mapper = self.mapper;
        move |index| item_size(mapper.to_real(index))
    }

    // Every offset read goes through here so that unmeasured items get measured first.
    fn metadata_at(&mut self, bounds: VirtualIndexRange, index: usize) -> ItemMetadata {
        let mut size_of = self.size_of();
        self.store.get(index, bounds.min_index, &mut size_of)
    }

    /// Measures (if needed) and returns the layout of the item at `index`.
    pub fn item_metadata(&mut self, index: usize) -> Option<ItemMetadata> {
        if index >= self.options.item_count {
            vwarn!(
                index,
                item_count = self.options.item_count,
                "item_metadata: out-of-bounds index"
            );
            return None;
        }
        let bounds = self.bounds?;
        let virtual_index = self.mapper.to_virtual(index);
        Some(self.metadata_at(bounds, virtual_index))
    }

    fn nearest_item(&mut self, bounds: VirtualIndexRange, offset: u64) -> usize {
        let mut size_of = self.size_of();
        find_nearest_item(&mut self.store, bounds, &mut size_of, offset)
    }

    /// The item containing `offset` and the distance from its top.
    fn anchor_at(&mut self, offset: u64) -> PositionItem {
        let Some(bounds) = self.bounds else {
            return PositionItem::default();
        };
        let index = self.nearest_item(bounds, offset);
        let item = self.metadata_at(bounds, index);
        PositionItem {
            index,
            offset: offset.saturating_sub(item.offset),
        }
    }

    // Placements outside the window are never read again before the next reset.
    fn set_range(&mut self, range: Range) {
        self.range = range;
        self.placements.retain_range(range);
    }

    fn overscanned(&self, bounds: VirtualIndexRange, start: usize, stop: usize) -> Range {
        let overscan = self.options.overscan_count.max(1);
        Range {
            start_index: start.saturating_sub(overscan).max(bounds.min_index),
            stop_index: stop.saturating_add(overscan).min(bounds.max_index),
        }
    }

    /// Computes the range to render at `scroll_offset` and records it as the current range.
    ///
    /// Also records the first visible item as the target unless a relocation is pending.
    pub fn compute_range(&mut self, scroll_offset: u64) -> Range {
        let Some(bounds) = self.bounds else {
            self.set_range(Range::default());
            return self.range;
        };

        let start = self.nearest_item(bounds, scroll_offset);
        let start_item = self.metadata_at(bounds, start);
        let max_offset = scroll_offset.saturating_add(self.options.viewport.main as u64);

        let mut size_of = self.size_of();
        let mut offset = start_item.offset;
        let mut stop = start;
        while stop < bounds.max_index && offset < max_offset {
            stop += 1;
            let size = self.store.get(stop, bounds.min_index, &mut size_of).size;
            offset = offset.saturating_add(size as u64);
        }

        self.set_range(self.overscanned(bounds, start, stop));
        self.tracker.track(PositionItem {
            index: start,
            offset: scroll_offset.saturating_sub(start_item.offset),
        });
        vtrace!(
            scroll_offset,
            start,
            stop,
            range_start = self.range.start_index,
            range_stop = self.range.stop_index,
            "compute_range"
        );
        self.range
    }

    /// Reveals the item at real `index` at the top of the viewport.
    ///
    /// The range is filled downward from the item first, and upward only if the items below don't
    /// cover the viewport. The container is moved on the next committed update.
    pub fn locate_to_item(&mut self, index: usize) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let virtual_index = bounds.clamp(self.mapper.to_virtual(index));
        self.locate(bounds, virtual_index, 0);
    }

    /// Pins the bottom edge of the last item to the bottom of the viewport.
    pub fn scroll_to_bottom(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let last = self.metadata_at(bounds, bounds.max_index);
        self.locate(bounds, bounds.max_index, last.size as u64);
    }

    fn locate(&mut self, bounds: VirtualIndexRange, index: usize, offset: u64) {
        let viewport = self.options.viewport.main as u64;
        let mut size_of = self.size_of();
        let item = self.store.get(index, bounds.min_index, &mut size_of);

        let (mut start, mut stop) = (index, index);
        let mut covered = item.size as u64;
        while covered < viewport && stop < bounds.max_index {
            stop += 1;
            let size = self.store.get(stop, bounds.min_index, &mut size_of).size;
            covered = covered.saturating_add(size as u64);
        }
        while covered < viewport && start > bounds.min_index {
            start -= 1;
            let size = self.store.get(start, bounds.min_index, &mut size_of).size;
            covered = covered.saturating_add(size as u64);
        }

        self.set_range(self.overscanned(bounds, start, stop));
        self.tracker.locate(PositionItem { index, offset });
        vtrace!(index, offset, start, stop, "locate");
        self.notify();
    }

    /// Extends the current range until it covers the viewport again.
    ///
    /// Runs last after a length change: the corrected offset may sit past what the container can
    /// show yet (its `scroll_height` lags the new length), leaving a short range.
    fn fill_range(&mut self) {
        let Some(bounds) = self.bounds else {
            self.set_range(Range::default());
            return;
        };
        let viewport = self.options.viewport.main as u64;
        let mut start = bounds.clamp(self.range.start_index);
        let mut stop = bounds.clamp(self.range.stop_index).max(start);

        let mut size_of = self.size_of();
        let first = self.store.get(start, bounds.min_index, &mut size_of);
        let last = self.store.get(stop, bounds.min_index, &mut size_of);
        let mut covered = last.end().saturating_sub(first.offset);
        while covered < viewport && stop < bounds.max_index {
            stop += 1;
            let size = self.store.get(stop, bounds.min_index, &mut size_of).size;
            covered = covered.saturating_add(size as u64);
        }
        while covered < viewport && start > bounds.min_index {
            start -= 1;
            let size = self.store.get(start, bounds.min_index, &mut size_of).size;
            covered = covered.saturating_add(size as u64);
        }
        vtrace!(start, stop, covered, "fill_range");
        self.set_range(Range {
            start_index: start,
            stop_index: stop,
        });
    }

    /// Forgets measurements from real `index` onward (everything when `index == 0`).
    ///
    /// Call this when item sizes may have changed. With `force_repaint`, `on_change` fires so the
    /// adapter re-renders.
    pub fn reset_after_index(&mut self, index: usize, force_repaint: bool) {
        vtrace!(index, force_repaint, "reset_after_index");
        if index == 0 {
            self.store.reset();
            self.placements.clear();
        } else {
            self.invalidate_from(self.mapper.to_virtual(index));
        }
        if force_repaint {
            self.notify();
        }
    }

    fn invalidate_from(&mut self, virtual_index: usize) {
        self.store.truncate_from(virtual_index);
        self.placements.truncate_from(virtual_index);
    }

    /// Snaps to the tail on the next length change (chat/log style).
    pub fn follow_output(&mut self) {
        self.follow_output = true;
    }

    /// Re-arms both boundary callbacks.
    pub fn reset_reach_callbacks(&mut self) {
        self.scroll.rearm_start();
        self.scroll.rearm_end();
    }

    /// Call once the scroll container is mounted. Applies the initial offset/index.
    pub fn on_attach(&mut self, container: &mut impl ScrollContainer) {
        if self.lifecycle == Lifecycle::Attached {
            return;
        }
        vdebug!(item_count = self.options.item_count, "on_attach");
        self.lifecycle = Lifecycle::Attached;
        self.observed_count = self.options.item_count;
        self.observed_origin = self.options.origin_index;

        self.batch_update(|v| {
            if !v.sync_scroll_position(container) {
                let anchor = v.anchor_at(v.scroll.offset());
                v.tracker.record_anchor(anchor);
            }
        });
    }

    /// Call after every committed render.
    ///
    /// Reconciles length changes, records the anchor, and moves the container if the target
    /// no longer matches its position. After a length change the range is refilled last.
    pub fn on_committed_update(&mut self, container: &mut impl ScrollContainer) {
        if self.lifecycle != Lifecycle::Attached {
            vwarn!("on_committed_update while detached");
            return;
        }
        self.batch_update(|v| {
            let resized = v.options.item_count != v.observed_count
                || v.options.origin_index != v.observed_origin;
            if resized {
                v.reconcile_length();
            }
            if !v.sync_scroll_position(container) {
                let anchor = v.anchor_at(v.scroll.offset());
                v.tracker.record_anchor(anchor);
            }
            if resized {
                v.fill_range();
                v.notify();
            }
        });
    }

    /// Call before the container goes away. Cancels the pending idle transition.
    pub fn on_detach(&mut self) {
        vdebug!("on_detach");
        self.scroll.cancel_idle_timer();
        self.lifecycle = Lifecycle::Detached;
    }

    fn reconcile_length(&mut self) {
        let prev_count = self.observed_count;
        let prev_origin = self.observed_origin;
        self.observed_count = self.options.item_count;
        self.observed_origin = self.options.origin_index;

        // Keep what is on screen now.
        self.tracker.hold_anchor();

        if self.follow_output {
            vdebug!(prev_count, item_count = self.options.item_count, "follow output");
            self.follow_output = false;
            if let Some(prev_last) = prev_count.checked_sub(1) {
                let prev_last = IndexMapper::new(prev_origin).to_virtual(prev_last);
                self.invalidate_from(prev_last);
            }
            self.scroll_to_bottom();
        } else if self.options.origin_index > prev_origin {
            vdebug!(
                prev_origin,
                origin_index = self.options.origin_index,
                "items prepended"
            );
            self.store.reset();
            self.placements.clear();
            self.scroll.rearm_start();
        } else {
            vdebug!(prev_count, item_count = self.options.item_count, "length changed");
            if self.options.origin_index != prev_origin {
                self.store.reset();
                self.placements.clear();
            }
            self.scroll.rearm_end();
        }
    }

    /// Moves the container to the target if needed. Returns `true` if the target was resolved.
    fn sync_scroll_position(&mut self, container: &mut impl ScrollContainer) -> bool {
        let Some(bounds) = self.bounds else {
            self.tracker.settle(PositionItem::default());
            return false;
        };
        let metrics = container.metrics();
        let target = self.tracker.target();
        let item = self.metadata_at(bounds, bounds.clamp(target.index));
        let desired = item
            .offset
            .saturating_add(target.offset)
            .min(metrics.max_scroll_top());

        // While tracking, only measurement drift under the target moves the container.
        if self.tracker.state() == TrackerState::Tracking && desired == self.scroll.offset() {
            return false;
        }

        if desired != metrics.scroll_top {
            vtrace!(
                from = metrics.scroll_top,
                to = desired,
                target_index = target.index,
                "scroll correction"
            );
            self.scroll.begin_adjust(desired);
            container.set_scroll_top(desired);
        } else {
            self.scroll.sync_offset(desired);
        }

        let anchor = self.anchor_at(desired);
        self.tracker.settle(anchor);
        self.compute_range(desired);
        self.notify();
        true
    }

    /// Call for every scroll event the container reports.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now_ms: u64) {
        if self.lifecycle != Lifecycle::Attached {
            return;
        }
        match self
            .scroll
            .on_event(metrics, now_ms, self.options.is_scrolling_reset_delay_ms)
        {
            ScrollEvent::Correction => {
                vtrace!(scroll_top = metrics.scroll_top, "scroll correction echoed");
                return;
            }
            ScrollEvent::Unchanged => return,
            ScrollEvent::Moved => {}
        }

        let offset = self.scroll.offset();
        vtrace!(offset, now_ms, "on_scroll");
        self.batch_update(|v| {
            v.compute_range(offset);
            let anchor = v.anchor_at(offset);
            v.tracker.record_anchor(anchor);

            let reached = v.scroll.check_boundaries(metrics, v.options.reach_threshold);
            if reached.start {
                vtrace!(offset, "start reached");
                if let Some(cb) = v.options.on_start_reached.clone() {
                    cb(metrics);
                }
            }
            if reached.end {
                vtrace!(offset, "end reached");
                if let Some(cb) = v.options.on_end_reached.clone() {
                    cb(metrics);
                }
            }
            v.notify();
        });
    }

    /// Advances the adapter clock. Returns `true` when scrolling just went idle.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if !self.scroll.poll_idle(now_ms) {
            return false;
        }
        vtrace!(now_ms, "scrolling idle");
        self.placements.clear();
        self.notify();
        true
    }

    /// Deadline of the pending idle transition, if any.
    pub fn idle_deadline_ms(&self) -> Option<u64> {
        self.scroll.idle_deadline_ms()
    }

    /// Iterates the items of the current range with their placement.
    pub fn for_each_item(&mut self, mut f: impl FnMut(RenderedItem)) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let start = bounds.clamp(self.range.start_index);
        let stop = bounds.clamp(self.range.stop_index);
        for index in start..=stop {
            let item = match self.placements.get(index) {
                Some(item) => item,
                None => {
                    let meta = self.metadata_at(bounds, index);
                    let item = RenderedItem {
                        index: self.mapper.to_real(index),
                        virtual_index: index,
                        offset: meta.offset,
                        size: meta.size,
                    };
                    self.placements.insert(item);
                    item
                }
            };
            f(item);
        }
    }

    /// Collects the items of the current range into `out` (clears `out` first).
    pub fn collect_items(&mut self, out: &mut Vec<RenderedItem>) {
        out.clear();
        self.for_each_item(|item| out.push(item));
    }
}
