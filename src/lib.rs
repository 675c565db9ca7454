//! A headless windowing engine for very large ordered lists.
//!
//! Only the items inside the viewport (plus a small overscan margin) are materialized. Item
//! sizes are unknown until measured: the engine asks a size function for them lazily, as
//! scrolling reaches them, and estimates the rest.
//!
//! On top of the range math it keeps the visible content stable while the list changes:
//! - items can be prepended without invalidating measured items (see [`IndexMapper`]),
//! - the item at the top of the viewport is tracked and the container is scrolled back to it
//!   after length changes or re-measurement,
//! - `follow_output` keeps a chat/log list pinned to its tail as it grows,
//! - boundary callbacks fire once per approach to either end.
//!
//! It is UI-agnostic. An adapter is expected to provide:
//! - a [`ScrollContainer`] (scroll offset readback and write-back),
//! - scroll events and a millisecond clock,
//! - a render pass over [`VirtualList::for_each_item`], followed by
//!   [`VirtualList::on_committed_update`].
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod container;
mod list;
mod mapper;
mod metadata;
mod options;
mod placement;
mod scroll;
mod search;
mod timer;
mod types;


pub use anchor::TrackerState;
pub use container::ScrollContainer;
pub use list::{Lifecycle, VirtualList};
pub use mapper::{IndexMapper, VIRTUAL_ORIGIN};
pub use options::{
    DEFAULT_ESTIMATED_ITEM_SIZE, DEFAULT_IS_SCROLLING_RESET_DELAY_MS, ItemSizeFn, ListOptions,
    OnChangeCallback, ReachCallback,
};
pub use scroll::ScrollPhase;
pub use timer::Timeout;
pub use types::{
    ItemMetadata, PositionItem, Range, Rect, RenderedItem, ScrollDirection, ScrollMetrics,
    VirtualIndexRange,
};
