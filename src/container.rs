use crate::ScrollMetrics;

/// The scrollable element the list lives in.
///
/// The engine only reads its geometry and, when repositioning, writes a new scroll offset. A
/// write is expected to produce one scroll event, which the engine recognizes as its own.
pub trait ScrollContainer {
    fn metrics(&self) -> ScrollMetrics;

    fn set_scroll_top(&mut self, offset: u64);
}

impl<C: ScrollContainer + ?Sized> ScrollContainer for &mut C {
    fn metrics(&self) -> ScrollMetrics {
        (**self).metrics()
    }

    fn set_scroll_top(&mut self, offset: u64) {
        (**self).set_scroll_top(offset);
    }
}
