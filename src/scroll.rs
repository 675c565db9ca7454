use core::cmp;

use crate::timer::Timeout;
use crate::{ScrollDirection, ScrollMetrics};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollPhase {
    #[default]
    Idle,
    Scrolling,
}

/// Classification of an incoming scroll event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScrollEvent {
    /// The echo of a correction the engine wrote itself.
    Correction,
    /// The clamped offset equals the current one.
    Unchanged,
    /// A user-driven move.
    Moved,
}

/// Set right before the engine writes a scroll position, cleared by the next scroll event
/// whatever its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct AdjustGuard {
    armed: bool,
}

impl AdjustGuard {
    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    pub(crate) fn take(&mut self) -> bool {
        core::mem::take(&mut self.armed)
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }
}

/// One-shot latch for boundary notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ReachLatch {
    #[default]
    Armed,
    Fired,
}

impl ReachLatch {
    /// Returns `true` if armed, and disarms.
    fn fire(&mut self) -> bool {
        core::mem::replace(self, Self::Fired) == Self::Armed
    }

    pub(crate) fn rearm(&mut self) {
        *self = Self::Armed;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Reached {
    pub(crate) start: bool,
    pub(crate) end: bool,
}

/// Offset, direction and idle/scrolling phase of the list.
#[derive(Clone, Debug)]
pub(crate) struct ScrollState {
    offset: u64,
    direction: ScrollDirection,
    phase: ScrollPhase,
    idle_timer: Timeout,
    guard: AdjustGuard,
    start_latch: ReachLatch,
    end_latch: ReachLatch,
}

impl ScrollState {
    pub(crate) fn new(offset: u64) -> Self {
        Self {
            offset,
            direction: ScrollDirection::Forward,
            phase: ScrollPhase::Idle,
            idle_timer: Timeout::default(),
            guard: AdjustGuard::default(),
            start_latch: ReachLatch::Armed,
            end_latch: ReachLatch::Armed,
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub(crate) fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub(crate) fn idle_deadline_ms(&self) -> Option<u64> {
        self.idle_timer.deadline_ms()
    }

    pub(crate) fn is_adjusting(&self) -> bool {
        self.guard.is_armed()
    }

    /// Records a programmatic reposition. The guard must be armed before the container write so
    /// the echoed scroll event is not taken for user input.
    pub(crate) fn begin_adjust(&mut self, offset: u64) {
        self.guard.arm();
        self.set_offset(offset);
    }

    /// Records a programmatic reposition the container already matches (no event will follow).
    pub(crate) fn sync_offset(&mut self, offset: u64) {
        self.set_offset(offset);
    }

    fn set_offset(&mut self, offset: u64) {
        self.direction = match offset.cmp(&self.offset) {
            cmp::Ordering::Greater => ScrollDirection::Forward,
            cmp::Ordering::Less => ScrollDirection::Backward,
            cmp::Ordering::Equal => self.direction,
        };
        self.offset = offset;
    }

    pub(crate) fn on_event(
        &mut self,
        metrics: ScrollMetrics,
        now_ms: u64,
        reset_delay_ms: u64,
    ) -> ScrollEvent {
        if self.guard.take() {
            return ScrollEvent::Correction;
        }

        // Absorb overscroll/bounce.
        let offset = metrics.scroll_top.min(metrics.max_scroll_top());
        if offset == self.offset {
            return ScrollEvent::Unchanged;
        }

        self.set_offset(offset);
        self.phase = ScrollPhase::Scrolling;
        self.idle_timer.request(now_ms, reset_delay_ms);
        ScrollEvent::Moved
    }

    /// Fires each boundary latch at most once until it is re-armed.
    pub(crate) fn check_boundaries(&mut self, metrics: ScrollMetrics, threshold: u64) -> Reached {
        let mut reached = Reached::default();
        if self.direction == ScrollDirection::Backward && self.offset <= threshold {
            reached.start = self.start_latch.fire();
        }
        let bottom = self.offset.saturating_add(metrics.client_height);
        if self.direction == ScrollDirection::Forward
            && bottom >= metrics.scroll_height.saturating_sub(threshold)
        {
            reached.end = self.end_latch.fire();
        }
        reached
    }

    pub(crate) fn rearm_start(&mut self) {
        self.start_latch.rearm();
    }

    pub(crate) fn rearm_end(&mut self) {
        self.end_latch.rearm();
    }

    /// Returns `true` when the debounce elapsed and the phase went back to idle.
    pub(crate) fn poll_idle(&mut self, now_ms: u64) -> bool {
        if !self.idle_timer.poll(now_ms) {
            return false;
        }
        self.phase = ScrollPhase::Idle;
        true
    }

    pub(crate) fn cancel_idle_timer(&mut self) {
        self.idle_timer.cancel();
    }
}
