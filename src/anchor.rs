use crate::PositionItem;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackerState {
    /// The target follows the anchor; the physical scroll position is authoritative.
    #[default]
    Tracking,
    /// A length change or jump produced a target the container still has to be moved to.
    Locating,
}

/// Keeps the item at the top of the viewport stable across content changes.
///
/// The anchor is what is at the top right now. The target is where the container should be;
/// outside of [`TrackerState::Locating`] it simply mirrors the latest range computation.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AnchorTracker {
    anchor: PositionItem,
    target: PositionItem,
    state: TrackerState,
}

impl AnchorTracker {
    pub(crate) fn new(initial: PositionItem) -> Self {
        Self {
            anchor: initial,
            target: initial,
            state: TrackerState::Tracking,
        }
    }

    pub(crate) fn anchor(&self) -> PositionItem {
        self.anchor
    }

    pub(crate) fn target(&self) -> PositionItem {
        self.target
    }

    pub(crate) fn state(&self) -> TrackerState {
        self.state
    }

    pub(crate) fn record_anchor(&mut self, anchor: PositionItem) {
        self.anchor = anchor;
    }

    /// Mirrors a freshly computed position into the target unless a relocation is pending.
    pub(crate) fn track(&mut self, target: PositionItem) {
        if self.state == TrackerState::Tracking {
            self.target = target;
        }
    }

    /// Freezes the last anchor as the target so a length change doesn't move visible content.
    pub(crate) fn hold_anchor(&mut self) {
        self.locate(self.anchor);
    }

    pub(crate) fn locate(&mut self, target: PositionItem) {
        self.target = target;
        self.state = TrackerState::Locating;
    }

    /// Called once the container sits at the target.
    pub(crate) fn settle(&mut self, anchor: PositionItem) {
        self.anchor = anchor;
        self.target = anchor;
        self.state = TrackerState::Tracking;
    }
}
