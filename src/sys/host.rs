//! What the engine needs from the layout and measurement layer.

use serde::{Deserialize, Serialize};

use crate::layout_engine::RegionSnapshot;
use crate::model::geometry::{Axis, Rect};
use crate::model::scroll_state::ScrollState;

/// Opaque handle to a scrollable ancestor, assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Instant,
    Smooth,
}

/// Layout queries and scroll commands. Rects are in one shared viewport
/// space.
pub trait Host {
    /// Item rects in display order.
    fn item_rects(&self) -> Vec<Rect>;

    fn container_rect(&self) -> Rect;

    /// Scrollable ancestors of the container, innermost first.
    fn scrollable_ancestors(&self) -> Vec<RegionId>;

    fn region_rect(&self, region: RegionId) -> Rect;

    fn scroll_state(&self, region: RegionId, axis: Axis) -> ScrollState;

    fn scroll_to(&mut self, region: RegionId, axis: Axis, offset: f64, behavior: ScrollBehavior);

    fn is_draggable(&self, _index: usize) -> bool { true }

    /// Measures every region in `chain`.
    fn snapshot_regions(&self, chain: &[RegionId], axis: Axis) -> Vec<RegionSnapshot> {
        chain
            .iter()
            .map(|&id| RegionSnapshot {
                id,
                rect: self.region_rect(id),
                scroll: self.scroll_state(id, axis),
            })
            .collect()
    }
}
