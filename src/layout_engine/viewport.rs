//! Relationship between the dragged item, its container and the scrollable
//! regions around them, recomputed for every sample.

use serde::{Deserialize, Serialize};

use crate::model::geometry::{Axis, Rect};
use crate::model::intersect::IntersectState;
use crate::model::scroll_state::{ScrollDirection, ScrollState};
use crate::sys::host::RegionId;

/// One scrollable ancestor as measured for the current sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: RegionId,
    pub rect: Rect,
    pub scroll: ScrollState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// Item against the region it penetrates deepest, if any.
    pub item: Option<(RegionId, IntersectState)>,
    /// Container against that same region.
    pub container: Option<IntersectState>,
    /// Innermost region that can still scroll in the item's direction.
    pub scroll_target: Option<RegionSnapshot>,
    item_rect: Rect,
    container_rect: Rect,
    /// Outermost region; stands in for the window.
    window: Option<Rect>,
}

impl ViewportState {
    /// State with no edge contact.
    pub fn idle() -> ViewportState {
        ViewportState {
            item: None,
            container: None,
            scroll_target: None,
            item_rect: Rect::default(),
            container_rect: Rect::default(),
            window: None,
        }
    }

    /// `regions` are ordered from the innermost to the outermost.
    pub fn compute(
        axis: Axis,
        item_rect: Rect,
        container_rect: Rect,
        regions: &[RegionSnapshot],
        threshold: f64,
    ) -> ViewportState {
        let mut best: Option<(RegionSnapshot, IntersectState)> = None;
        for region in regions {
            let state = IntersectState::compute(&region.rect, &item_rect, axis, threshold);
            if !state.is_intersecting() {
                continue;
            }
            let deeper = best.is_none_or(|(_, b)| {
                state.edge_penetration().abs() > b.edge_penetration().abs()
            });
            if deeper {
                best = Some((*region, state));
            }
        }
        let window = regions.last().map(|r| r.rect);
        let Some((region, item)) = best else {
            return ViewportState {
                item_rect,
                container_rect,
                window,
                ..ViewportState::idle()
            };
        };
        let container = IntersectState::compute(&region.rect, &container_rect, axis, 0.0);
        let scroll_target = item
            .scroll_direction()
            .and_then(|dir| regions.iter().find(|r| !r.scroll.is_to_end(dir)).copied());
        ViewportState {
            item: Some((region.id, item)),
            container: Some(container),
            scroll_target,
            item_rect,
            container_rect,
            window,
        }
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.item.and_then(|(_, state)| state.scroll_direction())
    }

    pub fn penetration(&self) -> f64 {
        self.item.map_or(0.0, |(_, state)| state.edge_penetration())
    }

    /// Region edge the item is touching, and on which side.
    pub fn edge(&self) -> Option<(RegionId, ScrollDirection)> {
        self.item.and_then(|(id, state)| Some((id, state.scroll_direction()?)))
    }

    pub fn item_value(&self) -> Option<f64> { self.item.and_then(|(_, state)| state.value) }

    pub fn is_near_edge(&self) -> bool { self.item.is_some_and(|(_, s)| s.is_intersecting()) }

    pub fn is_scrollable(&self) -> bool {
        match (self.direction(), self.scroll_target) {
            (Some(dir), Some(target)) => !target.scroll.is_to_end(dir),
            _ => false,
        }
    }

    /// Whether the container's edge in the scroll direction is already on
    /// screen.
    pub fn is_full_visible(&self) -> bool {
        let Some(container) = self.container else {
            return false;
        };
        let t = container.threshold;
        match self.direction() {
            Some(ScrollDirection::Forward) => container.d_positive >= t,
            Some(ScrollDirection::Backward) => container.d_negative <= -t,
            None => container.d_negative <= t && container.d_positive >= -t,
        }
    }

    /// Whether the window has room past the container's edge for the item.
    pub fn has_item_move_space(&self) -> bool {
        let (Some((_, item)), Some(window)) = (self.item, self.window) else {
            return false;
        };
        let (Some(dir), axis) = (item.scroll_direction(), item.axis) else {
            return false;
        };
        let room = match dir {
            ScrollDirection::Forward => window.trailing(axis) - self.container_rect.trailing(axis),
            ScrollDirection::Backward => self.container_rect.leading(axis) - window.leading(axis),
        };
        room >= self.item_rect.extent(axis)
    }

    pub fn should_scroll(&self) -> bool {
        self.is_near_edge()
            && self.is_scrollable()
            && !(self.is_full_visible() && self.has_item_move_space())
    }
}

/// Area visible through every region at once.
pub fn minimum_viewport(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, rect| acc.intersection(&rect))
}

/// Smooth scroll needed so that `target` lands inside the visible area.
///
/// Returns the region to scroll and the offset to scroll it to.
pub fn drop_alignment(
    axis: Axis,
    target: Rect,
    regions: &[RegionSnapshot],
) -> Option<(RegionId, f64)> {
    let viewport = minimum_viewport(regions.iter().map(|r| r.rect))?;
    let state = IntersectState::compute(&viewport, &target, axis, 0.0);
    let direction = state.scroll_direction()?;
    let value = state.value?;
    let region = regions.iter().find(|r| !r.scroll.is_to_end(direction))?;
    let offset = (region.scroll.offset - value).clamp(0.0, region.scroll.max_offset());
    Some((region.id, offset))
}
