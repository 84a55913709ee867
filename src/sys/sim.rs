//! In-memory host: a row or column of items inside nested scrollable
//! regions. Scrolling a region moves everything it contains, so the engine
//! sees the same feedback a real layout would give it.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::common::collections::HashSet;
use crate::model::geometry::{Axis, Point, Rect};
use crate::model::scroll_state::ScrollState;
use crate::sys::host::{Host, RegionId, ScrollBehavior};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimRegion {
    pub id: RegionId,
    /// Placement while every enclosing region sits at offset zero.
    pub rect: Rect,
    /// Content size; `x` is the width and `y` the height.
    pub content: Point,
    #[serde(default)]
    pub offset: Point,
}

impl SimRegion {
    fn max_offset(&self, axis: Axis) -> f64 {
        (axis.project(self.content) - self.rect.extent(axis)).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollCommand {
    pub region: RegionId,
    pub axis: Axis,
    pub offset: f64,
    pub behavior: ScrollBehavior,
}

/// A change the host makes to its own layout, outside the engine's control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LayoutChange {
    /// Items re-laid out with these extents.
    ItemExtents(Vec<f64>),
    /// A region scrolled by the user rather than by autoscroll.
    Offset { region: RegionId, offset: f64 },
}

#[derive(Clone, Debug)]
pub struct SimHost {
    axis: Axis,
    items: Vec<Rect>,
    container: Rect,
    /// Innermost first.
    regions: Vec<SimRegion>,
    blocked: HashSet<usize>,
    scroll_log: Vec<ScrollCommand>,
}

impl SimHost {
    /// Items of the given extents laid out back to back from the origin.
    pub fn new(axis: Axis, extents: &[f64], cross_extent: f64) -> SimHost {
        let mut host = SimHost {
            axis,
            items: Vec::new(),
            container: Rect::default(),
            regions: Vec::new(),
            blocked: HashSet::default(),
            scroll_log: Vec::new(),
        };
        host.lay_out(Point::ZERO, extents, cross_extent);
        host
    }

    fn lay_out(&mut self, origin: Point, extents: &[f64], cross_extent: f64) {
        let mut cursor = 0.0;
        self.items = extents
            .iter()
            .map(|&extent| {
                let at = origin.offset(self.axis.point(cursor, 0.0));
                let size = self.axis.point(extent, cross_extent);
                cursor += extent;
                Rect::new(at.x, at.y, size.x, size.y)
            })
            .collect();
        let size = self.axis.point(cursor, cross_extent);
        self.container = Rect::new(origin.x, origin.y, size.x, size.y);
    }

    /// Moves the container (and its items) to `origin`.
    pub fn with_container_origin(mut self, origin: Point) -> SimHost {
        let delta = self.container.origin().displacement_to(origin);
        self.container = self.container.translate(delta);
        for item in &mut self.items {
            *item = item.translate(delta);
        }
        self
    }

    /// Adds a region around everything added so far. `content_extent` is the
    /// scrollable size along the host's axis.
    pub fn with_region(mut self, rect: Rect, content_extent: f64) -> SimHost {
        let id = RegionId(self.regions.len() as u64 + 1);
        let cross = rect.extent(self.axis.cross());
        self.regions.push(SimRegion {
            id,
            rect,
            content: self.axis.point(content_extent, cross),
            offset: Point::ZERO,
        });
        self
    }

    pub fn with_regions(mut self, regions: Vec<SimRegion>) -> SimHost {
        self.regions = regions;
        self
    }

    pub fn block(&mut self, index: usize) { self.blocked.insert(index); }

    /// Re-lays the items out with new extents, keeping the container origin.
    pub fn set_item_extents(&mut self, extents: &[f64]) {
        let origin = self.container.origin();
        let cross = self.container.extent(self.axis.cross());
        self.lay_out(origin, extents, cross);
    }

    pub fn set_offset(&mut self, region: RegionId, offset: f64) {
        let axis = self.axis;
        if let Some(r) = self.region_mut(region) {
            let clamped = offset.clamp(0.0, r.max_offset(axis));
            r.offset = axis.point(clamped, axis.project_cross(r.offset));
        }
    }

    pub fn apply(&mut self, change: &LayoutChange) {
        debug!(?change, "layout change");
        match change {
            LayoutChange::ItemExtents(extents) => self.set_item_extents(extents),
            LayoutChange::Offset { region, offset } => self.set_offset(*region, *offset),
        }
    }

    pub fn offset(&self, region: RegionId) -> f64 {
        self.region(region).map_or(0.0, |r| self.axis.project(r.offset))
    }

    pub fn regions(&self) -> &[SimRegion] { &self.regions }

    pub fn scroll_log(&self) -> &[ScrollCommand] { &self.scroll_log }

    pub fn clear_scroll_log(&mut self) { self.scroll_log.clear(); }

    fn region(&self, id: RegionId) -> Option<&SimRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    fn region_mut(&mut self, id: RegionId) -> Option<&mut SimRegion> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    /// Combined scroll of the regions from `from` outward.
    fn scroll_shift(&self, from: usize) -> Point {
        self.regions[from.min(self.regions.len())..]
            .iter()
            .fold(Point::ZERO, |acc, r| acc.offset(r.offset))
    }

    fn content_shift(&self) -> Point {
        let shift = self.scroll_shift(0);
        Point::new(-shift.x, -shift.y)
    }
}

impl Host for SimHost {
    fn item_rects(&self) -> Vec<Rect> {
        let shift = self.content_shift();
        self.items.iter().map(|r| r.translate(shift)).collect()
    }

    fn container_rect(&self) -> Rect { self.container.translate(self.content_shift()) }

    fn scrollable_ancestors(&self) -> Vec<RegionId> { self.regions.iter().map(|r| r.id).collect() }

    fn region_rect(&self, region: RegionId) -> Rect {
        let Some(index) = self.regions.iter().position(|r| r.id == region) else {
            return Rect::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        };
        let shift = self.scroll_shift(index + 1);
        self.regions[index].rect.translate(Point::new(-shift.x, -shift.y))
    }

    fn scroll_state(&self, region: RegionId, axis: Axis) -> ScrollState {
        match self.region(region) {
            Some(r) => ScrollState::new(
                axis.project(r.offset),
                r.rect.extent(axis),
                axis.project(r.content),
            ),
            None => ScrollState::unmeasured(),
        }
    }

    fn scroll_to(&mut self, region: RegionId, axis: Axis, offset: f64, behavior: ScrollBehavior) {
        let Some(r) = self.region_mut(region) else {
            debug!(?region, "scroll_to on unknown region");
            return;
        };
        let clamped = offset.clamp(0.0, r.max_offset(axis));
        r.offset = axis.point(clamped, axis.project_cross(r.offset));
        trace!(?region, offset = clamped, ?behavior, "sim scroll");
        self.scroll_log.push(ScrollCommand { region, axis, offset: clamped, behavior });
    }

    fn is_draggable(&self, index: usize) -> bool { !self.blocked.contains(&index) }
}
