//! Maps pointer displacement onto positions in the item sequence.
//!
//! Item extents along the axis are folded into a prefix table once per drag
//! so that every sample is a binary search instead of a walk over the items.

use tracing::trace;

use crate::model::error::DragError;
use crate::model::geometry::{Axis, Rect};
use crate::model::session::Group;

/// Fraction of an item's extent that must be crossed before the dragged
/// group is considered past it.
const CROSS_THRESHOLD: f64 = 0.5;

#[derive(Clone, Debug)]
pub struct ItemIndex {
    axis: Axis,
    rects: Vec<Rect>,
    extents: Vec<f64>,
    /// `sums[i]` is the combined extent of items `0..=i`.
    sums: Vec<f64>,
    /// Leading edge of the first item; every offset is relative to it.
    origin: f64,
}

impl ItemIndex {
    pub fn new(axis: Axis, rects: Vec<Rect>) -> Result<ItemIndex, DragError> {
        let Some(first) = rects.first() else {
            return Err(DragError::NoItems);
        };
        let origin = first.leading(axis);
        let extents: Vec<f64> = rects.iter().map(|r| r.extent(axis).max(0.0)).collect();
        let sums = extents
            .iter()
            .scan(0.0, |total, extent| {
                *total += extent;
                Some(*total)
            })
            .collect();
        Ok(ItemIndex { axis, rects, extents, sums, origin })
    }

    pub fn axis(&self) -> Axis { self.axis }

    pub fn len(&self) -> usize { self.rects.len() }

    pub fn is_empty(&self) -> bool { self.rects.is_empty() }

    pub fn rects(&self) -> &[Rect] { &self.rects }

    pub fn extent(&self, index: usize) -> f64 { self.extents.get(index).copied().unwrap_or(0.0) }

    pub fn total_extent(&self) -> f64 { self.sums.last().copied().unwrap_or(0.0) }

    /// Offset of the item's leading edge from the first item's leading edge.
    pub fn leading_offset(&self, index: usize) -> f64 {
        match index.checked_sub(1) {
            Some(prev) => self.sums[prev.min(self.sums.len() - 1)],
            None => 0.0,
        }
    }

    /// Converts a coordinate on the axis (same space as the item rects) into
    /// an offset from the first item.
    pub fn offset_of(&self, coordinate: f64) -> f64 { coordinate - self.origin }

    /// First item whose trailing edge is at or past `offset`.
    fn search(&self, offset: f64) -> usize { self.sums.partition_point(|sum| *sum < offset) }

    /// Finds the item under `coordinate`. Coordinates outside the items are
    /// reported, never clamped.
    pub fn locate(&self, coordinate: f64) -> Result<usize, DragError> {
        let offset = self.offset_of(coordinate);
        let extent = self.total_extent();
        if !(0.0..=extent).contains(&offset) {
            return Err(DragError::OutOfBounds { offset, extent });
        }
        let index = self.search(offset);
        if index >= self.len() {
            return Err(DragError::OutOfBounds { offset, extent });
        }
        Ok(index)
    }

    /// Picks the group the press on `index` drags. A group whose first member
    /// is `index` wins; otherwise the narrowest group containing it.
    pub fn resolve_group(&self, index: usize, groups: &[Group]) -> Group {
        let len = self.len();
        let valid = groups.iter().filter(|g| g.is_valid_for(len));
        if let Some(group) = valid.clone().find(|g| g.start == index) {
            return *group;
        }
        valid
            .filter(|g| g.contains(index))
            .min_by_key(|g| g.span())
            .copied()
            .unwrap_or(Group::single(index))
    }

    pub fn group_extent(&self, group: Group) -> f64 {
        (group.start..=group.end).map(|i| self.extent(i)).sum()
    }

    /// Bounding rect of the group: extents add up along the axis, the cross
    /// axis takes the widest member.
    pub fn group_rect(&self, group: Group) -> Rect {
        let Some(first) = self.rects.get(group.start) else {
            return Rect::default();
        };
        let main = self.group_extent(group);
        let cross = (group.start..=group.end.min(self.len() - 1))
            .map(|i| self.rects[i].extent(self.axis.cross()))
            .fold(0.0, f64::max);
        let size = self.axis.point(main, cross);
        Rect::new(first.x, first.y, size.x, size.y)
    }

    /// Index the group's leading item would occupy after moving by
    /// `displacement` along the axis.
    ///
    /// An item only counts as crossed once the group's leading (or trailing,
    /// when moving forward) edge is at least halfway over it.
    pub fn current_index(&self, group: Group, displacement: f64) -> usize {
        let len = self.len();
        if displacement == 0.0 || !displacement.is_finite() || len == 0 {
            return group.start;
        }
        let forward = displacement > 0.0;
        let head = self.leading_offset(group.start) + displacement;
        let probe = if forward { head + self.group_extent(group) } else { head };

        let p = self.search(probe).min(len - 1);
        let overshoot = if forward {
            probe - p.checked_sub(1).map_or(0.0, |prev| self.sums[prev])
        } else {
            self.sums[p] - probe
        };
        let crossed = self.extents[p] * CROSS_THRESHOLD <= overshoot;
        trace!(probe, p, overshoot, crossed, "index probe");

        if forward {
            let trailing = if crossed { p } else { p.saturating_sub(1) };
            trailing.saturating_sub(group.span()).clamp(group.start, len - group.len())
        } else {
            let leading = if crossed { p } else { p + 1 };
            leading.min(group.start)
        }
    }

    /// Translation each item needs so the group fits at `to`. Group members
    /// get zero; the visual layer moves them with the pointer.
    pub fn items_offset(&self, group: Group, to: usize) -> Vec<f64> {
        let shift = self.group_extent(group);
        (0..self.len())
            .map(|i| {
                if group.contains(i) {
                    0.0
                } else if i > group.end && i <= to + group.span() {
                    -shift
                } else if i >= to && i < group.start {
                    shift
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Signed extent of the items the group passes when moving to `to`.
    pub fn justified_offset(&self, group: Group, to: usize) -> f64 {
        if to > group.start {
            let last = (to + group.span()).min(self.len() - 1);
            ((group.end + 1)..=last).map(|i| self.extent(i)).sum()
        } else if to < group.start {
            -(to..group.start).map(|i| self.extent(i)).sum::<f64>()
        } else {
            0.0
        }
    }

    /// Where the group comes to rest at `to`, given how far the container
    /// moved since the press.
    pub fn justified_rect(&self, group: Group, to: usize, container_delta: f64) -> Rect {
        self.group_rect(group)
            .translate_along(self.axis, self.justified_offset(group, to) + container_delta)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::ItemIndex;
    use crate::model::error::DragError;
    use crate::model::geometry::{Axis, Rect};
    use crate::model::session::Group;

    fn column(extents: &[f64]) -> ItemIndex {
        let mut y = 0.0;
        let rects = extents
            .iter()
            .map(|h| {
                let r = Rect::new(0.0, y, 100.0, *h);
                y += h;
                r
            })
            .collect();
        ItemIndex::new(Axis::Vertical, rects).expect("items")
    }

    #[test]
    fn empty_layout_is_rejected() {
        assert_eq!(ItemIndex::new(Axis::Vertical, vec![]).err(), Some(DragError::NoItems));
    }

    #[test]
    fn locate_finds_item_under_pointer() {
        let index = column(&[50.0, 30.0, 20.0]);
        assert_eq!(index.locate(0.0), Ok(0));
        assert_eq!(index.locate(49.0), Ok(0));
        assert_eq!(index.locate(50.0), Ok(0));
        assert_eq!(index.locate(50.5), Ok(1));
        assert_eq!(index.locate(99.0), Ok(2));
        assert_eq!(index.locate(100.0), Ok(2));
    }

    #[test]
    fn locate_reports_out_of_bounds() {
        let index = column(&[50.0, 50.0]);
        assert_eq!(index.locate(-1.0), Err(DragError::OutOfBounds { offset: -1.0, extent: 100.0 }));
        assert_eq!(index.locate(101.0), Err(DragError::OutOfBounds { offset: 101.0, extent: 100.0 }));
    }

    #[test]
    fn locate_is_relative_to_first_item() {
        let rects = vec![Rect::new(0.0, 200.0, 10.0, 40.0), Rect::new(0.0, 240.0, 10.0, 40.0)];
        let index = ItemIndex::new(Axis::Vertical, rects).expect("items");
        assert_eq!(index.locate(250.0), Ok(1));
        assert!(index.locate(150.0).is_err());
    }

    #[test]
    fn displacement_short_of_midpoint_keeps_index() {
        let index = column(&[50.0; 6]);
        let group = Group::single(0);
        assert_eq!(index.current_index(group, 120.0), 2);
        assert_eq!(index.current_index(group, 124.9), 2);
        assert_eq!(index.current_index(group, 125.0), 3);
        assert_eq!(index.current_index(group, 24.0), 0);
        assert_eq!(index.current_index(group, 25.0), 1);
    }

    #[test]
    fn zero_displacement_keeps_start() {
        let index = column(&[50.0; 6]);
        assert_eq!(index.current_index(Group::single(3), 0.0), 3);
        assert_eq!(index.current_index(Group::new(2, 3), 0.0), 2);
    }

    #[test]
    fn backward_moves_cross_at_midpoint() {
        let index = column(&[50.0; 6]);
        let group = Group::single(3);
        assert_eq!(index.current_index(group, -20.0), 3);
        assert_eq!(index.current_index(group, -25.0), 2);
        assert_eq!(index.current_index(group, -60.0), 2);
        assert_eq!(index.current_index(group, -75.0), 1);
    }

    #[test]
    fn displacement_beyond_the_list_clamps() {
        let index = column(&[50.0; 4]);
        assert_eq!(index.current_index(Group::single(1), 1_000.0), 3);
        assert_eq!(index.current_index(Group::single(2), -1_000.0), 0);
    }

    #[test]
    fn groups_report_their_leading_item() {
        let index = column(&[50.0; 6]);
        let group = Group::new(2, 3);
        assert_eq!(index.current_index(group, 30.0), 3);
        assert_eq!(index.current_index(group, 80.0), 4);
        assert_eq!(index.current_index(group, 500.0), 4);
        assert_eq!(index.current_index(group, -30.0), 1);
        assert_eq!(index.current_index(group, -500.0), 0);
        // never inside itself
        assert_eq!(index.current_index(group, 1.0), 2);
        assert_eq!(index.current_index(group, -1.0), 2);
    }

    #[test]
    fn index_stays_in_bounds_and_moves_one_step_at_a_time() {
        let index = column(&[30.0, 60.0, 45.0, 20.0, 80.0]);
        let group = Group::single(2);
        let mut last = index.current_index(group, -200.0);
        let mut d = -200.0;
        while d <= 200.0 {
            let current = index.current_index(group, d);
            assert!(current < index.len());
            assert!(current.abs_diff(last) <= 1, "jump at {d}: {last} -> {current}");
            last = current;
            d += 5.0;
        }
    }

    #[test]
    fn group_resolution_prefers_groups_starting_at_index() {
        let index = column(&[10.0; 8]);
        let groups = [Group::new(1, 5), Group::new(2, 3), Group::new(6, 20)];
        assert_eq!(index.resolve_group(2, &groups), Group::new(2, 3));
        assert_eq!(index.resolve_group(3, &groups), Group::new(2, 3));
        assert_eq!(index.resolve_group(4, &groups), Group::new(1, 5));
        assert_eq!(index.resolve_group(0, &groups), Group::single(0));
        // invalid group ignored
        assert_eq!(index.resolve_group(6, &groups), Group::single(6));
    }

    #[test]
    fn items_offset_makes_room() {
        let index = column(&[50.0; 5]);
        assert_eq!(
            index.items_offset(Group::single(0), 2),
            vec![0.0, -50.0, -50.0, 0.0, 0.0]
        );
        assert_eq!(
            index.items_offset(Group::new(3, 4), 1),
            vec![0.0, 100.0, 100.0, 0.0, 0.0]
        );
        assert_eq!(index.items_offset(Group::single(2), 2), vec![0.0; 5]);
    }

    #[test]
    fn justified_offset_sums_crossed_items() {
        let index = column(&[40.0; 4]);
        assert_eq!(index.justified_offset(Group::single(0), 3), 120.0);
        assert_eq!(index.justified_offset(Group::single(3), 1), -80.0);
        assert_eq!(index.justified_offset(Group::single(2), 2), 0.0);

        let mixed = column(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(mixed.justified_offset(Group::new(0, 1), 2), 70.0);
        assert_eq!(mixed.justified_offset(Group::new(2, 3), 0), -30.0);
    }

    #[test]
    fn justified_rect_includes_container_movement() {
        let index = column(&[40.0; 4]);
        let rect = index.justified_rect(Group::single(0), 3, -25.0);
        assert_eq!(rect, Rect::new(0.0, 95.0, 100.0, 40.0));
    }

    #[test]
    fn group_rect_merges_members() {
        let index = column(&[10.0, 20.0, 30.0]);
        assert_eq!(index.group_rect(Group::new(1, 2)), Rect::new(0.0, 10.0, 100.0, 50.0));
    }
}
