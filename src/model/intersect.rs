//! Edge relationship between a bounding rect and a target rect along one axis.

use serde::{Deserialize, Serialize};

use crate::model::geometry::{Axis, Rect};
use crate::model::scroll_state::ScrollDirection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IntersectDirection {
    /// Both root edges are within `threshold` of, or beyond, the target's
    /// matching edges: the root span lies inside the target span.
    Inside,
    /// The target sits strictly between the root's edges and is more than
    /// `threshold` away from both.
    Outside,
    /// Only the target's leading edge is at or past the root's leading edge
    /// (within `threshold`). Scrolling would go backward.
    Backward,
    /// Only the target's trailing edge is at or past the root's trailing edge
    /// (within `threshold`). Scrolling would go forward.
    Forward,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectState {
    pub direction: IntersectDirection,
    /// Signed penetration for the two edge cases, `None` otherwise.
    pub value: Option<f64>,
    /// `root.trailing - target.trailing` on the axis.
    pub d_positive: f64,
    /// `root.leading - target.leading` on the axis.
    pub d_negative: f64,
    pub threshold: f64,
    pub axis: Axis,
}

impl IntersectState {
    pub fn compute(root: &Rect, target: &Rect, axis: Axis, threshold: f64) -> IntersectState {
        let d_positive = root.trailing(axis) - target.trailing(axis);
        let d_negative = root.leading(axis) - target.leading(axis);
        let (direction, value) = if d_positive <= threshold && d_negative >= -threshold {
            (IntersectDirection::Inside, None)
        } else if d_positive > threshold && d_negative < -threshold {
            (IntersectDirection::Outside, None)
        } else if d_positive > threshold {
            (IntersectDirection::Backward, Some(d_negative))
        } else {
            (IntersectDirection::Forward, Some(d_positive))
        };
        IntersectState {
            direction,
            value,
            d_positive,
            d_negative,
            threshold,
            axis,
        }
    }

    /// True for the two edge cases, including a penetration of exactly zero.
    pub fn is_intersecting(&self) -> bool {
        matches!(self.direction, IntersectDirection::Forward | IntersectDirection::Backward)
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        match self.direction {
            IntersectDirection::Forward => Some(ScrollDirection::Forward),
            IntersectDirection::Backward => Some(ScrollDirection::Backward),
            _ => None,
        }
    }

    /// Penetration signed so that deeper contact is more negative, regardless
    /// of which edge is touched. Zero when not intersecting.
    pub fn edge_penetration(&self) -> f64 {
        match (self.scroll_direction(), self.value) {
            (Some(direction), Some(value)) => value * direction.sign(),
            _ => 0.0,
        }
    }
}
