//! Axis-aware rectangle math.
//!
//! All rectangles handed to the engine share one coordinate space (the host's
//! viewport). Offsets "within" a container are obtained by subtracting the
//! container's leading edge on the active axis.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self { Point { x, y } }

    /// Vector from `self` to `other`.
    pub fn displacement_to(self, other: Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    pub fn offset(self, by: Point) -> Point { Point::new(self.x + by.x, self.y + by.y) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    pub fn min_x(&self) -> f64 { self.x }

    pub fn min_y(&self) -> f64 { self.y }

    pub fn max_x(&self) -> f64 { self.x + self.width }

    pub fn max_y(&self) -> f64 { self.y + self.height }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    /// Bottom-right corner.
    pub fn far_corner(&self) -> Point { Point::new(self.max_x(), self.max_y()) }

    pub fn leading(&self, axis: Axis) -> f64 { axis.project(self.origin()) }

    pub fn trailing(&self, axis: Axis) -> f64 { axis.project(self.far_corner()) }

    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn translate(&self, by: Point) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }

    pub fn translate_along(&self, axis: Axis, delta: f64) -> Rect {
        self.translate(axis.point(delta, 0.0))
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Overlapping area of two rects. Disjoint rects yield a zero-sized rect
    /// anchored at the clamped corner.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.min_x().max(other.min_x());
        let y = self.min_y().max(other.min_y());
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        Rect::new(x, y, (max_x - x).max(0.0), (max_y - y).max(0.0))
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

impl Axis {
    pub fn project(self, point: Point) -> f64 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }

    pub fn project_cross(self, point: Point) -> f64 { self.cross().project(point) }

    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Builds a point from a main-axis and a cross-axis component.
    pub fn point(self, main: f64, cross: f64) -> Point {
        match self {
            Axis::Horizontal => Point::new(main, cross),
            Axis::Vertical => Point::new(cross, main),
        }
    }

    /// Keeps only the main-axis component of `point`.
    pub fn isolate(self, point: Point) -> Point { self.point(self.project(point), 0.0) }
}
