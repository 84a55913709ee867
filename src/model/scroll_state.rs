use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Direction along the active axis. `Forward` grows the scroll offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScrollDirection {
    Backward,
    Forward,
}

impl ScrollDirection {
    pub fn sign(self) -> f64 {
        match self {
            ScrollDirection::Backward => -1.0,
            ScrollDirection::Forward => 1.0,
        }
    }

    pub fn of(delta: f64) -> Option<ScrollDirection> {
        if delta > 0.0 {
            Some(ScrollDirection::Forward)
        } else if delta < 0.0 {
            Some(ScrollDirection::Backward)
        } else {
            None
        }
    }

    pub fn reverse(self) -> ScrollDirection {
        match self {
            ScrollDirection::Backward => ScrollDirection::Forward,
            ScrollDirection::Forward => ScrollDirection::Backward,
        }
    }
}

/// Snapshot of one scrollable region along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    pub offset: f64,
    /// Visible extent of the region.
    pub extent: f64,
    /// Total content extent.
    pub scrollable_extent: f64,
}

impl ScrollState {
    pub fn new(offset: f64, extent: f64, scrollable_extent: f64) -> Self {
        ScrollState { offset, extent, scrollable_extent }
    }

    /// State of a region that has no layout yet.
    pub fn unmeasured() -> Self { ScrollState::new(f64::NAN, f64::NAN, f64::NAN) }

    pub fn is_measured(&self) -> bool {
        !(self.offset.is_nan() || self.extent.is_nan() || self.scrollable_extent.is_nan())
    }

    /// Whether the region cannot scroll any further in `direction`.
    /// Unmeasured regions always report true so they are never scrolled.
    pub fn is_to_end(&self, direction: ScrollDirection) -> bool {
        if !self.is_measured() {
            return true;
        }
        match direction {
            ScrollDirection::Forward => {
                (self.offset + self.extent).round() >= self.scrollable_extent.round()
            }
            ScrollDirection::Backward => self.offset <= 0.0,
        }
    }

    /// Largest offset the region accepts.
    pub fn max_offset(&self) -> f64 { (self.scrollable_extent - self.extent).max(0.0) }
}
