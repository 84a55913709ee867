pub mod error;
pub mod geometry;
pub mod intersect;
pub mod order;
pub mod scroll_state;
pub mod session;

pub use error::DragError;
pub use geometry::{Axis, Point, Rect};
pub use intersect::{IntersectDirection, IntersectState};
pub use order::Order;
pub use scroll_state::{ScrollDirection, ScrollState};
pub use session::{DragSession, Group};
