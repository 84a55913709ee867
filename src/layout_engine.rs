//! Geometry of one drag: where the group sits in the sequence and how it
//! relates to the scrollable regions around it.

pub mod index;
pub mod viewport;

pub use index::ItemIndex;
pub use viewport::{RegionSnapshot, ViewportState, drop_alignment, minimum_viewport};
