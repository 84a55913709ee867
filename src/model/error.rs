use thiserror::Error;

use crate::model::session::Group;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum DragError {
    /// The press landed outside every measured item along the drag axis.
    #[error("pointer offset {offset} lies outside the item extents [0, {extent}]")]
    OutOfBounds { offset: f64, extent: f64 },

    #[error("velocity function returned a non-finite delta ({delta})")]
    NonFiniteVelocity { delta: f64 },

    #[error("group {group:?} is not valid for {len} items")]
    InvalidGroup { group: Group, len: usize },

    #[error("order of length {len} is not a permutation")]
    NotAPermutation { len: usize },

    #[error("item layout is empty")]
    NoItems,
}
