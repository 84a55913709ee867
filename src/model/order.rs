use serde::{Deserialize, Serialize};

use crate::model::error::DragError;

/// A permutation of item ordinals, in display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(Vec<usize>);

impl Order {
    pub fn identity(len: usize) -> Order { Order((0..len).collect()) }

    pub fn from_vec(order: Vec<usize>) -> Result<Order, DragError> {
        let order = Order(order);
        if order.is_permutation() {
            Ok(order)
        } else {
            Err(DragError::NotAPermutation { len: order.len() })
        }
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn as_slice(&self) -> &[usize] { &self.0 }

    pub fn into_vec(self) -> Vec<usize> { self.0 }

    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.0.len()];
        for &ordinal in &self.0 {
            match seen.get_mut(ordinal) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// Moves the inclusive slice `[start, end]` so that it begins at `to`.
    ///
    /// This is a rotation of the affected span: the moved items keep their
    /// relative order and so do the items they pass. Arguments outside the
    /// order leave it unchanged.
    pub fn move_group(&self, start: usize, end: usize, to: usize) -> Order {
        let len = self.0.len();
        let mut order = self.0.clone();
        if start > end || end >= len || to >= len {
            return Order(order);
        }
        let span = end - start + 1;
        let to = to.min(len - span);
        if to < start {
            order[to..=end].rotate_right(span);
        } else if to > start {
            order[start..to + span].rotate_left(span);
        }
        Order(order)
    }
}

impl AsRef<[usize]> for Order {
    fn as_ref(&self) -> &[usize] { &self.0 }
}
