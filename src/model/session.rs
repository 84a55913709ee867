use serde::{Deserialize, Serialize};

use crate::model::geometry::{Point, Rect};

/// Inclusive range of item ordinals that move together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub start: usize,
    pub end: usize,
}

impl Group {
    pub const fn new(start: usize, end: usize) -> Self { Group { start, end } }

    pub const fn single(index: usize) -> Self { Group { start: index, end: index } }

    /// Number of steps between the first and last member (`end - start`).
    pub fn span(&self) -> usize { self.end - self.start }

    pub fn len(&self) -> usize { self.span() + 1 }

    pub fn contains(&self, index: usize) -> bool { self.start <= index && index <= self.end }

    pub fn is_valid_for(&self, len: usize) -> bool { self.start <= self.end && self.end < len }

    /// Same span, starting at `start`.
    pub fn moved_to(&self, start: usize) -> Group { Group::new(start, start + self.span()) }
}

impl From<[usize; 2]> for Group {
    fn from([start, end]: [usize; 2]) -> Self { Group::new(start, end) }
}

/// State of the drag in progress. Owned by the reactor; everything else
/// only ever sees shared references to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    pub start_index: usize,
    pub start_group: Group,
    pub start_pointer: Point,
    pub start_container_rect: Rect,
    pub current_index: usize,
    pub current_group: Group,
    pub current_pointer: Point,
    pub current_container_rect: Rect,
    pub end_index: Option<usize>,
    pub end_container_rect: Option<Rect>,
}

impl DragSession {
    pub fn new(group: Group, pointer: Point, container_rect: Rect) -> Self {
        DragSession {
            start_index: group.start,
            start_group: group,
            start_pointer: pointer,
            start_container_rect: container_rect,
            current_index: group.start,
            current_group: group,
            current_pointer: pointer,
            current_container_rect: container_rect,
            end_index: None,
            end_container_rect: None,
        }
    }

    /// Index the group occupies after the drop, or now if still dragging.
    pub fn resolved_index(&self) -> usize { self.end_index.unwrap_or(self.current_index) }

    pub fn resolved_container_rect(&self) -> Rect {
        self.end_container_rect.unwrap_or(self.current_container_rect)
    }

    /// How far the container has moved since the press.
    pub fn container_delta(&self) -> Point {
        self.start_container_rect.origin().displacement_to(self.resolved_container_rect().origin())
    }

    /// Pointer movement since the press, in container space.
    pub fn pointer_delta(&self) -> Point {
        self.start_pointer
            .displacement_to(self.current_pointer)
            .offset(self.container_delta().displacement_to(Point::ZERO))
    }

    pub fn is_frozen(&self) -> bool { self.end_index.is_some() }

    pub fn freeze(&mut self) {
        self.end_index = Some(self.current_index);
        self.end_container_rect = Some(self.current_container_rect);
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
        self.current_group = self.start_group.moved_to(index);
    }
}
