use tracing::debug;

use super::events::press::PressGesture;
use super::replay::Record;
use crate::actor::broadcast::{BroadcastEvent, BroadcastSender};
use crate::actor::scroller::Scroller;
use crate::common::config::Settings;
use crate::layout_engine::{ItemIndex, RegionSnapshot, ViewportState};
use crate::model::error::DragError;
use crate::model::geometry::Rect;
use crate::model::session::{DragSession, Group};
use crate::sys::host::{Host, RegionId};

/// Geometry captured when the press lands. Item rects are kept in the
/// coordinates they had at that moment.
#[derive(Clone, Debug)]
pub struct PressSnapshot {
    pub index: ItemIndex,
    pub container_rect: Rect,
    pub chain: Vec<RegionId>,
    pub groups: Vec<Group>,
}

impl PressSnapshot {
    pub fn measure<H: Host + ?Sized>(host: &H, settings: &Settings) -> Result<Self, DragError> {
        let index = ItemIndex::new(settings.axis, host.item_rects())?;
        Ok(PressSnapshot {
            index,
            container_rect: host.container_rect(),
            chain: host.scrollable_ancestors(),
            groups: settings.groups(),
        })
    }

    pub fn regions<H: Host + ?Sized>(&self, host: &H) -> Vec<RegionSnapshot> {
        host.snapshot_regions(&self.chain, self.index.axis())
    }

    /// The dragged group where the pointer currently holds it, in client
    /// coordinates.
    pub fn dragged_rect(&self, session: &DragSession) -> Rect {
        let moved = session.start_pointer.displacement_to(session.current_pointer);
        self.index.group_rect(session.start_group).translate(moved)
    }
}

#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Inactive,
    StartPending {
        snapshot: PressSnapshot,
        gesture: PressGesture,
    },
    Dragging {
        snapshot: PressSnapshot,
        session: DragSession,
    },
    DropSettling {
        snapshot: PressSnapshot,
        session: DragSession,
        /// Reactor clock at the drop.
        settle_started: std::time::Duration,
    },
}

impl DragState {
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Dragging { session, .. } | DragState::DropSettling { session, .. } => {
                Some(session)
            }
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&PressSnapshot> {
        match self {
            DragState::Inactive => None,
            DragState::StartPending { snapshot, .. }
            | DragState::Dragging { snapshot, .. }
            | DragState::DropSettling { snapshot, .. } => Some(snapshot),
        }
    }
}

/// Manages the drag lifecycle state
#[derive(Debug, Default)]
pub struct DragManager {
    pub state: DragState,
    /// Whether the dragged item touched the container edge on the last
    /// sample. Only tracked when locked to the container.
    pub container_edge: bool,
}

impl DragManager {
    pub fn reset(&mut self) {
        self.state = DragState::Inactive;
        self.container_edge = false;
    }
}

/// Manages autoscroll and the viewport picture it is driven from
#[derive(Debug, Default)]
pub struct ScrollManager {
    pub scroller: Scroller,
    pub viewport: Option<ViewportState>,
    /// Region rects seen by the last sample, to notice layout movement.
    pub regions: Vec<RegionSnapshot>,
}

impl ScrollManager {
    pub fn reset(&mut self) {
        self.viewport = None;
        self.regions.clear();
    }

    pub fn regions_moved(&self, regions: &[RegionSnapshot]) -> bool {
        self.regions.len() != regions.len()
            || self.regions.iter().zip(regions).any(|(a, b)| a.rect != b.rect)
    }
}

/// Manages outgoing events
#[derive(Debug, Default)]
pub struct CommunicationManager {
    pub event_broadcaster: Option<BroadcastSender>,
}

impl CommunicationManager {
    pub fn emit(&mut self, event: BroadcastEvent) {
        debug!(?event, "emit");
        if let Some(tx) = &self.event_broadcaster {
            _ = tx.send(event);
        }
    }

    /// Publishes whatever the scroller queued since the last flush.
    pub fn flush_scroller(&mut self, scroller: &mut Scroller) {
        for event in scroller.take_events() {
            self.emit(event);
        }
    }
}

/// Manages recording of input events
#[derive(Debug, Default)]
pub struct RecordingManager {
    pub record: Record,
}
