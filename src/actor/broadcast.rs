use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMicroSeconds, serde_as};

use crate::model::order::Order;
use crate::model::scroll_state::ScrollDirection;
use crate::model::session::Group;
use crate::sys::host::RegionId;

pub type BroadcastSender = tokio::sync::broadcast::Sender<BroadcastEvent>;
pub type BroadcastReceiver = tokio::sync::broadcast::Receiver<BroadcastEvent>;

pub const BROADCAST_CAPACITY: usize = 4096;

pub fn channel() -> (BroadcastSender, BroadcastReceiver) {
    tokio::sync::broadcast::channel(BROADCAST_CAPACITY)
}

/// Why a press or a drag ended without a drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CancelReason {
    /// The pointer moved too far before the start delay elapsed.
    ExceededOffsetTolerance,
    /// The pointer was released before the start delay elapsed.
    ReleasedBeforeDelay,
    /// The host refused to drag the pressed item.
    NotDraggable,
    /// The number of items changed under an active drag.
    ItemsChanged,
    /// The input layer gave up on the gesture.
    Aborted,
}

/// Events published for the visual layer.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum BroadcastEvent {
    PressStart {
        index: Option<usize>,
    },
    Canceled {
        reason: CancelReason,
    },
    DragStart {
        index: usize,
        group: Group,
    },
    DragOver {
        index: usize,
    },
    Cross {
        from: usize,
        current: usize,
        old_current: usize,
        group: Group,
        order: Order,
    },
    EnterEdge {
        region: RegionId,
        direction: ScrollDirection,
    },
    LeaveEdge,
    EnterContainerEdge {
        direction: ScrollDirection,
    },
    LeaveContainerEdge,
    ScrollStart {
        region: RegionId,
        direction: ScrollDirection,
        #[serde_as(as = "DurationMicroSeconds<u64>")]
        started_at: Duration,
    },
    Scroll {
        region: RegionId,
        offset: f64,
        delta: f64,
    },
    ScrollEnd {
        region: RegionId,
        offset: f64,
    },
    ScrollError {
        region: RegionId,
        delta: f64,
    },
    BeforeDrop {
        index: usize,
    },
    Drop {
        index: usize,
    },
    DragEnd {
        index: usize,
    },
    OrderChange {
        from: usize,
        to: usize,
        group: Group,
        order: Order,
    },
}

impl BroadcastEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BroadcastEvent::PressStart { .. } => "press_start",
            BroadcastEvent::Canceled { .. } => "canceled",
            BroadcastEvent::DragStart { .. } => "drag_start",
            BroadcastEvent::DragOver { .. } => "drag_over",
            BroadcastEvent::Cross { .. } => "cross",
            BroadcastEvent::EnterEdge { .. } => "enter_edge",
            BroadcastEvent::LeaveEdge => "leave_edge",
            BroadcastEvent::EnterContainerEdge { .. } => "enter_container_edge",
            BroadcastEvent::LeaveContainerEdge => "leave_container_edge",
            BroadcastEvent::ScrollStart { .. } => "scroll_start",
            BroadcastEvent::Scroll { .. } => "scroll",
            BroadcastEvent::ScrollEnd { .. } => "scroll_end",
            BroadcastEvent::ScrollError { .. } => "scroll_error",
            BroadcastEvent::BeforeDrop { .. } => "before_drop",
            BroadcastEvent::Drop { .. } => "drop",
            BroadcastEvent::DragEnd { .. } => "drag_end",
            BroadcastEvent::OrderChange { .. } => "order_change",
        }
    }
}
