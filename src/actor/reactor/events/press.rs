use std::time::Duration;

use tracing::{debug, trace};

use super::drag::DragEventHandler;
use crate::actor::broadcast::{BroadcastEvent, CancelReason};
use crate::actor::reactor::managers::{DragState, PressSnapshot};
use crate::actor::reactor::{PointerKind, Reactor};
use crate::model::error::DragError;
use crate::model::geometry::{Point, Rect};
use crate::sys::host::Host;
use crate::sys::scheduler::FrameScheduler;

/// Start filter for a press: the drag begins once `delay` has passed,
/// unless the pointer wanders more than `tolerance` first.
#[derive(Clone, Debug, PartialEq)]
pub struct PressGesture {
    pub origin: Point,
    pub origin_container: Rect,
    pub latest: Point,
    pub latest_container: Rect,
    pub pressed_at: Duration,
    pub delay: Duration,
    pub tolerance: f64,
}

impl PressGesture {
    /// Pointer travel relative to the container; scrolling under a still
    /// pointer counts as travel too.
    pub fn travel(&self) -> Point {
        let pointer = self.origin.displacement_to(self.latest);
        let container = self.latest_container.origin().displacement_to(self.origin_container.origin());
        pointer.offset(container)
    }

    pub fn exceeds_tolerance(&self) -> bool {
        let travel = self.travel();
        travel.x.abs() > self.tolerance || travel.y.abs() > self.tolerance
    }

    pub fn is_delayed(&self) -> bool { !self.delay.is_zero() }

    pub fn is_due(&self, now: Duration) -> bool {
        self.is_delayed() && now >= self.pressed_at + self.delay
    }
}

pub struct PressEventHandler;

impl PressEventHandler {
    pub fn handle_press_start<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        pointer: Point,
        kind: PointerKind,
        at: Duration,
    ) -> Result<(), DragError> {
        if !matches!(reactor.drag_manager.state, DragState::Inactive) {
            debug!(status = %reactor.status(), "press ignored while a drag is active");
            return Ok(());
        }
        let snapshot = PressSnapshot::measure(&reactor.host, &reactor.settings)?;
        let axis = reactor.settings.axis;
        let pressed = snapshot.index.locate(axis.project(pointer)).ok();
        let delay = match kind {
            PointerKind::Mouse => reactor.settings.start_delay,
            PointerKind::Touch if reactor.settings.touch_start_delay.is_zero() => {
                reactor.settings.start_delay
            }
            PointerKind::Touch => reactor.settings.touch_start_delay,
        };
        let gesture = PressGesture {
            origin: pointer,
            origin_container: snapshot.container_rect,
            latest: pointer,
            latest_container: snapshot.container_rect,
            pressed_at: at,
            delay,
            tolerance: reactor.settings.start_offset_tolerance_px,
        };
        debug!(?pressed, ?kind, ?delay, "press start");
        reactor.drag_manager.state = DragState::StartPending { snapshot, gesture };
        reactor.communication_manager.emit(BroadcastEvent::PressStart { index: pressed });

        if delay.is_zero() && kind == PointerKind::Touch {
            return DragEventHandler::handle_drag_start(reactor, pointer);
        }
        if !delay.is_zero() {
            reactor.scheduler.request_frame();
        }
        Ok(())
    }

    /// Movement before the drag has started. Without a delay the first move
    /// starts the drag; with one, moving too far cancels the press.
    pub fn handle_press_move<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        pointer: Point,
    ) -> Result<(), DragError> {
        let container = reactor.host.container_rect();
        let DragState::StartPending { gesture, .. } = &mut reactor.drag_manager.state else {
            if matches!(reactor.drag_manager.state, DragState::Dragging { .. }) {
                trace!("press move while dragging; treating as drag over");
                DragEventHandler::handle_drag_over(reactor, Some(pointer), None);
            }
            return Ok(());
        };
        gesture.latest = pointer;
        gesture.latest_container = container;
        if !gesture.is_delayed() {
            return DragEventHandler::handle_drag_start(reactor, pointer);
        }
        if gesture.exceeds_tolerance() {
            Self::handle_cancel(reactor, CancelReason::ExceededOffsetTolerance);
        }
        Ok(())
    }

    /// The container moved while the press is still pending.
    pub fn handle_pending_container_move<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        rect: Rect,
    ) {
        let DragState::StartPending { gesture, .. } = &mut reactor.drag_manager.state else {
            return;
        };
        gesture.latest_container = rect;
        if gesture.is_delayed() && gesture.exceeds_tolerance() {
            Self::handle_cancel(reactor, CancelReason::ExceededOffsetTolerance);
        }
    }

    /// Ends a pending press or a running drag without dropping. Calling it
    /// in any other state does nothing.
    pub fn handle_cancel<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        reason: CancelReason,
    ) {
        match reactor.drag_manager.state {
            DragState::StartPending { .. } => {}
            DragState::Dragging { .. } => {
                reactor.scroll_manager.scroller.clear_all(&reactor.host);
                reactor
                    .communication_manager
                    .flush_scroller(&mut reactor.scroll_manager.scroller);
                reactor.scroll_manager.reset();
            }
            DragState::Inactive | DragState::DropSettling { .. } => {
                trace!(status = %reactor.status(), ?reason, "cancel ignored");
                return;
            }
        }
        debug!(?reason, "drag canceled");
        reactor.drag_manager.reset();
        reactor.communication_manager.emit(BroadcastEvent::Canceled { reason });
    }
}
