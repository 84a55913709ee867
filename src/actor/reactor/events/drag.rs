use tracing::{debug, trace};

use super::press::PressEventHandler;
use crate::actor::broadcast::{BroadcastEvent, CancelReason};
use crate::actor::reactor::Reactor;
use crate::actor::reactor::managers::{DragState, PressSnapshot};
use crate::layout_engine::{ItemIndex, ViewportState, drop_alignment};
use crate::model::error::DragError;
use crate::model::geometry::{Point, Rect};
use crate::model::intersect::IntersectState;
use crate::model::order::Order;
use crate::model::session::DragSession;
use crate::sys::host::{Host, ScrollBehavior};
use crate::sys::scheduler::FrameScheduler;

pub struct DragEventHandler;

impl DragEventHandler {
    pub fn handle_drag_start<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        pointer: Point,
    ) -> Result<(), DragError> {
        let mut snapshot = match std::mem::take(&mut reactor.drag_manager.state) {
            DragState::StartPending { snapshot, .. } => snapshot,
            other => {
                trace!("drag start without a pending press");
                reactor.drag_manager.state = other;
                return Ok(());
            }
        };
        let container = reactor.host.container_rect();
        if container != snapshot.container_rect {
            debug!("layout moved since the press; measuring again");
            snapshot = PressSnapshot::measure(&reactor.host, &reactor.settings)?;
        }
        let axis = snapshot.index.axis();
        let pressed = match snapshot.index.locate(axis.project(pointer)) {
            Ok(index) => index,
            Err(err) => {
                debug!(%err, "drag start outside the items");
                reactor.drag_manager.reset();
                return Err(err);
            }
        };
        if !reactor.host.is_draggable(pressed) {
            debug!(pressed, "item is not draggable");
            reactor.drag_manager.reset();
            reactor
                .communication_manager
                .emit(BroadcastEvent::Canceled { reason: CancelReason::NotDraggable });
            return Ok(());
        }
        let group = snapshot.index.resolve_group(pressed, &snapshot.groups);
        let session = DragSession::new(group, pointer, snapshot.container_rect);
        debug!(pressed, ?group, "drag start");
        reactor.drag_manager.state = DragState::Dragging { snapshot, session };
        reactor.communication_manager.emit(BroadcastEvent::DragStart { index: group.start, group });
        Self::sample(reactor, Some(pointer), None);
        Ok(())
    }

    pub fn handle_drag_over<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        pointer: Option<Point>,
        container: Option<Rect>,
    ) {
        if !matches!(reactor.drag_manager.state, DragState::Dragging { .. }) {
            trace!(status = %reactor.status(), "drag over ignored");
            return;
        }
        Self::sample(reactor, pointer, container);
    }

    pub fn handle_container_moved<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        rect: Rect,
    ) {
        match reactor.drag_manager.state {
            DragState::Inactive => trace!("container moved while idle"),
            DragState::StartPending { .. } => {
                PressEventHandler::handle_pending_container_move(reactor, rect)
            }
            DragState::Dragging { .. } => Self::sample(reactor, None, Some(rect)),
            DragState::DropSettling { ref mut session, .. } => {
                session.end_container_rect = Some(rect)
            }
        }
    }

    /// Item sizes changed. Rects are measured again and moved back into the
    /// coordinates of the press, so the ongoing drag keeps its reference.
    pub fn handle_resized<H: Host, S: FrameScheduler>(reactor: &mut Reactor<H, S>) {
        let container = reactor.host.container_rect();
        match &mut reactor.drag_manager.state {
            DragState::Inactive => {}
            DragState::StartPending { snapshot, .. } => {
                match PressSnapshot::measure(&reactor.host, &reactor.settings) {
                    Ok(fresh) => *snapshot = fresh,
                    Err(err) => {
                        debug!(%err, "items vanished before the drag started");
                        PressEventHandler::handle_cancel(reactor, CancelReason::ItemsChanged);
                    }
                }
            }
            DragState::Dragging { snapshot, .. } => {
                let rects = reactor.host.item_rects();
                if rects.len() != snapshot.index.len() {
                    debug!(was = snapshot.index.len(), now = rects.len(), "item count changed");
                    PressEventHandler::handle_cancel(reactor, CancelReason::ItemsChanged);
                    return;
                }
                let back = container.origin().displacement_to(snapshot.container_rect.origin());
                let rects = rects.into_iter().map(|r| r.translate(back)).collect();
                match ItemIndex::new(snapshot.index.axis(), rects) {
                    Ok(index) => snapshot.index = index,
                    Err(err) => {
                        debug!(%err, "could not index resized items");
                        PressEventHandler::handle_cancel(reactor, CancelReason::ItemsChanged);
                        return;
                    }
                }
                snapshot.chain = reactor.host.scrollable_ancestors();
                Self::sample(reactor, None, Some(container));
            }
            DragState::DropSettling { session, .. } => {
                session.end_container_rect = Some(container)
            }
        }
    }

    pub fn handle_drop<H: Host, S: FrameScheduler>(reactor: &mut Reactor<H, S>, pointer: Point) {
        match reactor.drag_manager.state {
            DragState::StartPending { .. } => {
                PressEventHandler::handle_cancel(reactor, CancelReason::ReleasedBeforeDelay);
                return;
            }
            DragState::Dragging { .. } => {}
            DragState::Inactive | DragState::DropSettling { .. } => {
                trace!(status = %reactor.status(), "drop ignored");
                return;
            }
        }
        let container = reactor.host.container_rect();
        Self::sample(reactor, Some(pointer), Some(container));

        reactor.scroll_manager.scroller.clear_all(&reactor.host);
        reactor.communication_manager.flush_scroller(&mut reactor.scroll_manager.scroller);
        reactor.scroll_manager.reset();

        let DragState::Dragging { snapshot, mut session } =
            std::mem::take(&mut reactor.drag_manager.state)
        else {
            return;
        };
        session.freeze();
        let index = session.resolved_index();
        reactor.communication_manager.emit(BroadcastEvent::BeforeDrop { index });

        let axis = snapshot.index.axis();
        let target = snapshot.index.justified_rect(
            session.start_group,
            index,
            axis.project(session.container_delta()),
        );
        let regions = snapshot.regions(&reactor.host);
        if let Some((region, offset)) = drop_alignment(axis, target, &regions) {
            debug!(?region, offset, "aligning drop target");
            reactor.host.scroll_to(region, axis, offset, ScrollBehavior::Smooth);
        }
        reactor.drag_manager.state = DragState::DropSettling {
            snapshot,
            session,
            settle_started: reactor.clock,
        };
        reactor.communication_manager.emit(BroadcastEvent::Drop { index });
    }

    /// Finishes a settled drop and publishes the new order.
    pub fn drag_end<H: Host, S: FrameScheduler>(reactor: &mut Reactor<H, S>) {
        let DragState::DropSettling { snapshot, session, .. } =
            std::mem::take(&mut reactor.drag_manager.state)
        else {
            return;
        };
        reactor.drag_manager.reset();
        reactor.scroll_manager.reset();
        let to = session.resolved_index();
        debug!(from = session.start_index, to, "drag end");
        reactor.communication_manager.emit(BroadcastEvent::DragEnd { index: to });
        if session.start_index != to {
            let group = session.start_group;
            let order = Order::identity(snapshot.index.len()).move_group(group.start, group.end, to);
            reactor.communication_manager.emit(BroadcastEvent::OrderChange {
                from: session.start_index,
                to,
                group,
                order,
            });
        }
    }

    /// One drag-over pass: container lock, index, viewport and autoscroll.
    fn sample<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        pointer: Option<Point>,
        container: Option<Rect>,
    ) {
        let Reactor {
            settings,
            host,
            clock,
            drag_manager,
            scroll_manager,
            communication_manager,
            ..
        } = reactor;
        let DragState::Dragging { snapshot, session } = &mut drag_manager.state else {
            return;
        };
        if let Some(pointer) = pointer {
            session.current_pointer = pointer;
        }
        if let Some(rect) = container {
            session.current_container_rect = rect;
        }
        let axis = snapshot.index.axis();

        if settings.lock_to_container {
            let item = snapshot.dragged_rect(session);
            let state = IntersectState::compute(&session.current_container_rect, &item, axis, 0.0);
            match (state.scroll_direction(), state.value) {
                (Some(direction), Some(value)) => {
                    session.current_pointer = session.current_pointer.offset(axis.point(value, 0.0));
                    if !drag_manager.container_edge {
                        drag_manager.container_edge = true;
                        communication_manager.emit(BroadcastEvent::EnterContainerEdge { direction });
                    }
                }
                _ if drag_manager.container_edge => {
                    drag_manager.container_edge = false;
                    communication_manager.emit(BroadcastEvent::LeaveContainerEdge);
                }
                _ => {}
            }
        }

        let displacement = axis.project(session.pointer_delta());
        let index = snapshot.index.current_index(session.start_group, displacement);
        if index != session.current_index {
            let old_current = session.current_index;
            session.set_current_index(index);
            let group = session.start_group;
            let order = Order::identity(snapshot.index.len()).move_group(group.start, group.end, index);
            trace!(old_current, index, "cross");
            communication_manager.emit(BroadcastEvent::Cross {
                from: session.start_index,
                current: index,
                old_current,
                group: session.current_group,
                order,
            });
        }

        let regions = snapshot.regions(&*host);
        let viewport = ViewportState::compute(
            axis,
            snapshot.dragged_rect(session),
            session.current_container_rect,
            &regions,
            settings.edge_threshold,
        );
        let edge = viewport.edge();
        let previous = scroll_manager.viewport.and_then(|v| v.edge());
        if edge != previous {
            if previous.is_some() {
                communication_manager.emit(BroadcastEvent::LeaveEdge);
            }
            if let Some((region, direction)) = edge {
                communication_manager.emit(BroadcastEvent::EnterEdge { region, direction });
            }
        }

        let scroller = &mut scroll_manager.scroller;
        let penetration = viewport.penetration();
        let active = scroller.active_target();
        if let Some((region, direction)) = active {
            let eligible = viewport.should_scroll()
                && viewport.direction() == Some(direction)
                && regions.iter().any(|r| r.id == region && !r.scroll.is_to_end(direction));
            if eligible {
                scroller.set_penetration(region, axis, penetration);
            } else {
                debug!(?region, "autoscroll target no longer eligible");
                scroller.stop(region, axis);
            }
        }
        if !scroller.is_active() && viewport.should_scroll() {
            if let (Some(target), Some(direction)) = (viewport.scroll_target, viewport.direction()) {
                // Handing over to another region: its start follows the old end.
                if let Some((previous, _)) = active.filter(|&(region, _)| region != target.id) {
                    scroller.end(&*host, previous, axis);
                }
                scroller.start(&*host, target.id, axis, direction, penetration, *clock);
            }
        }
        communication_manager.flush_scroller(scroller);

        scroll_manager.regions = regions;
        scroll_manager.viewport = Some(viewport);
        communication_manager.emit(BroadcastEvent::DragOver { index: session.current_index });
    }
}
