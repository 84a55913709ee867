use std::time::Duration;

use tracing::trace;

use super::drag::DragEventHandler;
use crate::actor::reactor::Reactor;
use crate::actor::reactor::managers::DragState;
use crate::model::error::DragError;
use crate::sys::host::Host;
use crate::sys::scheduler::FrameScheduler;

pub struct FrameEventHandler;

impl FrameEventHandler {
    pub fn handle_frame<H: Host, S: FrameScheduler>(
        reactor: &mut Reactor<H, S>,
        at: Duration,
    ) -> Result<(), DragError> {
        match reactor.drag_manager.state {
            DragState::Inactive => {}
            DragState::StartPending { ref gesture, .. } => {
                if gesture.is_due(at) {
                    let pointer = gesture.latest;
                    trace!(?at, "start delay elapsed");
                    return DragEventHandler::handle_drag_start(reactor, pointer);
                }
            }
            DragState::Dragging { .. } => Self::advance_drag(reactor),
            DragState::DropSettling { ref mut session, settle_started, .. } => {
                session.end_container_rect = Some(reactor.host.container_rect());
                if at.saturating_sub(settle_started) >= reactor.settings.transition_duration {
                    DragEventHandler::drag_end(reactor);
                }
            }
        }
        Ok(())
    }

    /// Ticks autoscroll, then resamples when the layout moved underneath
    /// the pointer.
    fn advance_drag<H: Host, S: FrameScheduler>(reactor: &mut Reactor<H, S>) {
        reactor.scroll_manager.scroller.tick(&mut reactor.host);
        reactor.communication_manager.flush_scroller(&mut reactor.scroll_manager.scroller);

        let DragState::Dragging { snapshot, session } = &reactor.drag_manager.state else {
            return;
        };
        let container = reactor.host.container_rect();
        let regions = snapshot.regions(&reactor.host);
        if container != session.current_container_rect
            || reactor.scroll_manager.regions_moved(&regions)
        {
            trace!("layout moved under the pointer");
            DragEventHandler::handle_drag_over(reactor, None, Some(container));
        }
    }
}
