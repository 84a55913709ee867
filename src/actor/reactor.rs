//! The Reactor owns the drag state machine.
//!
//! It takes pointer, layout and frame events from the host, keeps the drag
//! session coherent with what is on screen, drives autoscroll, and publishes
//! what happened on the broadcast channel. Everything runs on one logical
//! thread: either synchronously through [`Reactor::handle_event`], or inside
//! the task started by [`Reactor::spawn`].

mod events;
mod managers;
mod query;
mod replay;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests;

use std::thread;
use std::time::{Duration, Instant};

use events::drag::DragEventHandler;
use events::frame::FrameEventHandler;
use events::press::PressEventHandler;
use managers::{CommunicationManager, DragManager, DragState, RecordingManager, ScrollManager};
pub use query::{QueryRequest, ReactorQueryHandle, VisualState};
pub use replay::{Entry, Record, replay};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMicroSeconds, serde_as};
use strum_macros::Display;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, trace};

use crate::actor;
use crate::actor::broadcast::{BroadcastSender, CancelReason};
use crate::actor::scroller::{Scroller, Velocity};
use crate::common::config::Settings;
use crate::model::error::DragError;
use crate::model::geometry::{Point, Rect};
use crate::model::session::DragSession;
use crate::sys::host::Host;
use crate::sys::scheduler::{FrameScheduler, FrameSignal};

pub type Sender = actor::Sender<Event>;
type Receiver = actor::Receiver<Event>;

/// Frame cadence of the async driver.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Inactive,
    StartPending,
    Dragging,
    DropSettling,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    /// A pointer went down. `at` is measured from the driver's clock origin.
    PressStart {
        pointer: Point,
        #[serde(default)]
        kind: PointerKind,
        #[serde_as(as = "DurationMicroSeconds<u64>")]
        at: Duration,
    },

    /// Pointer movement before the drag has started.
    PressMove { pointer: Point },

    /// Starts the pending drag right away, skipping the start delay.
    DragStart { pointer: Point },

    DragOver { pointer: Point },

    /// The container moved without the pointer moving, e.g. because an
    /// ancestor scrolled.
    ContainerMoved { rect: Rect },

    /// Item sizes changed.
    Resized,

    /// The pointer was released.
    Drop { pointer: Point },

    Cancel { reason: CancelReason },

    /// An animation frame.
    Frame {
        #[serde_as(as = "DurationMicroSeconds<u64>")]
        at: Duration,
    },

    ConfigUpdated(Box<Settings>),

    #[serde(skip)]
    Query(QueryRequest),
}

#[derive(Clone)]
pub struct ReactorHandle {
    sender: Sender,
    queries: ReactorQueryHandle,
    origin: Instant,
}

impl ReactorHandle {
    pub fn new(sender: Sender, queries: ReactorQueryHandle, origin: Instant) -> Self {
        Self { sender, queries, origin }
    }

    pub fn sender(&self) -> Sender { self.sender.clone() }

    pub fn send(&self, event: Event) { self.sender.send(event) }

    /// Time on the reactor's clock.
    pub fn now(&self) -> Duration { self.origin.elapsed() }

    pub fn press(&self, pointer: Point, kind: PointerKind) {
        self.send(Event::PressStart { pointer, kind, at: self.now() })
    }
}

impl std::ops::Deref for ReactorHandle {
    type Target = ReactorQueryHandle;

    fn deref(&self) -> &Self::Target { &self.queries }
}

pub struct Reactor<H, S = FrameSignal> {
    settings: Settings,
    host: H,
    scheduler: S,
    /// Time of the latest timestamped event.
    clock: Duration,
    drag_manager: DragManager,
    scroll_manager: ScrollManager,
    communication_manager: CommunicationManager,
    recording_manager: RecordingManager,
}

static_assertions::assert_impl_all!(Reactor<crate::sys::sim::SimHost>: Send);

impl<H: Host + Send + 'static> Reactor<H, FrameSignal> {
    /// Runs the reactor on its own thread. Frames are produced every
    /// [`FRAME_INTERVAL`] while the reactor asks for them.
    pub fn spawn(
        settings: Settings,
        host: H,
        broadcast_tx: Option<BroadcastSender>,
        record: Record,
    ) -> std::io::Result<ReactorHandle> {
        let (events_tx, events) = actor::channel();
        let signal = FrameSignal::new();
        let reactor = Reactor::new(settings, host, signal.clone(), broadcast_tx, record);
        let origin = Instant::now();
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
        thread::Builder::new()
            .name("reactor".to_string())
            .spawn(move || runtime.block_on(Reactor::run(reactor, events, signal, origin)))?;
        let query_handle = ReactorQueryHandle::new(events_tx.clone());
        Ok(ReactorHandle::new(events_tx, query_handle, origin))
    }

    async fn run(mut reactor: Self, mut events: Receiver, signal: FrameSignal, origin: Instant) {
        const MAX_EVENT_BATCH: usize = 64;

        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                received = events.recv() => {
                    let Some((span, event)) = received else {
                        break;
                    };
                    let _guard = span.enter();
                    reactor.handle_loop_event(event);
                    for _ in 1..MAX_EVENT_BATCH {
                        let Ok((span, event)) = events.try_recv() else {
                            break;
                        };
                        let _guard = span.enter();
                        reactor.handle_loop_event(event);
                    }
                }
                _ = frames.tick(), if signal.is_wanted() => {
                    signal.take();
                    reactor.handle_loop_event(Event::Frame { at: origin.elapsed() });
                }
            }
        }
        debug!("reactor channel closed");
    }
}

impl<H: Host, S: FrameScheduler> Reactor<H, S> {
    pub fn new(
        settings: Settings,
        host: H,
        scheduler: S,
        broadcast_tx: Option<BroadcastSender>,
        record: Record,
    ) -> Self {
        let scroller = Scroller::new(Velocity::Curve(settings.velocity));
        Reactor {
            settings,
            host,
            scheduler,
            clock: Duration::ZERO,
            drag_manager: DragManager::default(),
            scroll_manager: ScrollManager { scroller, ..Default::default() },
            communication_manager: CommunicationManager { event_broadcaster: broadcast_tx },
            recording_manager: RecordingManager { record },
        }
    }

    /// Replaces the autoscroll velocity with a custom function.
    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.scroll_manager.scroller.set_velocity(velocity);
        self
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    pub fn host(&self) -> &H { &self.host }

    pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    pub fn scheduler(&self) -> &S { &self.scheduler }

    pub fn status(&self) -> Status {
        match self.drag_manager.state {
            DragState::Inactive => Status::Inactive,
            DragState::StartPending { .. } => Status::StartPending,
            DragState::Dragging { .. } => Status::Dragging,
            DragState::DropSettling { .. } => Status::DropSettling,
        }
    }

    pub fn session(&self) -> Option<&DragSession> { self.drag_manager.state.session() }

    fn handle_loop_event(&mut self, event: Event) {
        if let Err(err) = self.handle_event(event) {
            debug!(%err, "event rejected");
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event=?event))]
    pub fn handle_event(&mut self, event: Event) -> Result<(), DragError> {
        if let Event::Query(req) = event {
            self.handle_query_request(req);
            return Ok(());
        }
        self.recording_manager.record.on_event(&event);

        let result = match event {
            Event::PressStart { pointer, kind, at } => {
                self.clock = self.clock.max(at);
                PressEventHandler::handle_press_start(self, pointer, kind, at)
            }
            Event::PressMove { pointer } => PressEventHandler::handle_press_move(self, pointer),
            Event::DragStart { pointer } => DragEventHandler::handle_drag_start(self, pointer),
            Event::DragOver { pointer } => {
                let container = self.host.container_rect();
                DragEventHandler::handle_drag_over(self, Some(pointer), Some(container));
                Ok(())
            }
            Event::ContainerMoved { rect } => {
                DragEventHandler::handle_container_moved(self, rect);
                Ok(())
            }
            Event::Resized => {
                DragEventHandler::handle_resized(self);
                Ok(())
            }
            Event::Drop { pointer } => {
                DragEventHandler::handle_drop(self, pointer);
                Ok(())
            }
            Event::Cancel { reason } => {
                PressEventHandler::handle_cancel(self, reason);
                Ok(())
            }
            Event::Frame { at } => {
                self.clock = self.clock.max(at);
                FrameEventHandler::handle_frame(self, at)
            }
            Event::ConfigUpdated(settings) => {
                self.scroll_manager.scroller.set_curve(settings.velocity);
                self.settings = *settings;
                Ok(())
            }
            Event::Query(_) => Ok(()),
        };

        self.communication_manager.flush_scroller(&mut self.scroll_manager.scroller);
        if self.wants_frame() {
            trace!(status = %self.status(), "requesting frame");
            self.scheduler.request_frame();
        }
        result
    }

    fn wants_frame(&self) -> bool {
        match &self.drag_manager.state {
            DragState::Inactive => false,
            DragState::StartPending { gesture, .. } => gesture.is_delayed(),
            DragState::Dragging { .. } => self.scroll_manager.scroller.needs_frame(),
            DragState::DropSettling { .. } => true,
        }
    }

    /// Where the dragged group should be drawn. While settling this is the
    /// slot it is settling into.
    pub fn target_rect(&self) -> Option<Rect> {
        match &self.drag_manager.state {
            DragState::Dragging { snapshot, session } => {
                let axis = snapshot.index.axis();
                let mut moved = session.start_pointer.displacement_to(session.current_pointer);
                if self.settings.lock_cross_axis {
                    moved = axis.isolate(moved);
                }
                Some(snapshot.index.group_rect(session.start_group).translate(moved))
            }
            DragState::DropSettling { .. } => self.justified_rect(),
            _ => None,
        }
    }

    /// Per-item translation that opens a gap where the group would land.
    pub fn items_offset(&self) -> Vec<f64> {
        match (self.drag_manager.state.snapshot(), self.session()) {
            (Some(snapshot), Some(session)) => {
                snapshot.index.items_offset(session.start_group, session.resolved_index())
            }
            _ => Vec::new(),
        }
    }

    /// Signed distance from the group's original slot to its current one.
    pub fn placeholder_offset(&self) -> f64 {
        match (self.drag_manager.state.snapshot(), self.session()) {
            (Some(snapshot), Some(session)) => {
                snapshot.index.justified_offset(session.start_group, session.resolved_index())
            }
            _ => 0.0,
        }
    }

    /// Rect of the slot the group currently occupies, in client coordinates.
    pub fn justified_rect(&self) -> Option<Rect> {
        let snapshot = self.drag_manager.state.snapshot()?;
        let session = self.session()?;
        let axis = snapshot.index.axis();
        Some(snapshot.index.justified_rect(
            session.start_group,
            session.resolved_index(),
            axis.project(session.container_delta()),
        ))
    }

    /// Size of the placeholder left behind; `x` is the width, `y` the height.
    pub fn placeholder_size(&self) -> Option<Point> {
        let snapshot = self.drag_manager.state.snapshot()?;
        let rect = snapshot.index.group_rect(self.session()?.start_group);
        Some(Point::new(rect.width, rect.height))
    }
}
