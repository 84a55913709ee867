use std::time::Duration;

use super::{Event, PointerKind, Reactor, Record, Status};
use crate::actor::broadcast::{self, BroadcastEvent, BroadcastReceiver, CancelReason};
use crate::common::config::Settings;
use crate::model::error::DragError;
use crate::model::geometry::{Axis, Point, Rect};
use crate::sys::scheduler::ManualScheduler;
use crate::sys::sim::SimHost;

pub const FRAME: Duration = Duration::from_millis(16);

/// Synchronous reactor over a [`SimHost`], stepped by hand.
pub struct Harness {
    pub reactor: Reactor<SimHost, ManualScheduler>,
    events: BroadcastReceiver,
    now: Duration,
}

impl Harness {
    pub fn new(settings: Settings, host: SimHost) -> Harness {
        let (tx, events) = broadcast::channel();
        let reactor = Reactor::new(settings, host, ManualScheduler::new(), Some(tx), Record::default());
        Harness { reactor, events, now: Duration::ZERO }
    }

    /// `count` items of `extent` each in a column starting at the origin.
    pub fn column(settings: Settings, count: usize, extent: f64) -> Harness {
        Harness::new(settings, SimHost::new(Axis::Vertical, &vec![extent; count], 100.0))
    }

    pub fn press(&mut self, x: f64, y: f64) -> Result<(), DragError> {
        self.press_with(x, y, PointerKind::Mouse)
    }

    pub fn press_with(&mut self, x: f64, y: f64, kind: PointerKind) -> Result<(), DragError> {
        let at = self.now;
        self.reactor.handle_event(Event::PressStart { pointer: Point::new(x, y), kind, at })
    }

    pub fn press_move(&mut self, x: f64, y: f64) -> Result<(), DragError> {
        self.reactor.handle_event(Event::PressMove { pointer: Point::new(x, y) })
    }

    /// Press and start right away at the same spot.
    pub fn grab(&mut self, x: f64, y: f64) {
        self.press(x, y).unwrap();
        self.reactor.handle_event(Event::DragStart { pointer: Point::new(x, y) }).unwrap();
    }

    pub fn drag_to(&mut self, x: f64, y: f64) {
        self.reactor.handle_event(Event::DragOver { pointer: Point::new(x, y) }).unwrap();
    }

    pub fn release(&mut self, x: f64, y: f64) {
        self.reactor.handle_event(Event::Drop { pointer: Point::new(x, y) }).unwrap();
    }

    pub fn cancel(&mut self, reason: CancelReason) {
        self.reactor.handle_event(Event::Cancel { reason }).unwrap();
    }

    pub fn container_moved(&mut self, rect: Rect) {
        self.reactor.handle_event(Event::ContainerMoved { rect }).unwrap();
    }

    pub fn resized(&mut self) { self.reactor.handle_event(Event::Resized).unwrap(); }

    pub fn frame(&mut self) -> Result<(), DragError> {
        self.now += FRAME;
        self.reactor.handle_event(Event::Frame { at: self.now })
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frame().unwrap();
        }
    }

    /// Steps frames until the reactor stops asking for them.
    pub fn settle(&mut self) {
        for _ in 0..1_000 {
            if !self.reactor.scheduler().take_request() {
                return;
            }
            self.frame().unwrap();
        }
        panic!("reactor never stopped requesting frames");
    }

    pub fn advance(&mut self, by: Duration) { self.now += by; }

    pub fn status(&self) -> Status { self.reactor.status() }

    pub fn host(&self) -> &SimHost { self.reactor.host() }

    pub fn host_mut(&mut self) -> &mut SimHost { self.reactor.host_mut() }

    pub fn events(&mut self) -> Vec<BroadcastEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn names(&mut self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.name()).collect()
    }

    /// Events emitted so far, minus the per-sample `drag_over` noise.
    pub fn notable(&mut self) -> Vec<BroadcastEvent> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, BroadcastEvent::DragOver { .. } | BroadcastEvent::Scroll { .. }))
            .collect()
    }
}
