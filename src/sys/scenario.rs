//! Scripted drags against a [`SimHost`], loaded from TOML.
//!
//! ```toml
//! [settings]
//! transition_duration_ms = 0
//!
//! [layout]
//! items = [50, 50, 50, 50]
//!
//! [[steps]]
//! action = "press"
//! x = 10
//! y = 25
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use crate::actor::broadcast::{self, BroadcastEvent, BroadcastReceiver};
use crate::actor::reactor::{Event, FRAME_INTERVAL, PointerKind, Reactor, Record, Status};
use crate::common::config::Settings;
use crate::model::geometry::{Point, Rect};
use crate::sys::host::{Host, RegionId};
use crate::sys::scheduler::ManualScheduler;
use crate::sys::sim::{LayoutChange, SimHost};

fn default_cross_extent() -> f64 { 100.0 }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub settings: Settings,
    pub layout: Layout,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    /// Item extents along the axis, in display order.
    pub items: Vec<f64>,
    #[serde(default = "default_cross_extent")]
    pub cross_extent: f64,
    #[serde(default)]
    pub origin: Point,
    /// Scrollable regions around the container, innermost first.
    #[serde(default)]
    pub regions: Vec<RegionLayout>,
    /// Items the host refuses to drag.
    #[serde(default)]
    pub blocked: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionLayout {
    pub rect: Rect,
    /// Scrollable content extent along the axis.
    pub content: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Press {
        x: f64,
        y: f64,
        #[serde(default)]
        kind: PointerKind,
    },
    /// Starts the pending drag without waiting for the delay.
    Start { x: f64, y: f64 },
    /// Pointer movement; a press move before the start, a drag over after.
    Move { x: f64, y: f64 },
    Frames { count: usize },
    Drop { x: f64, y: f64 },
    Cancel,
    Resize { items: Vec<f64> },
    /// Scrolls a region from outside the engine, as a user's wheel would.
    Scroll { region: u64, offset: f64 },
}

impl Scenario {
    pub fn parse(text: &str) -> anyhow::Result<Scenario> {
        let scenario: Scenario = toml::from_str(text)?;
        let problems = scenario.settings.validate();
        if !problems.is_empty() {
            anyhow::bail!("invalid settings: {}", problems.join("; "));
        }
        Ok(scenario)
    }

    pub fn read(path: &Path) -> anyhow::Result<Scenario> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn host(&self) -> SimHost {
        let layout = &self.layout;
        let mut host = SimHost::new(self.settings.axis, &layout.items, layout.cross_extent)
            .with_container_origin(layout.origin);
        for region in &layout.regions {
            host = host.with_region(region.rect, region.content);
        }
        for &index in &layout.blocked {
            host.block(index);
        }
        host
    }

    /// A reactor over this scenario's host, publishing to the returned
    /// receiver.
    pub fn reactor(&self, record: Record) -> (Reactor<SimHost, ManualScheduler>, BroadcastReceiver) {
        let (tx, rx) = broadcast::channel();
        let reactor =
            Reactor::new(self.settings.clone(), self.host(), ManualScheduler::new(), Some(tx), record);
        (reactor, rx)
    }

    /// Plays every step and returns what the reactor published.
    pub fn run(&self, record: Record) -> Vec<BroadcastEvent> {
        let (mut reactor, mut rx) = self.reactor(record);
        let mut clock = Duration::ZERO;
        let mut events = Vec::new();
        for (n, step) in self.steps.iter().enumerate() {
            debug!(n, ?step, "step");
            for event in step.events(&mut reactor, &mut clock) {
                if let Err(err) = reactor.handle_event(event) {
                    warn!(%err, step = n, "step rejected");
                }
            }
            events.extend(drain(&mut rx));
        }
        events
    }
}

impl Step {
    fn events(&self, reactor: &mut Reactor<SimHost, ManualScheduler>, clock: &mut Duration) -> Vec<Event> {
        match *self {
            Step::Press { x, y, kind } => {
                vec![Event::PressStart { pointer: Point::new(x, y), kind, at: *clock }]
            }
            Step::Start { x, y } => vec![Event::DragStart { pointer: Point::new(x, y) }],
            Step::Move { x, y } => {
                let pointer = Point::new(x, y);
                if reactor.status() == Status::StartPending {
                    vec![Event::PressMove { pointer }]
                } else {
                    vec![Event::DragOver { pointer }]
                }
            }
            Step::Frames { count } => (0..count)
                .map(|_| {
                    *clock += FRAME_INTERVAL;
                    Event::Frame { at: *clock }
                })
                .collect(),
            Step::Drop { x, y } => vec![Event::Drop { pointer: Point::new(x, y) }],
            Step::Cancel => vec![Event::Cancel { reason: broadcast::CancelReason::Aborted }],
            Step::Resize { ref items } => {
                reactor.apply_layout(&LayoutChange::ItemExtents(items.clone()));
                vec![Event::Resized]
            }
            Step::Scroll { region, offset } => {
                reactor.apply_layout(&LayoutChange::Offset { region: RegionId(region), offset });
                vec![Event::ContainerMoved { rect: reactor.host().container_rect() }]
            }
        }
    }
}

/// Everything currently queued on `rx`.
pub fn drain(rx: &mut BroadcastReceiver) -> Vec<BroadcastEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "event receiver lagged"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    events
}
