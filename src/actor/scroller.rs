//! Frame-driven autoscroll.
//!
//! A period is registered per `(region, axis)` and advanced once per frame by
//! [`Scroller::tick`]. Stopping only raises a flag; the period is torn down
//! (and `ScrollEnd` published) on the next tick.

use std::fmt;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace, warn};

use crate::actor::broadcast::BroadcastEvent;
use crate::common::collections::HashMap;
use crate::common::config::VelocityCurve;
use crate::model::geometry::Axis;
use crate::model::scroll_state::ScrollDirection;
use crate::sys::host::{Host, RegionId, ScrollBehavior};

new_key_type! {
    pub struct PeriodKey;
}

pub type VelocityFn = Box<dyn Fn(f64, ScrollDirection) -> f64 + Send>;

/// Maps edge penetration to a per-frame scroll delta.
pub enum Velocity {
    Curve(VelocityCurve),
    Custom(VelocityFn),
}

impl Velocity {
    pub fn delta(&self, penetration: f64, direction: ScrollDirection) -> f64 {
        match self {
            Velocity::Curve(curve) => curve.delta(penetration, direction),
            Velocity::Custom(f) => f(penetration, direction),
        }
    }
}

impl fmt::Debug for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Velocity::Curve(curve) => f.debug_tuple("Curve").field(curve).finish(),
            Velocity::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Default for Velocity {
    fn default() -> Self { Velocity::Curve(VelocityCurve::default()) }
}

impl VelocityCurve {
    pub fn speed(&self, penetration: f64) -> f64 {
        if penetration > self.near_penetration {
            self.near_speed
        } else if penetration < self.far_penetration {
            self.far_speed
        } else {
            let depth = self.near_penetration - penetration;
            let span = self.near_penetration - self.far_penetration;
            self.near_speed + (self.far_speed - self.near_speed) * depth / span
        }
    }

    pub fn delta(&self, penetration: f64, direction: ScrollDirection) -> f64 {
        self.scale * self.speed(penetration) * direction.sign()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScrollPeriod {
    region: RegionId,
    axis: Axis,
    direction: ScrollDirection,
    started_at: Duration,
    stopping: bool,
    penetration: f64,
}

#[derive(Debug, Default)]
pub struct Scroller {
    periods: SlotMap<PeriodKey, ScrollPeriod>,
    by_target: HashMap<(RegionId, Axis), PeriodKey>,
    velocity: Velocity,
    outbox: Vec<BroadcastEvent>,
}

impl Scroller {
    pub fn new(velocity: Velocity) -> Self {
        Scroller {
            velocity,
            ..Default::default()
        }
    }

    pub fn set_velocity(&mut self, velocity: Velocity) { self.velocity = velocity; }

    /// Updates the curve parameters. A custom velocity is left alone.
    pub fn set_curve(&mut self, curve: VelocityCurve) {
        if let Velocity::Curve(current) = &mut self.velocity {
            *current = curve;
        }
    }

    /// Registers a period unless one is already running for the target or the
    /// region cannot move in `direction`. Returns whether a period started.
    pub fn start<H: Host + ?Sized>(
        &mut self,
        host: &H,
        region: RegionId,
        axis: Axis,
        direction: ScrollDirection,
        penetration: f64,
        now: Duration,
    ) -> bool {
        if let Some(&key) = self.by_target.get(&(region, axis)) {
            if !self.periods[key].stopping {
                trace!(?region, "scroll period already active");
                return false;
            }
            self.finish(host, key);
        }
        if host.scroll_state(region, axis).is_to_end(direction) {
            trace!(?region, %direction, "region already at end");
            return false;
        }
        let key = self.periods.insert(ScrollPeriod {
            region,
            axis,
            direction,
            started_at: now,
            stopping: false,
            penetration,
        });
        self.by_target.insert((region, axis), key);
        debug!(?region, %direction, "scroll start");
        self.outbox.push(BroadcastEvent::ScrollStart { region, direction, started_at: now });
        true
    }

    /// Marks the period for teardown on the next tick. Safe to call on
    /// targets that have no period.
    pub fn stop(&mut self, region: RegionId, axis: Axis) {
        if let Some(&key) = self.by_target.get(&(region, axis)) {
            self.periods[key].stopping = true;
        }
    }

    pub fn set_penetration(&mut self, region: RegionId, axis: Axis, penetration: f64) {
        if let Some(&key) = self.by_target.get(&(region, axis)) {
            self.periods[key].penetration = penetration;
        }
    }

    /// Advances every period by one frame.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) {
        let keys: Vec<PeriodKey> = self.periods.keys().collect();
        for key in keys {
            let period = self.periods[key];
            if period.stopping {
                self.finish(host, key);
                continue;
            }
            let state = host.scroll_state(period.region, period.axis);
            if state.is_to_end(period.direction) {
                self.finish(host, key);
                continue;
            }
            let delta = self.velocity.delta(period.penetration, period.direction);
            if !delta.is_finite() {
                warn!(region = ?period.region, delta, "non-finite scroll delta");
                self.outbox.push(BroadcastEvent::ScrollError { region: period.region, delta });
                self.finish(host, key);
                continue;
            }
            let offset = (state.offset + delta).clamp(0.0, state.max_offset());
            host.scroll_to(period.region, period.axis, offset, ScrollBehavior::Instant);
            trace!(region = ?period.region, offset, delta, "scroll");
            self.outbox.push(BroadcastEvent::Scroll { region: period.region, offset, delta });
        }
    }

    /// Ends the target's period now instead of on the next tick.
    pub fn end<H: Host + ?Sized>(&mut self, host: &H, region: RegionId, axis: Axis) {
        if let Some(&key) = self.by_target.get(&(region, axis)) {
            self.finish(host, key);
        }
    }

    /// Ends every period immediately.
    pub fn clear_all<H: Host + ?Sized>(&mut self, host: &H) {
        let keys: Vec<PeriodKey> = self.periods.keys().collect();
        for key in keys {
            self.finish(host, key);
        }
    }

    fn finish<H: Host + ?Sized>(&mut self, host: &H, key: PeriodKey) {
        let Some(period) = self.periods.remove(key) else {
            return;
        };
        self.by_target.remove(&(period.region, period.axis));
        let offset = host.scroll_state(period.region, period.axis).offset;
        debug!(region = ?period.region, offset, "scroll end");
        self.outbox.push(BroadcastEvent::ScrollEnd { region: period.region, offset });
    }

    /// Target of the running (not stopping) period, if any.
    pub fn active_target(&self) -> Option<(RegionId, ScrollDirection)> {
        self.periods.values().find(|p| !p.stopping).map(|p| (p.region, p.direction))
    }

    pub fn is_active(&self) -> bool { self.active_target().is_some() }

    /// Whether any period still needs a tick, including ones winding down.
    pub fn needs_frame(&self) -> bool { !self.periods.is_empty() }

    pub fn take_events(&mut self) -> Vec<BroadcastEvent> { std::mem::take(&mut self.outbox) }
}
