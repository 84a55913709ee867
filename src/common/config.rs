use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::model::geometry::Axis;
use crate::model::session::Group;

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("legato").join("config.toml"))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(text)?;
        let problems = config.settings.validate();
        if !problems.is_empty() {
            anyhow::bail!("invalid settings: {}", problems.join("; "));
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> { Ok(toml::to_string(self)?) }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub axis: Axis,
    /// Inclusive `[start, end]` ranges of items that move together.
    pub groups: Vec<[usize; 2]>,
    /// Distance from a region edge at which autoscroll engages, in px.
    pub edge_threshold: f64,
    /// Keep the dragged item on the drag axis.
    pub lock_cross_axis: bool,
    /// Keep the dragged item inside the container.
    pub lock_to_container: bool,
    #[serde(rename = "transition_duration_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub transition_duration: Duration,
    #[serde(rename = "start_delay_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub start_delay: Duration,
    #[serde(rename = "touch_start_delay_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub touch_start_delay: Duration,
    pub start_offset_tolerance_px: f64,
    pub velocity: VelocityCurve,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            axis: Axis::Vertical,
            groups: Vec::new(),
            edge_threshold: 0.0,
            lock_cross_axis: false,
            lock_to_container: false,
            transition_duration: Duration::from_millis(200),
            start_delay: Duration::ZERO,
            touch_start_delay: Duration::from_millis(200),
            start_offset_tolerance_px: 5.0,
            velocity: VelocityCurve::default(),
        }
    }
}

impl Settings {
    pub fn groups(&self) -> Vec<Group> { self.groups.iter().copied().map(Group::from).collect() }

    /// Human readable problems; empty when the settings are usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for &[start, end] in &self.groups {
            if start > end {
                problems.push(format!("group [{start}, {end}] ends before it starts"));
            }
        }
        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            problems.push(format!("edge_threshold must be >= 0, got {}", self.edge_threshold));
        }
        if !self.start_offset_tolerance_px.is_finite() || self.start_offset_tolerance_px < 0.0 {
            problems.push(format!(
                "start_offset_tolerance_px must be >= 0, got {}",
                self.start_offset_tolerance_px
            ));
        }
        problems.extend(self.velocity.validate());
        problems
    }
}

/// Piecewise-linear autoscroll speed over edge penetration.
///
/// Penetration is signed so that deeper contact is more negative. Between the
/// two calibration points speed is interpolated linearly; outside them it is
/// held at the nearer point's speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VelocityCurve {
    pub scale: f64,
    pub near_penetration: f64,
    pub near_speed: f64,
    pub far_penetration: f64,
    pub far_speed: f64,
}

impl Default for VelocityCurve {
    fn default() -> Self {
        VelocityCurve {
            scale: 3.0,
            near_penetration: -20.0,
            near_speed: 1.0,
            far_penetration: -100.0,
            far_speed: 10.0,
        }
    }
}

impl VelocityCurve {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let values = [
            ("scale", self.scale),
            ("near_penetration", self.near_penetration),
            ("near_speed", self.near_speed),
            ("far_penetration", self.far_penetration),
            ("far_speed", self.far_speed),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                problems.push(format!("velocity.{name} must be finite"));
            }
        }
        if self.far_penetration >= self.near_penetration {
            problems.push("velocity.far_penetration must be below near_penetration".to_string());
        }
        problems
    }
}
