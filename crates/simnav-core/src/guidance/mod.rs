//! Guidance controllers: turn the vehicle pose into a setpoint each tick.
//!
//! Controllers are a closed set ([`Controller`]) behind the [`Guidance`]
//! trait. Everything a controller reads arrives in a [`GuidanceContext`];
//! the resulting [`Setpoint`] is returned by value.

mod follow;
mod waypoint;

pub use follow::TargetPursuit;
pub use waypoint::{GuidancePhase, WaypointFollower};

use crate::config::GuidanceConfig;
use crate::models::{Point3, Pose, Setpoint};
use crate::waypoints::MissionSettings;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Where the active path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    Planned,
    Smoothed,
    Waypoints,
}

/// The path the waypoint follower steers along.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePath {
    pub points: Vec<Point3>,
    pub source: PathSource,
}

impl ActivePath {
    pub fn new(points: Vec<Point3>, source: PathSource) -> Self {
        Self { points, source }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-tick inputs for a controller.
#[derive(Debug, Clone, Copy)]
pub struct GuidanceContext<'a> {
    /// Seconds since the previous tick
    pub dt: f64,
    pub pose: Pose,
    pub path: Option<&'a ActivePath>,
    pub mission: MissionSettings,
    /// Position of the tracked target, if one is selected
    pub target: Option<Point3>,
}

impl<'a> GuidanceContext<'a> {
    pub fn new(dt: f64, pose: Pose) -> Self {
        Self {
            dt,
            pose,
            path: None,
            mission: MissionSettings::default(),
            target: None,
        }
    }

    pub fn with_path(mut self, path: &'a ActivePath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_mission(mut self, mission: MissionSettings) -> Self {
        self.mission = mission;
        self
    }

    pub fn with_target(mut self, target: Point3) -> Self {
        self.target = Some(target);
        self
    }
}

/// Common controller interface.
pub trait Guidance {
    /// Called when the controller becomes the active one.
    fn on_activate(&mut self) {}

    /// Called when another controller replaces this one.
    fn on_deactivate(&mut self) {}

    /// Drop any accumulated state.
    fn reset(&mut self);

    /// Compute this tick's setpoint; `None` leaves the previous one in place.
    fn update(&mut self, ctx: &GuidanceContext<'_>) -> Option<Setpoint>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    Waypoints,
    Follow,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerKind::Waypoints => f.write_str("waypoints"),
            ControllerKind::Follow => f.write_str("follow"),
        }
    }
}

/// What the host asked for; resolved against the scene by [`resolve`].
///
/// [`resolve`]: ControllerRequest::resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerRequest {
    None,
    #[default]
    Auto,
    Waypoints,
    Follow,
}

/// Scene names containing this get waypoint guidance under `Auto`.
const AERIAL_SCENE_MARKER: &str = "skydio_x2";

impl ControllerRequest {
    pub fn resolve(self, scene_name: Option<&str>) -> Option<ControllerKind> {
        match self {
            ControllerRequest::None => None,
            ControllerRequest::Waypoints => Some(ControllerKind::Waypoints),
            ControllerRequest::Follow => Some(ControllerKind::Follow),
            ControllerRequest::Auto => scene_name
                .filter(|name| name.contains(AERIAL_SCENE_MARKER))
                .map(|_| ControllerKind::Waypoints),
        }
    }
}

/// Case-insensitive; anything unrecognised means `Auto`.
impl FromStr for ControllerRequest {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "none" => ControllerRequest::None,
            "waypoints" => ControllerRequest::Waypoints,
            "follow" => ControllerRequest::Follow,
            _ => ControllerRequest::Auto,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Controller {
    Waypoint(WaypointFollower),
    Follow(TargetPursuit),
}

impl Controller {
    pub fn from_kind(kind: ControllerKind, config: &GuidanceConfig) -> Self {
        match kind {
            ControllerKind::Waypoints => {
                Controller::Waypoint(WaypointFollower::new(config.waypoint.clone()))
            }
            ControllerKind::Follow => Controller::Follow(TargetPursuit::new(config.follow.clone())),
        }
    }

    pub fn kind(&self) -> ControllerKind {
        match self {
            Controller::Waypoint(_) => ControllerKind::Waypoints,
            Controller::Follow(_) => ControllerKind::Follow,
        }
    }

    pub fn as_waypoint(&self) -> Option<&WaypointFollower> {
        match self {
            Controller::Waypoint(follower) => Some(follower),
            Controller::Follow(_) => None,
        }
    }
}

impl Guidance for Controller {
    fn on_activate(&mut self) {
        match self {
            Controller::Waypoint(c) => c.on_activate(),
            Controller::Follow(c) => c.on_activate(),
        }
    }

    fn on_deactivate(&mut self) {
        match self {
            Controller::Waypoint(c) => c.on_deactivate(),
            Controller::Follow(c) => c.on_deactivate(),
        }
    }

    fn reset(&mut self) {
        match self {
            Controller::Waypoint(c) => c.reset(),
            Controller::Follow(c) => c.reset(),
        }
    }

    fn update(&mut self, ctx: &GuidanceContext<'_>) -> Option<Setpoint> {
        match self {
            Controller::Waypoint(c) => c.update(ctx),
            Controller::Follow(c) => c.update(ctx),
        }
    }
}

/// Map a unit steering direction to clamped `(pitch, roll)`.
///
/// Forward along `+x` pitches nose-down (negative pitch); `+z` rolls
/// positive. Non-finite components steer nowhere.
pub(crate) fn direction_to_attitude(
    dir: &Point3,
    gain: f64,
    max_pitch: f64,
    max_roll: f64,
) -> (f64, f64) {
    if !dir.is_finite() {
        return (0.0, 0.0);
    }
    let pitch = clamp_symmetric(-dir.x.atan2(1.0) * gain, max_pitch);
    let roll = clamp_symmetric(dir.z.atan2(1.0) * gain, max_roll);
    (pitch, roll)
}

fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    let limit = limit.abs();
    if !value.is_finite() || limit.is_nan() {
        return 0.0;
    }
    value.max(-limit).min(limit)
}
