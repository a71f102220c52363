use super::{direction_to_attitude, Guidance, GuidanceContext, PathSource};
use crate::config::WaypointGuidanceConfig;
use crate::models::{Point3, Setpoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidancePhase {
    #[default]
    Seeking,
    Dwelling,
}

/// Steers toward each path point in turn, dwelling on arrival.
#[derive(Debug, Clone)]
pub struct WaypointFollower {
    config: WaypointGuidanceConfig,
    index: usize,
    dwell_elapsed: f64,
    phase: GuidancePhase,
}

impl WaypointFollower {
    pub fn new(config: WaypointGuidanceConfig) -> Self {
        Self {
            config,
            index: 0,
            dwell_elapsed: 0.0,
            phase: GuidancePhase::Seeking,
        }
    }

    /// Index of the path point currently targeted.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> GuidancePhase {
        self.phase
    }

    pub fn dwell_elapsed(&self) -> f64 {
        self.dwell_elapsed
    }

    fn finish_dwell(&mut self, path_len: usize, loop_enabled: bool) {
        self.dwell_elapsed = 0.0;
        self.phase = GuidancePhase::Seeking;
        if self.index + 1 < path_len {
            self.index += 1;
            tracing::debug!(index = self.index, "advanced to next waypoint");
        } else if loop_enabled {
            self.index = 0;
            tracing::debug!("wrapped to first waypoint");
        } else {
            tracing::trace!(index = self.index, "holding at final waypoint");
        }
    }
}

impl Guidance for WaypointFollower {
    fn on_activate(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.index = 0;
        self.dwell_elapsed = 0.0;
        self.phase = GuidancePhase::Seeking;
    }

    fn update(&mut self, ctx: &GuidanceContext<'_>) -> Option<Setpoint> {
        let position = ctx.pose.position;
        if !position.is_finite() {
            return None;
        }
        let path = ctx.path.filter(|path| !path.is_empty())?;
        let points = &path.points;
        let last = points.len() - 1;

        self.index = self.index.min(last);
        let target = points[self.index];
        let distance = position.horizontal_distance(&target);

        if distance < self.config.reached_threshold {
            self.phase = GuidancePhase::Dwelling;
            if ctx.dt.is_finite() && ctx.dt > 0.0 {
                self.dwell_elapsed += ctx.dt;
            }
            if self.dwell_elapsed >= ctx.mission.dwell_seconds {
                self.finish_dwell(points.len(), ctx.mission.loop_enabled);
            }
            return Some(Setpoint::hold(self.config.cruise_altitude));
        }

        if self.phase == GuidancePhase::Dwelling {
            tracing::trace!(index = self.index, distance, "drifted off waypoint");
        }
        self.phase = GuidancePhase::Seeking;
        self.dwell_elapsed = 0.0;

        let aim = match path.source {
            PathSource::Smoothed => points[(self.index + self.config.lookahead_offset).min(last)],
            PathSource::Planned | PathSource::Waypoints => target,
        };
        let dir = Point3::new(aim.x - position.x, 0.0, aim.z - position.z).normalize_or_zero();
        let (pitch, roll) = direction_to_attitude(
            &dir,
            self.config.gain,
            self.config.max_pitch,
            self.config.max_roll,
        );

        tracing::trace!(index = self.index, distance, pitch, roll, "seeking waypoint");

        Some(Setpoint {
            pitch,
            roll,
            altitude: self.config.cruise_altitude,
        })
    }
}
