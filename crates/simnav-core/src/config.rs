//! Planner, smoothing and guidance configuration.
//!
//! All sections deserialize with defaults so a partial JSON file only needs
//! the values it overrides. Validate once at the boundary with
//! [`NavConfig::validate`].

use crate::error::ConfigError;
use crate::models::Point3;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_MAX_TILT_RAD: f64 = 20.0 * std::f64::consts::PI / 180.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub planner: PlannerConfig,
    pub smoothing: SmoothingConfig,
    pub guidance: GuidanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Grid cell edge length in world units
    pub cell_size: f64,
    /// Upper bound on `width * height` of the occupancy grid
    pub max_grid_cells: usize,
    /// Upper bound on A* node expansions per segment
    pub max_expansions: usize,
    /// Permit diagonal moves (never across blocked corners)
    pub allow_diagonal: bool,
    /// Scene nodes with these names are never treated as obstacles
    pub ignored_node_names: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.25,
            max_grid_cells: 4_000_000,
            max_expansions: 1_000_000,
            allow_diagonal: false,
            ignored_node_names: vec!["MuJoCo Root".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Control point blending, 0 gives straight segments
    pub tension: f64,
    /// Samples per segment
    pub density: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            tension: 0.5,
            density: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    pub waypoint: WaypointGuidanceConfig,
    pub follow: FollowGuidanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointGuidanceConfig {
    /// Horizontal arrival radius
    pub reached_threshold: f64,
    /// Altitude held while seeking and dwelling
    pub cruise_altitude: f64,
    /// Samples to look ahead on a smoothed path
    pub lookahead_offset: usize,
    /// Proportional gain applied after the arctangent mapping
    pub gain: f64,
    pub max_pitch: f64,
    pub max_roll: f64,
}

impl Default for WaypointGuidanceConfig {
    fn default() -> Self {
        Self {
            reached_threshold: 0.2,
            cruise_altitude: 0.8,
            lookahead_offset: 5,
            gain: 0.3,
            max_pitch: DEFAULT_MAX_TILT_RAD,
            max_roll: DEFAULT_MAX_TILT_RAD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowGuidanceConfig {
    /// Desired position relative to the tracked target
    pub offset: Point3,
    pub gain: f64,
    pub max_pitch: f64,
    pub max_roll: f64,
}

impl Default for FollowGuidanceConfig {
    fn default() -> Self {
        Self {
            offset: Point3::new(0.0, 0.5, 0.8),
            gain: 0.3,
            max_pitch: DEFAULT_MAX_TILT_RAD,
            max_roll: DEFAULT_MAX_TILT_RAD,
        }
    }
}

impl NavConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: NavConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every value that downstream math relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("planner.cell_size", self.planner.cell_size)?;
        if self.planner.max_grid_cells == 0 {
            return Err(ConfigError::TooSmall {
                field: "planner.max_grid_cells",
                value: 0,
                min: 1,
            });
        }
        if self.planner.max_expansions == 0 {
            return Err(ConfigError::TooSmall {
                field: "planner.max_expansions",
                value: 0,
                min: 1,
            });
        }

        non_negative("smoothing.tension", self.smoothing.tension)?;
        if self.smoothing.density < 2 {
            return Err(ConfigError::TooSmall {
                field: "smoothing.density",
                value: self.smoothing.density,
                min: 2,
            });
        }

        let wp = &self.guidance.waypoint;
        positive("guidance.waypoint.reached_threshold", wp.reached_threshold)?;
        finite("guidance.waypoint.cruise_altitude", wp.cruise_altitude)?;
        non_negative("guidance.waypoint.gain", wp.gain)?;
        non_negative("guidance.waypoint.max_pitch", wp.max_pitch)?;
        non_negative("guidance.waypoint.max_roll", wp.max_roll)?;

        let follow = &self.guidance.follow;
        finite("guidance.follow.offset.x", follow.offset.x)?;
        finite("guidance.follow.offset.y", follow.offset.y)?;
        finite("guidance.follow.offset.z", follow.offset.z)?;
        non_negative("guidance.follow.gain", follow.gain)?;
        non_negative("guidance.follow.max_pitch", follow.max_pitch)?;
        non_negative("guidance.follow.max_roll", follow.max_roll)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}
