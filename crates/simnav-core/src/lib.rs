pub mod config;
pub mod error;
pub mod grid;
pub mod guidance;
pub mod models;
pub mod pathfinder;
pub mod route_planner;
pub mod session;
pub mod smoothing;
pub mod spatial;
pub mod targets;
pub mod waypoints;

pub use config::{
    FollowGuidanceConfig, GuidanceConfig, NavConfig, PlannerConfig, SmoothingConfig,
    WaypointGuidanceConfig,
};
pub use error::{ConfigError, DocumentError, GridError, NavError, PlanError};
pub use grid::{GridCell, OccupancyGrid};
pub use guidance::{
    ActivePath, Controller, ControllerKind, ControllerRequest, Guidance, GuidanceContext,
    GuidancePhase, PathSource, TargetPursuit, WaypointFollower,
};
pub use models::{
    Aabb3, Attitude, Footprint, GroundBounds, NodeKind, Point3, Pose, SceneNode, Setpoint,
};
pub use pathfinder::{find_path, SearchOptions, SearchOutcome};
pub use route_planner::{PlanStatus, RoutePlan, RoutePlanner, SegmentReport, SegmentStatus};
pub use session::{NavSession, SetpointSink};
pub use smoothing::{build_smoothed_path, PathSmoother};
pub use spatial::{IndexSummary, ObstacleIndex};
pub use targets::{TargetSelector, TrackedTarget};
pub use waypoints::{MissionSettings, Waypoint, WaypointStore, DEFAULT_DWELL_SECONDS};
