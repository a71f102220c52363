//! Error types for the navigation core.

use thiserror::Error;

/// Waypoint document could not be loaded or saved.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid waypoint JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("unsupported waypoint document: {0}")]
    Shape(String),
    #[error("unsupported waypoint document version {found} (max {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("dwellSeconds must not be negative (got {0})")]
    InvalidDwell(f64),
    #[error("failed to encode waypoint document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("waypoint file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Occupancy grid could not be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("cell size must be finite and positive (got {0})")]
    InvalidCellSize(f64),
    #[error("route grid too large: {width}x{height} cells exceeds limit {limit}")]
    TooLarge {
        width: usize,
        height: usize,
        limit: usize,
    },
}

/// Route planning failed as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Configuration rejected at the boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be finite and non-negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be at least {min} (got {value})")]
    TooSmall {
        field: &'static str,
        value: usize,
        min: usize,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for callers that want a single type.
#[derive(Debug, Error)]
pub enum NavError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
