//! Stand-in simulation used to drive the navigation core from the CLI.

pub mod scenarios;
pub mod vehicle;

pub use scenarios::{random_scene, RandomSceneConfig};
pub use vehicle::{KinematicVehicle, VehicleParams};
