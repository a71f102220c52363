//! simnav CLI - host-side tools for the navigation core.
//!
//! This crate provides the CLI binaries:
//! - plan_route: plan (and optionally smooth) a route through a scene
//! - fly_mission: fly a waypoint mission on a stand-in kinematic vehicle

pub mod scene;
pub mod sim;

pub use scene::{load_scene, SceneFile};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global log subscriber: `RUST_LOG` plus `info` for the core,
/// this crate and the calling binary.
pub fn init_tracing(binary: &str, json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("simnav_core=info".parse()?)
        .add_directive("simnav_cli=info".parse()?)
        .add_directive(format!("{binary}=info").parse()?);

    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
    Ok(())
}
