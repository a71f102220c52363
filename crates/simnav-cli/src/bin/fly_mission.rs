//! Fly a waypoint mission on the stand-in vehicle.
//!
//! Loads a mission, optionally plans around a scene, selects a controller
//! and ticks guidance at a fixed rate, feeding setpoints to a point-mass
//! vehicle.
//!
//! Usage:
//!   cargo run -p simnav-cli --bin fly_mission -- --waypoints mission.json --random-scene 10

use anyhow::Context;
use clap::Parser;
use simnav_cli::sim::{random_scene, KinematicVehicle, RandomSceneConfig, VehicleParams};
use simnav_cli::{init_tracing, load_scene};
use simnav_core::{Controller, ControllerRequest, NavConfig, NavSession, Point3, Setpoint};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time;

/// Waypoint mission simulator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Waypoint document (versioned object or bare point array)
    #[arg(long)]
    waypoints: PathBuf,

    /// Scene snapshot (node array or {name, nodes})
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Add this many random box obstacles to the scene
    #[arg(long, default_value_t = 0)]
    random_scene: usize,

    /// Seed for --random-scene
    #[arg(long)]
    seed: Option<u64>,

    /// Scene identity used by the `auto` controller (overrides the scene file)
    #[arg(long)]
    scene_name: Option<String>,

    /// Navigation config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Controller: none, auto, waypoints or follow
    #[arg(long, default_value = "waypoints")]
    controller: String,

    /// Target position for `follow`, as x,y,z
    #[arg(long, value_parser = parse_point)]
    target: Option<Point3>,

    /// Fit a smoothed path through the route and fly it
    #[arg(long, default_value_t = false)]
    smooth: bool,

    /// Simulated duration in seconds
    #[arg(long, default_value_t = 30.0)]
    duration: f64,

    /// Guidance rate in Hz
    #[arg(long, default_value_t = 50.0)]
    rate: f64,

    /// Pace ticks against the wall clock
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn parse_point(text: &str) -> Result<Point3, String> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|err| format!("bad coordinate in {text:?}: {err}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got {text:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("fly_mission", args.log_json)?;

    if !(args.rate.is_finite() && args.rate > 0.0) {
        anyhow::bail!("--rate must be positive");
    }

    let config = match &args.config {
        Some(path) => NavConfig::load_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => NavConfig::default(),
    };
    let mut session = NavSession::new(config).context("invalid navigation config")?;
    session
        .load_waypoints_file(&args.waypoints)
        .with_context(|| format!("failed to load waypoints {}", args.waypoints.display()))?;

    let scene = match &args.scene {
        Some(path) => load_scene(path)?,
        None => Default::default(),
    };
    let scene_name = args.scene_name.clone().or(scene.name);
    let mut nodes = scene.nodes;
    if args.random_scene > 0 {
        let random = RandomSceneConfig {
            seed: args.seed,
            ..RandomSceneConfig::default()
        };
        nodes.extend(random_scene(
            args.random_scene,
            &random,
            session.waypoints().positions(),
        ));
    }

    if !nodes.is_empty() {
        let plan = session
            .plan_between_waypoints(&nodes)
            .context("route planning failed")?;
        tracing::info!(points = plan.points.len(), status = ?plan.status(), "planned route");
    }
    if args.smooth {
        let samples = session.build_smoothed_path(None, None).len();
        tracing::info!(samples, "smoothed path");
    }

    if let Some(target) = args.target {
        let targets = session.targets_mut();
        targets.set_enabled(true);
        targets.select("cli-target", target);
    }

    let request: ControllerRequest = args.controller.parse()?;
    let Some(kind) = session.select_controller(request, scene_name.as_deref()) else {
        tracing::warn!(controller = %args.controller, "no controller selected; nothing to fly");
        return Ok(());
    };

    let start = session
        .waypoints()
        .positions()
        .first()
        .copied()
        .unwrap_or(Point3::ZERO);
    let mut vehicle = KinematicVehicle::new(VehicleParams::default(), start);

    let dt = 1.0 / args.rate;
    let ticks = (args.duration.max(0.0) * args.rate).round() as u64;
    let report_every = args.rate.round().max(1.0) as u64;
    let mut interval = time::interval(Duration::from_secs_f64(dt));
    let mut setpoints = 0u64;

    tracing::info!(
        %kind,
        ticks,
        rate = args.rate,
        cruise_altitude = session.config().guidance.waypoint.cruise_altitude,
        "starting mission"
    );

    for tick in 0..ticks {
        if args.realtime {
            interval.tick().await;
        }

        let pose = vehicle.pose();
        let mut sink = |sp: Setpoint| vehicle.command(sp);
        if session.tick_guidance(dt, pose, &mut sink).is_some() {
            setpoints += 1;
        }
        vehicle.step(dt);

        if tick % report_every == 0 {
            let (index, phase) = match session.controller().and_then(Controller::as_waypoint) {
                Some(follower) => (Some(follower.index()), Some(follower.phase())),
                None => (None, None),
            };
            tracing::info!(
                t = tick as f64 * dt,
                x = pose.position.x,
                y = pose.position.y,
                z = pose.position.z,
                speed = vehicle.horizontal_speed(),
                ?index,
                ?phase,
                "vehicle"
            );
        }
    }

    session.select_controller(ControllerRequest::None, None);

    let end = vehicle.pose().position;
    tracing::info!(
        setpoints,
        x = end.x,
        y = end.y,
        z = end.z,
        "mission finished"
    );
    Ok(())
}
