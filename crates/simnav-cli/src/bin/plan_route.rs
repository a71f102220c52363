//! Plan an obstacle-avoiding route through a waypoint file.
//!
//! Usage:
//!   cargo run -p simnav-cli --bin plan_route -- --waypoints mission.json --scene scene.json --smooth

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use simnav_cli::sim::{random_scene, RandomSceneConfig};
use simnav_cli::{init_tracing, load_scene};
use simnav_core::{NavConfig, NavSession, PlanStatus, Point3, SegmentReport};
use std::path::PathBuf;

/// Route planner for waypoint missions
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

    /// Navigation config JSON; defaults apply to anything it omits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also fit a smoothed path through the route
    #[arg(long, default_value_t = false)]
    smooth: bool,

    /// Smoothing tension (overrides config)
    #[arg(long)]
    tension: Option<f64>,

    /// Smoothing samples per segment (overrides config)
    #[arg(long)]
    density: Option<usize>,

    /// Write the route here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[derive(Serialize)]
struct RouteOutput<'a> {
    status: PlanStatus,
    obstacle_count: usize,
    grid_width: usize,
    grid_height: usize,
    points: &'a [Point3],
    segments: &'a [SegmentReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    smoothed: Option<&'a [Point3]>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("plan_route", args.log_json)?;

    let config = match &args.config {
        Some(path) => NavConfig::load_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => NavConfig::default(),
    };
    let mut session = NavSession::new(config).context("invalid navigation config")?;

    let count = session
        .load_waypoints_file(&args.waypoints)
        .with_context(|| format!("failed to load waypoints {}", args.waypoints.display()))?;
    tracing::info!(waypoints = count, "loaded mission");

    let mut nodes = match &args.scene {
        Some(path) => load_scene(path)?.nodes,
        None => Vec::new(),
    };
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

    session
        .plan_between_waypoints(&nodes)
        .context("route planning failed")?;
    if args.smooth {
        session.build_smoothed_path(args.tension, args.density);
    }

    let plan = session
        .route_plan()
        .context("planner produced no route")?;
    for failed in plan.failed_segments() {
        tracing::warn!(
            from = failed.from,
            to = failed.to,
            status = ?failed.status,
            "segment left out of route"
        );
    }

    let output = RouteOutput {
        status: plan.status(),
        obstacle_count: plan.obstacle_count,
        grid_width: plan.grid_width,
        grid_height: plan.grid_height,
        points: &plan.points,
        segments: &plan.segments,
        smoothed: args.smooth.then(|| session.smoothed_path()),
    };
    let text = serde_json::to_string_pretty(&output)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote route");
        }
        None => println!("{text}"),
    }

    Ok(())
}
