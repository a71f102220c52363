//! Randomly generated obstacle scenes for exercising the planner.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simnav_core::{Point3, SceneNode};

#[derive(Debug, Clone)]
pub struct RandomSceneConfig {
    /// Boxes are placed with centers in `[-extent, extent]` on both axes
    pub extent: f64,
    pub min_half_size: f64,
    pub max_half_size: f64,
    pub max_height: f64,
    /// Boxes never cover a point within this distance of a keep-clear point
    pub clearance: f64,
    /// Fixed seed for reproducible scenes
    pub seed: Option<u64>,
}

impl Default for RandomSceneConfig {
    fn default() -> Self {
        Self {
            extent: 5.0,
            min_half_size: 0.2,
            max_half_size: 0.6,
            max_height: 2.0,
            clearance: 0.3,
            seed: None,
        }
    }
}

/// Place up to `count` random boxes, skipping any that would swallow one of
/// `keep_clear` (typically the mission waypoints).
pub fn random_scene(count: usize, config: &RandomSceneConfig, keep_clear: &[Point3]) -> Vec<SceneNode> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let max_attempts = count * 20;
    let mut nodes = Vec::with_capacity(count);
    let mut attempts = 0;

    while nodes.len() < count && attempts < max_attempts {
        attempts += 1;
        let cx = rng.random_range(-config.extent..=config.extent);
        let cz = rng.random_range(-config.extent..=config.extent);
        let hx = rng.random_range(config.min_half_size..=config.max_half_size);
        let hz = rng.random_range(config.min_half_size..=config.max_half_size);
        let height = rng.random_range(0.5..=config.max_height.max(0.5));

        let blocks_waypoint = keep_clear.iter().any(|p| {
            (p.x - cx).abs() <= hx + config.clearance && (p.z - cz).abs() <= hz + config.clearance
        });
        if blocks_waypoint {
            continue;
        }

        nodes.push(SceneNode::mesh(
            format!("box_{:03}", nodes.len()),
            Point3::new(cx - hx, 0.0, cz - hz),
            Point3::new(cx + hx, height, cz + hz),
        ));
    }

    if nodes.len() < count {
        tracing::warn!(
            requested = count,
            placed = nodes.len(),
            "could not place every random obstacle"
        );
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> RandomSceneConfig {
        RandomSceneConfig {
            seed: Some(seed),
            ..RandomSceneConfig::default()
        }
    }

    #[test]
    fn test_seeded_scenes_are_reproducible() {
        let a = random_scene(8, &seeded(7), &[]);
        let b = random_scene(8, &seeded(7), &[]);
        assert_eq!(a.len(), 8);
        let bounds = |nodes: &[SceneNode]| nodes.iter().map(|n| n.bounds).collect::<Vec<_>>();
        assert_eq!(bounds(&a), bounds(&b));
    }

    #[test]
    fn test_keeps_waypoints_clear() {
        let waypoints = [Point3::new(0.0, 1.0, 0.0), Point3::new(3.0, 1.0, -2.0)];
        let nodes = random_scene(30, &seeded(42), &waypoints);
        for node in &nodes {
            let b = node.bounds.unwrap();
            for p in &waypoints {
                let inside = p.x >= b.min.x && p.x <= b.max.x && p.z >= b.min.z && p.z <= b.max.z;
                assert!(!inside, "{} covers {:?}", node.name, p);
            }
        }
    }
}
