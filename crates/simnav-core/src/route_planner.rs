//! Waypoint-to-waypoint route planning over the occupancy grid.
//!
//! One plan rebuilds the obstacle index, rasterizes a single grid covering
//! the obstacles and every waypoint, then searches each consecutive
//! waypoint pair on that grid.

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::grid::{GridCell, OccupancyGrid};
use crate::models::{Point3, SceneNode};
use crate::pathfinder::{find_path, SearchOptions, SearchOutcome};
use crate::spatial::ObstacleIndex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    Routed,
    /// Search exhausted without reaching the goal
    Unreachable,
    /// Expansion budget spent; the goal may still be reachable
    SearchLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentReport {
    /// Index of the segment's start waypoint
    pub from: usize,
    /// Index of the segment's goal waypoint
    pub to: usize,
    pub status: SegmentStatus,
    /// Points this segment contributed after seam deduplication
    pub points: usize,
    pub nodes_expanded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Fewer than two waypoints, nothing was planned
    Empty,
    /// Every segment was routed
    Complete,
    /// At least one segment failed and was left out of `points`
    Partial,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutePlan {
    pub points: Vec<Point3>,
    pub segments: Vec<SegmentReport>,
    pub obstacle_count: usize,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl RoutePlan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PlanStatus {
        if self.segments.is_empty() {
            PlanStatus::Empty
        } else if self
            .segments
            .iter()
            .all(|segment| segment.status == SegmentStatus::Routed)
        {
            PlanStatus::Complete
        } else {
            PlanStatus::Partial
        }
    }

    /// Segments that contributed nothing to `points`.
    pub fn failed_segments(&self) -> impl Iterator<Item = &SegmentReport> {
        self.segments
            .iter()
            .filter(|segment| segment.status != SegmentStatus::Routed)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Plans grid routes between consecutive waypoints.
#[derive(Debug)]
pub struct RoutePlanner {
    config: PlannerConfig,
    index: ObstacleIndex,
}

impl RoutePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let index = ObstacleIndex::with_ignored_names(config.ignored_node_names.iter().cloned());
        Self { config, index }
    }

    /// Obstacle index as of the last plan.
    pub fn obstacle_index(&self) -> &ObstacleIndex {
        &self.index
    }

    /// Plan a route through `waypoints` around the obstacles in `scene`.
    ///
    /// Fewer than two waypoints yields an empty plan. A segment whose search
    /// fails contributes no points; its report carries the reason.
    pub fn plan_between_waypoints(
        &mut self,
        waypoints: &[Point3],
        scene: &[SceneNode],
    ) -> Result<RoutePlan, PlanError> {
        if waypoints.len() < 2 {
            return Ok(RoutePlan::empty());
        }

        let summary = self.index.rebuild(scene);
        let cell_size = self.config.cell_size;

        let mut bounds = summary.bounds;
        for waypoint in waypoints.iter().filter(|wp| wp.is_finite()) {
            bounds.include_point(waypoint.x, waypoint.z);
        }
        let bounds = bounds.expand(cell_size);

        let grid =
            OccupancyGrid::rasterize(&bounds, cell_size, &self.index, self.config.max_grid_cells)?;
        let options = SearchOptions {
            allow_diagonal: self.config.allow_diagonal,
            max_expansions: self.config.max_expansions,
        };

        let mut points: Vec<Point3> = Vec::new();
        let mut last_cell: Option<GridCell> = None;
        let mut segments = Vec::with_capacity(waypoints.len() - 1);

        for (i, pair) in waypoints.windows(2).enumerate() {
            let (start, goal) = (&pair[0], &pair[1]);
            let start_cell = grid.world_to_grid(start.x, start.z);
            let goal_cell = grid.world_to_grid(goal.x, goal.z);

            let outcome = find_path(&grid, start_cell, goal_cell, &options);
            let expanded = outcome.expanded();
            let status = match &outcome {
                SearchOutcome::Found { .. } => SegmentStatus::Routed,
                SearchOutcome::Unreachable { .. } => SegmentStatus::Unreachable,
                SearchOutcome::LimitReached { .. } => SegmentStatus::SearchLimit,
            };
            let cells = outcome.into_cells();

            if status != SegmentStatus::Routed {
                tracing::warn!(
                    from = i,
                    to = i + 1,
                    ?status,
                    nodes_expanded = expanded,
                    "no route for segment"
                );
            }

            let steps = cells.len().saturating_sub(1).max(1) as f64;
            let skip_seam = usize::from(last_cell.is_some() && cells.first() == last_cell.as_ref());
            let before = points.len();
            for (step, cell) in cells.iter().enumerate().skip(skip_seam) {
                let alpha = step as f64 / steps;
                let y = start.y + (goal.y - start.y) * alpha;
                points.push(grid.grid_to_world(*cell, y));
            }
            if let Some(cell) = cells.last() {
                last_cell = Some(*cell);
            }

            segments.push(SegmentReport {
                from: i,
                to: i + 1,
                status,
                points: points.len() - before,
                nodes_expanded: expanded,
            });
        }

        let plan = RoutePlan {
            points,
            segments,
            obstacle_count: summary.count,
            grid_width: grid.width(),
            grid_height: grid.height(),
        };

        tracing::info!(
            waypoints = waypoints.len(),
            obstacles = plan.obstacle_count,
            grid_width = plan.grid_width,
            grid_height = plan.grid_height,
            points = plan.points.len(),
            status = ?plan.status(),
            "planned route"
        );

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SceneNode;

    fn planner() -> RoutePlanner {
        RoutePlanner::new(PlannerConfig::default())
    }

    fn wall(min_x: f64, min_z: f64, max_x: f64, max_z: f64) -> SceneNode {
        SceneNode::mesh(
            "wall",
            Point3::new(min_x, 0.0, min_z),
            Point3::new(max_x, 2.0, max_z),
        )
    }

    #[test]
    fn fewer_than_two_waypoints_is_empty() {
        let mut planner = planner();
        let plan = planner.plan_between_waypoints(&[], &[]).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.status(), PlanStatus::Empty);

        let plan = planner
            .plan_between_waypoints(&[Point3::new(1.0, 1.0, 1.0)], &[])
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn open_scene_interpolates_altitude() {
        let mut planner = planner();
        let waypoints = [Point3::new(0.0, 1.0, 0.0), Point3::new(2.0, 3.0, 1.0)];
        let plan = planner.plan_between_waypoints(&waypoints, &[]).unwrap();

        assert_eq!(plan.status(), PlanStatus::Complete);
        assert!(!plan.points.is_empty());
        let first = plan.points.first().unwrap();
        let last = plan.points.last().unwrap();
        assert!((first.y - 1.0).abs() < 1e-12);
        assert!((last.y - 3.0).abs() < 1e-12);
        for pair in plan.points.windows(2) {
            assert!(pair[1].y >= pair[0].y);
        }
        // Endpoints land in the waypoints' cells.
        assert!(first.horizontal_distance(&waypoints[0]) <= 0.25);
        assert!(last.horizontal_distance(&waypoints[1]) <= 0.25);
    }

    #[test]
    fn routes_around_obstacle_in_the_way() {
        let mut planner = planner();
        let scene = vec![wall(0.8, -1.0, 1.2, 1.0)];
        let waypoints = [Point3::new(0.0, 1.0, 0.0), Point3::new(2.0, 1.0, 0.0)];
        let plan = planner.plan_between_waypoints(&waypoints, &scene).unwrap();

        assert_eq!(plan.status(), PlanStatus::Complete);
        assert_eq!(plan.obstacle_count, 1);
        assert!(plan
            .points
            .iter()
            .all(|p| !planner.obstacle_index().contains(p.x, p.z)));
        // Detour must leave the straight line z = 0.
        assert!(plan.points.iter().any(|p| p.z.abs() > 1.0));
    }

    #[test]
    fn seams_are_deduplicated() {
        let mut planner = planner();
        let waypoints = [
            Point3::new(0.0, 0.5, 0.0),
            Point3::new(1.0, 0.5, 0.0),
            Point3::new(1.0, 0.5, 1.0),
            Point3::new(0.0, 0.5, 1.0),
        ];
        let plan = planner.plan_between_waypoints(&waypoints, &[]).unwrap();
        assert_eq!(plan.segments.len(), 3);
        for pair in plan.points.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        let total: usize = plan.segments.iter().map(|s| s.points).sum();
        assert_eq!(total, plan.points.len());
    }

    #[test]
    fn unreachable_segment_is_dropped_and_reported() {
        let mut planner = planner();
        // The last waypoint sits inside a solid block.
        let scene = vec![wall(2.0, 2.0, 4.0, 4.0)];
        let waypoints = [
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(6.0, 1.0, 0.0),
            Point3::new(3.0, 1.0, 3.0),
        ];
        let plan = planner.plan_between_waypoints(&waypoints, &scene).unwrap();

        assert_eq!(plan.status(), PlanStatus::Partial);
        assert_eq!(plan.segments[0].status, SegmentStatus::Routed);
        assert!(plan.segments[0].points > 0);
        assert_eq!(plan.segments[1].status, SegmentStatus::Unreachable);
        assert_eq!(plan.segments[1].points, 0);
        assert_eq!(plan.failed_segments().count(), 1);
        assert_eq!(plan.points.len(), plan.segments[0].points);
    }

    #[test]
    fn oversized_grid_is_an_error() {
        let mut planner = RoutePlanner::new(PlannerConfig {
            cell_size: 0.01,
            max_grid_cells: 1000,
            ..PlannerConfig::default()
        });
        let waypoints = [Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 0.0, 100.0)];
        let err = planner.plan_between_waypoints(&waypoints, &[]).unwrap_err();
        assert!(matches!(err, PlanError::Grid(_)));
    }
}
