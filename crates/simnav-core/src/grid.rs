//! Uniform occupancy grid over the ground plane.
//!
//! Cells are marked blocked by probing each cell center against the
//! obstacle index. This is point sampling: an obstacle thinner than a cell,
//! or one that misses a cell's center, leaves that cell walkable.

use crate::error::GridError;
use crate::models::{GroundBounds, Point3};
use crate::spatial::ObstacleIndex;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate; `x` indexes columns, `z` indexes rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: usize,
    pub z: usize,
}

impl GridCell {
    pub const fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }
}

#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cell_size: f64,
    origin_x: f64,
    origin_z: f64,
    blocked: Vec<bool>,
}

impl OccupancyGrid {
    /// Fully walkable grid; mostly useful for tests and hand-built maps.
    pub fn open(width: usize, height: usize, cell_size: f64, origin_x: f64, origin_z: f64) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cell_size,
            origin_x,
            origin_z,
            blocked: vec![false; width * height],
        }
    }

    /// Sample `index` at every cell center inside `bounds`.
    ///
    /// Each axis gets `max(1, ceil(extent / cell_size))` cells, so an empty
    /// or zero-area extent still yields a 1x1 grid (empty bounds are placed
    /// at the origin). Grids above `max_cells` are refused.
    pub fn rasterize(
        bounds: &GroundBounds,
        cell_size: f64,
        index: &ObstacleIndex,
        max_cells: usize,
    ) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        let (origin_x, origin_z) = if bounds.is_empty() {
            (0.0, 0.0)
        } else {
            (bounds.min_x, bounds.min_z)
        };
        let cols = (bounds.width() / cell_size).ceil().max(1.0);
        let rows = (bounds.depth() / cell_size).ceil().max(1.0);
        if !(cols * rows).is_finite() || cols * rows > max_cells as f64 {
            return Err(GridError::TooLarge {
                width: cols as usize,
                height: rows as usize,
                limit: max_cells,
            });
        }

        let mut grid = Self::open(cols as usize, rows as usize, cell_size, origin_x, origin_z);
        if !index.is_empty() {
            for gz in 0..grid.height {
                for gx in 0..grid.width {
                    let center = grid.grid_to_world(GridCell::new(gx, gz), 0.0);
                    if index.contains(center.x, center.z) {
                        grid.blocked[gz * grid.width + gx] = true;
                    }
                }
            }
        }

        tracing::debug!(
            width = grid.width,
            height = grid.height,
            cell_size,
            blocked = grid.blocked_count(),
            "rasterized occupancy grid"
        );

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i64, z: i64) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.width && (z as usize) < self.height
    }

    fn offset(&self, cell: GridCell) -> Option<usize> {
        (cell.x < self.width && cell.z < self.height).then(|| cell.z * self.width + cell.x)
    }

    /// Out-of-range cells count as blocked.
    pub fn is_blocked(&self, cell: GridCell) -> bool {
        self.offset(cell).map_or(true, |i| self.blocked[i])
    }

    /// In range and not blocked.
    pub fn is_walkable(&self, cell: GridCell) -> bool {
        !self.is_blocked(cell)
    }

    pub fn set_blocked(&mut self, cell: GridCell, blocked: bool) {
        if let Some(i) = self.offset(cell) {
            self.blocked[i] = blocked;
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|b| **b).count()
    }

    /// Cell containing the ground point; out-of-range coordinates clamp to
    /// the nearest edge cell and NaN maps to cell 0.
    pub fn world_to_grid(&self, x: f64, z: f64) -> GridCell {
        GridCell {
            x: clamp_axis((x - self.origin_x) / self.cell_size, self.width),
            z: clamp_axis((z - self.origin_z) / self.cell_size, self.height),
        }
    }

    /// Center of `cell` at altitude `y`.
    pub fn grid_to_world(&self, cell: GridCell, y: f64) -> Point3 {
        Point3::new(
            self.origin_x + (cell.x as f64 + 0.5) * self.cell_size,
            y,
            self.origin_z + (cell.z as f64 + 0.5) * self.cell_size,
        )
    }
}

fn clamp_axis(scaled: f64, len: usize) -> usize {
    if scaled.is_nan() {
        return 0;
    }
    scaled.floor().clamp(0.0, (len - 1) as f64) as usize
}
