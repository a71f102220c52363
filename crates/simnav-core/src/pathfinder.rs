//! A* search over an occupancy grid.
//!
//! Unit cost per orthogonal step with a Manhattan heuristic. Equal-`f`
//! candidates are expanded in insertion order, so identical inputs always
//! yield identical paths.

use crate::grid::{GridCell, OccupancyGrid};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

const ORTHOGONAL: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(i64, i64); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Add diagonal moves; a diagonal never cuts a blocked corner
    pub allow_diagonal: bool,
    /// Give up after this many node expansions
    pub max_expansions: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            allow_diagonal: false,
            max_expansions: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Start-to-goal cells, both ends included
    Found { cells: Vec<GridCell>, expanded: usize },
    /// Open set exhausted without reaching the goal
    Unreachable { expanded: usize },
    /// Expansion budget spent before the goal was reached
    LimitReached { expanded: usize },
}

impl SearchOutcome {
    /// Path cells, empty unless the goal was reached.
    pub fn cells(&self) -> &[GridCell] {
        match self {
            SearchOutcome::Found { cells, .. } => cells,
            _ => &[],
        }
    }

    pub fn into_cells(self) -> Vec<GridCell> {
        match self {
            SearchOutcome::Found { cells, .. } => cells,
            _ => Vec::new(),
        }
    }

    pub fn expanded(&self) -> usize {
        match self {
            SearchOutcome::Found { expanded, .. }
            | SearchOutcome::Unreachable { expanded }
            | SearchOutcome::LimitReached { expanded } => *expanded,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f_score: FloatOrd,
    seq: u64,
    g_score: FloatOrd,
    idx: usize,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

fn heuristic(a: GridCell, b: GridCell, allow_diagonal: bool) -> f64 {
    let dx = a.x.abs_diff(b.x) as f64;
    let dz = a.z.abs_diff(b.z) as f64;
    if allow_diagonal {
        // Octile distance keeps the estimate admissible with diagonal moves.
        let (lo, hi) = if dx < dz { (dx, dz) } else { (dz, dx) };
        hi + (std::f64::consts::SQRT_2 - 1.0) * lo
    } else {
        dx + dz
    }
}

/// Search for a path from `start` to `goal`.
///
/// The start cell is always expandable, even when blocked; a blocked or
/// out-of-range goal is unreachable.
pub fn find_path(
    grid: &OccupancyGrid,
    start: GridCell,
    goal: GridCell,
    options: &SearchOptions,
) -> SearchOutcome {
    let width = grid.width();
    let height = grid.height();
    if start.x >= width || start.z >= height || !grid.is_walkable(goal) {
        return SearchOutcome::Unreachable { expanded: 0 };
    }
    if start == goal {
        return SearchOutcome::Found {
            cells: vec![start],
            expanded: 0,
        };
    }

    let to_idx = |cell: GridCell| cell.z * width + cell.x;
    let to_cell = |idx: usize| GridCell::new(idx % width, idx / width);

    let cell_count = width * height;
    let mut g_score = vec![f64::INFINITY; cell_count];
    let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
    let mut seq = 0u64;

    let start_idx = to_idx(start);
    let goal_idx = to_idx(goal);
    g_score[start_idx] = 0.0;
    open_set.push(Reverse(OpenNode {
        f_score: FloatOrd(heuristic(start, goal, options.allow_diagonal)),
        seq,
        g_score: FloatOrd(0.0),
        idx: start_idx,
    }));

    let mut expanded = 0usize;

    while let Some(Reverse(current)) = open_set.pop() {
        if closed[current.idx] || current.g_score.0 > g_score[current.idx] {
            continue;
        }
        if current.idx == goal_idx {
            return SearchOutcome::Found {
                cells: reconstruct(&came_from, goal_idx, to_cell),
                expanded,
            };
        }
        if expanded >= options.max_expansions {
            return SearchOutcome::LimitReached { expanded };
        }

        closed[current.idx] = true;
        expanded += 1;

        let cell = to_cell(current.idx);
        let moves = ORTHOGONAL
            .iter()
            .map(|step| (*step, 1.0))
            .chain(
                DIAGONAL
                    .iter()
                    .filter(|_| options.allow_diagonal)
                    .map(|step| (*step, std::f64::consts::SQRT_2)),
            );

        for ((dx, dz), cost) in moves {
            let nx = cell.x as i64 + dx;
            let nz = cell.z as i64 + dz;
            if !grid.in_bounds(nx, nz) {
                continue;
            }
            let next = GridCell::new(nx as usize, nz as usize);
            if !grid.is_walkable(next) {
                continue;
            }
            if dx != 0 && dz != 0 && !corner_clear(grid, cell, dx, dz) {
                continue;
            }

            let next_idx = to_idx(next);
            if closed[next_idx] {
                continue;
            }
            let tentative_g = g_score[current.idx] + cost;
            if tentative_g < g_score[next_idx] {
                g_score[next_idx] = tentative_g;
                came_from[next_idx] = Some(current.idx);
                seq += 1;
                open_set.push(Reverse(OpenNode {
                    f_score: FloatOrd(
                        tentative_g + heuristic(next, goal, options.allow_diagonal),
                    ),
                    seq,
                    g_score: FloatOrd(tentative_g),
                    idx: next_idx,
                }));
            }
        }
    }

    SearchOutcome::Unreachable { expanded }
}

/// Both cells sharing an edge with the diagonal move must be walkable.
fn corner_clear(grid: &OccupancyGrid, from: GridCell, dx: i64, dz: i64) -> bool {
    let side_x = GridCell::new((from.x as i64 + dx) as usize, from.z);
    let side_z = GridCell::new(from.x, (from.z as i64 + dz) as usize);
    grid.is_walkable(side_x) && grid.is_walkable(side_z)
}

fn reconstruct(
    came_from: &[Option<usize>],
    goal_idx: usize,
    to_cell: impl Fn(usize) -> GridCell,
) -> Vec<GridCell> {
    let mut cells = vec![to_cell(goal_idx)];
    let mut current = came_from[goal_idx];
    while let Some(idx) = current {
        cells.push(to_cell(idx));
        current = came_from[idx];
    }
    cells.reverse();
    cells
}
