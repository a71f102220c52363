//! Ground-plane obstacle index.
//!
//! Scene nodes are projected onto the x/z plane and bulk-loaded into an
//! R-tree so cell-center probes during rasterization stay logarithmic.

use crate::models::{Aabb3, Footprint, GroundBounds, NodeKind, SceneNode};
use rstar::{RTree, RTreeObject, AABB};

#[derive(Debug, Clone)]
struct IndexedFootprint {
    footprint: Footprint,
    env: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFootprint {
    type Envelope = AABB<[f64; 2]>;

    #[inline]
    fn envelope(&self) -> Self::Envelope {
        self.env
    }
}

/// Result of a rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSummary {
    pub count: usize,
    pub bounds: GroundBounds,
}

/// Bulk-loaded 2D index over obstacle footprints.
#[derive(Debug)]
pub struct ObstacleIndex {
    tree: RTree<IndexedFootprint>,
    bounds: GroundBounds,
    ignored_names: Vec<String>,
}

impl Default for ObstacleIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleIndex {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            bounds: GroundBounds::empty(),
            ignored_names: Vec::new(),
        }
    }

    /// Index that never accepts nodes with one of these names.
    pub fn with_ignored_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_names: names.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Replace the index contents with the obstacles found in `nodes`.
    ///
    /// Invisible nodes, lights, groups, nodes without (or with empty or
    /// non-finite) bounds and ignored names are skipped. The new tree is
    /// fully built before it replaces the old one.
    pub fn rebuild<'a, I>(&mut self, nodes: I) -> IndexSummary
    where
        I: IntoIterator<Item = &'a SceneNode>,
    {
        let mut items = Vec::new();
        let mut bounds = GroundBounds::empty();
        let mut skipped = 0usize;

        for (idx, node) in nodes.into_iter().enumerate() {
            let Some(aabb) = self.accept(node) else {
                skipped += 1;
                continue;
            };
            let footprint = aabb.footprint(idx);
            bounds.include_footprint(&footprint);
            items.push(IndexedFootprint {
                footprint,
                env: AABB::from_corners(
                    [footprint.min_x, footprint.min_z],
                    [footprint.max_x, footprint.max_z],
                ),
            });
        }

        let count = items.len();
        self.tree = RTree::bulk_load(items);
        self.bounds = bounds;

        tracing::debug!(obstacles = count, skipped, "rebuilt obstacle index");

        IndexSummary { count, bounds }
    }

    fn accept(&self, node: &SceneNode) -> Option<Aabb3> {
        if !node.visible || node.kind != NodeKind::Mesh {
            return None;
        }
        if self.ignored_names.iter().any(|name| name == &node.name) {
            return None;
        }
        let aabb = node.bounds?;
        if aabb.is_empty() || !aabb.is_finite() {
            return None;
        }
        Some(aabb)
    }

    /// True when any footprint contains the ground point `(x, z)`.
    pub fn contains(&self, x: f64, z: f64) -> bool {
        self.query(x, z).next().is_some()
    }

    /// Footprints containing the ground point `(x, z)`.
    pub fn query(&self, x: f64, z: f64) -> impl Iterator<Item = &Footprint> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, z]))
            .map(|item| &item.footprint)
            .filter(move |footprint| footprint.contains(x, z))
    }

    /// Union of all indexed footprints; empty when there are no obstacles.
    pub fn bounds(&self) -> GroundBounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
