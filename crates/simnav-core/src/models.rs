//! Core data models for the navigation system.
//!
//! World frame is y-up; the ground plane is x/z.

use serde::{Deserialize, Serialize};

/// A point (or vector) in the simulated scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, other: &Point3) -> Point3 {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y).hypot(self.z)
    }

    /// Unit vector in the same direction, or zero for a zero-length (or
    /// non-finite) vector.
    pub fn normalize_or_zero(&self) -> Point3 {
        let len = self.length();
        if !len.is_finite() || len <= f64::EPSILON {
            return Point3::ZERO;
        }
        Point3::new(self.x / len, self.y / len, self.z / len)
    }

    /// Same point with a different altitude.
    pub fn with_y(&self, y: f64) -> Point3 {
        Point3::new(self.x, y, self.z)
    }

    /// Distance in the ground plane, ignoring altitude.
    pub fn horizontal_distance(&self, other: &Point3) -> f64 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// World-space axis-aligned bounding volume of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// An inverted box (`min > max` on any axis) holds no points.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Projection onto the ground plane.
    pub fn footprint(&self, node: usize) -> Footprint {
        Footprint {
            min_x: self.min.x,
            min_z: self.min.z,
            max_x: self.max.x,
            max_z: self.max.z,
            node,
        }
    }
}

/// Kind of scene node as seen by the planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Renderable geometry; the only kind that can obstruct.
    #[default]
    Mesh,
    Light,
    /// Transform-only grouping node
    Group,
}

/// One entry of the host's scene snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub bounds: Option<Aabb3>,
}

fn default_visible() -> bool {
    true
}

impl SceneNode {
    /// Visible mesh node with the given bounds.
    pub fn mesh(name: impl Into<String>, min: Point3, max: Point3) -> Self {
        Self {
            name: name.into(),
            visible: true,
            kind: NodeKind::Mesh,
            bounds: Some(Aabb3::new(min, max)),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Ground-projected obstacle rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
    /// Index of the source node in the scene snapshot
    pub node: usize,
}

impl Footprint {
    /// Closed containment test (edges count as inside).
    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }
}

/// Ground-plane extent. Starts empty and grows by union.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundBounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl Default for GroundBounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl GroundBounds {
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_z: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }

    pub fn new(min_x: f64, min_z: f64, max_x: f64, max_z: f64) -> Self {
        Self {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_z < self.min_z
    }

    pub fn include_point(&mut self, x: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.min_z = self.min_z.min(z);
        self.max_x = self.max_x.max(x);
        self.max_z = self.max_z.max(z);
    }

    pub fn include_footprint(&mut self, footprint: &Footprint) {
        self.include_point(footprint.min_x, footprint.min_z);
        self.include_point(footprint.max_x, footprint.max_z);
    }

    pub fn union(&self, other: &GroundBounds) -> GroundBounds {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        GroundBounds::new(
            self.min_x.min(other.min_x),
            self.min_z.min(other.min_z),
            self.max_x.max(other.max_x),
            self.max_z.max(other.max_z),
        )
    }

    /// Grow by `margin` on every side. Empty bounds stay empty.
    pub fn expand(&self, margin: f64) -> GroundBounds {
        if self.is_empty() {
            return *self;
        }
        GroundBounds::new(
            self.min_x - margin,
            self.min_z - margin,
            self.max_x + margin,
            self.max_z + margin,
        )
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn depth(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_z - self.min_z
        }
    }
}

/// Vehicle attitude in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

/// Vehicle pose in the scene frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3,
    #[serde(default)]
    pub attitude: Attitude,
}

impl Pose {
    pub fn at(position: Point3) -> Self {
        Self {
            position,
            attitude: Attitude::default(),
        }
    }

    /// Build a pose from a free-joint `qpos` (`x, y, z, qw, qx, qy, qz`,
    /// z-up simulator frame).
    ///
    /// Position is remapped to the y-up scene frame as `(x, z, -y)`.
    /// Returns `None` when fewer than 7 values are supplied.
    pub fn from_sim_qpos(qpos: &[f64]) -> Option<Self> {
        if qpos.len() < 7 {
            return None;
        }
        let position = Point3::new(qpos[0], qpos[2], -qpos[1]);
        let (w, x, y, z) = (qpos[3], qpos[4], qpos[5], qpos[6]);

        // ZYX Euler angles in the simulator frame: roll about x, pitch about y.
        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        Some(Self {
            position,
            attitude: Attitude { pitch, roll, yaw },
        })
    }
}

/// Attitude/altitude request handed to the external stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// Desired pitch in radians
    pub pitch: f64,
    /// Desired roll in radians
    pub roll: f64,
    /// Desired altitude in world units
    pub altitude: f64,
}

impl Setpoint {
    /// Level hover at `altitude`.
    pub fn hold(altitude: f64) -> Self {
        Self {
            pitch: 0.0,
            roll: 0.0,
            altitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.roll.is_finite() && self.altitude.is_finite()
    }
}
