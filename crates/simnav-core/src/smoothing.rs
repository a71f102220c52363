//! Polyline smoothing with piecewise cubic Bezier curves.
//!
//! Each segment `p[i] -> p[i+1]` gets interior control points derived from
//! its neighbours (Catmull-Rom style, scaled by `tension`). Curves are built
//! in the ground plane; altitude is interpolated linearly per segment.

use crate::models::Point3;

#[derive(Debug, Clone, Copy)]
struct Vec2 {
    x: f64,
    z: f64,
}

impl Vec2 {
    fn of(point: &Point3) -> Self {
        Self {
            x: point.x,
            z: point.z,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CubicBezier {
    p0: Vec2,
    c1: Vec2,
    c2: Vec2,
    p1: Vec2,
}

impl CubicBezier {
    fn at(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Vec2 {
            x: a * self.p0.x + b * self.c1.x + c * self.c2.x + d * self.p1.x,
            z: a * self.p0.z + b * self.c1.z + c * self.c2.z + d * self.p1.z,
        }
    }
}

/// Sample a smooth curve through `points`.
///
/// Returns `density` samples per segment (at least 2), including both
/// segment endpoints. Consecutive segments share their boundary point, which
/// therefore appears twice. Fewer than two input points yields no samples.
pub fn build_smoothed_path(points: &[Point3], tension: f64, density: usize) -> Vec<Point3> {
    if points.len() < 2 {
        return Vec::new();
    }

    let density = density.max(2);
    let last = points.len() - 1;
    let k = tension / 6.0;
    let mut samples = Vec::with_capacity(last * density);

    for i in 0..last {
        let p0 = &points[i.saturating_sub(1)];
        let p1 = &points[i];
        let p2 = &points[i + 1];
        let p3 = &points[(i + 2).min(last)];

        let curve = CubicBezier {
            p0: Vec2::of(p1),
            c1: Vec2 {
                x: p1.x + (p2.x - p0.x) * k,
                z: p1.z + (p2.z - p0.z) * k,
            },
            c2: Vec2 {
                x: p2.x - (p3.x - p1.x) * k,
                z: p2.z - (p3.z - p1.z) * k,
            },
            p1: Vec2::of(p2),
        };

        for step in 0..density {
            let t = step as f64 / (density - 1) as f64;
            let ground = curve.at(t);
            let y = p1.y + (p2.y - p1.y) * t;
            samples.push(Point3::new(ground.x, y, ground.z));
        }
    }

    samples
}

/// Holds the most recent smoothed trajectory.
#[derive(Debug, Clone, Default)]
pub struct PathSmoother {
    samples: Vec<Point3>,
}

impl PathSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored trajectory with a new one built from `points`.
    pub fn build(&mut self, points: &[Point3], tension: f64, density: usize) -> &[Point3] {
        self.samples = build_smoothed_path(points, tension, density);
        tracing::debug!(
            input = points.len(),
            samples = self.samples.len(),
            tension,
            "built smoothed path"
        );
        &self.samples
    }

    pub fn samples(&self) -> &[Point3] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
