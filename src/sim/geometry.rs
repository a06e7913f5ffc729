//! Geometry primitives shared by the field, collision and playhead code
//!
//! All functions are pure. Queries that need at least one segment fail with
//! `SimError::DegenerateGeometry` instead of returning a meaningless value.

use glam::Vec2;

use crate::error::SimError;

/// Tolerance added to the ray-casting denominator so horizontal edges never divide by zero
pub const RAY_CAST_EPSILON: f32 = 1e-9;

/// Distance from `p` to the finite segment `a`-`b`
///
/// A zero-length segment degrades to the distance to `a`.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let v = b - a;
    let w = p - a;

    let c1 = w.dot(v);
    if c1 <= 0.0 {
        return p.distance(a);
    }
    let c2 = v.length_squared();
    if c2 <= c1 {
        return p.distance(b);
    }
    let t = c1 / c2;
    p.distance(a + v * t)
}

/// Even-odd ray casting test
pub fn point_in_polygon(p: Vec2, vertices: &[Vec2]) -> bool {
    let mut inside = false;
    let n = vertices.len();
    if n == 0 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        let crosses = (vi.y > p.y) != (vj.y > p.y)
            && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y + RAY_CAST_EPSILON) + vi.x;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Closed-loop perimeter (last vertex connects back to the first)
pub fn polygon_perimeter(vertices: &[Vec2]) -> Result<f32, SimError> {
    if vertices.len() < 2 {
        return Err(SimError::DegenerateGeometry("perimeter needs at least 2 vertices"));
    }
    Ok(edges(vertices).map(|(a, b)| a.distance(b)).sum())
}

/// Nearest distance from `p` to an open polyline
pub fn polyline_distance(p: Vec2, points: &[Vec2]) -> Result<f32, SimError> {
    if points.len() < 2 {
        return Err(SimError::DegenerateGeometry("polyline needs at least 2 points"));
    }
    Ok(points
        .windows(2)
        .map(|w| point_segment_distance(p, w[0], w[1]))
        .fold(f32::INFINITY, f32::min))
}

/// Consecutive edges of a closed loop, wrapping from the last vertex to the first
pub fn edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

/// Inclusive axis-aligned rectangle built from two corners in any order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
