//! Polygon playheads
//!
//! Each closed polygon carries a cursor measured in arc length from its first
//! vertex. The cursor only moves forward and wraps at the perimeter, so
//! `0 <= cursor < perimeter` holds after every update.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{edges, polygon_perimeter};
use crate::error::SimError;

/// Where a cursor distance lands on the polygon outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayheadPoint {
    pub position: Vec2,
    /// Index of the edge starting at vertex `edge`
    pub edge: usize,
    /// Whether the point sits within the vertex threshold of the edge start
    pub at_vertex: bool,
}

/// A closed, sounding polygon with its traversal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    perimeter: f32,
    cursor: f32,
    /// Playhead speed in canvas units per second
    pub speed: f32,
    last_crossed_edge: Option<usize>,
    playhead: Vec2,
}

impl Polygon {
    /// Build a polygon from at least three vertices with a non-zero perimeter
    pub fn new(vertices: Vec<Vec2>, speed: f32) -> Result<Self, SimError> {
        if vertices.len() < 3 {
            return Err(SimError::InvalidEntity(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        let perimeter = polygon_perimeter(&vertices)?;
        if !(perimeter.is_finite() && perimeter > 0.0) {
            return Err(SimError::InvalidEntity(format!(
                "polygon perimeter must be positive, got {perimeter}"
            )));
        }
        let playhead = vertices[0];
        Ok(Self {
            vertices,
            perimeter,
            cursor: 0.0,
            speed,
            last_crossed_edge: None,
            playhead,
        })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn perimeter(&self) -> f32 {
        self.perimeter
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn playhead(&self) -> Vec2 {
        self.playhead
    }

    pub fn last_crossed_edge(&self) -> Option<usize> {
        self.last_crossed_edge
    }

    fn is_valid(&self) -> bool {
        self.vertices.len() >= 3 && self.perimeter.is_finite() && self.perimeter > 0.0
    }

    /// Resolve an arc-length distance to a point on the outline
    pub fn point_at(&self, distance: f32, vertex_threshold: f32) -> PlayheadPoint {
        let distance = distance % self.perimeter;
        let mut acc = 0.0;
        for (i, (a, b)) in edges(&self.vertices).enumerate() {
            let len = a.distance(b);
            if acc + len >= distance {
                let local = distance - acc;
                let ratio = if len == 0.0 { 0.0 } else { local / len };
                return PlayheadPoint {
                    position: a + (b - a) * ratio,
                    edge: i,
                    at_vertex: local < vertex_threshold,
                };
            }
            acc += len;
        }

        // Rounding can leave the cursor a hair past the summed edge lengths
        PlayheadPoint {
            position: self.vertices[0],
            edge: 0,
            at_vertex: true,
        }
    }

    /// Move the cursor forward by `distance` and update the playhead
    ///
    /// Returns the playhead point when it newly arrives at a vertex. A vertex
    /// fires once per edge transition, so a slow playhead dwelling inside the
    /// threshold stays silent after the first trigger.
    pub fn advance(&mut self, distance: f32, vertex_threshold: f32) -> Option<PlayheadPoint> {
        debug_assert!(self.is_valid(), "polygon reached traversal with invalid geometry");
        if !self.is_valid() {
            return None;
        }
        let distance = if distance.is_finite() { distance.max(0.0) } else { 0.0 };

        self.cursor += distance;
        if self.cursor >= self.perimeter {
            self.cursor %= self.perimeter;
            self.last_crossed_edge = None;
        }

        let point = self.point_at(self.cursor, vertex_threshold);
        self.playhead = point.position;

        if point.at_vertex && self.last_crossed_edge != Some(point.edge) {
            self.last_crossed_edge = Some(point.edge);
            Some(point)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(side: f32) -> Polygon {
        Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(side, 0.0),
                Vec2::new(side, side),
                Vec2::new(0.0, side),
            ],
            120.0,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_too_few_vertices() {
        let err = Polygon::new(vec![Vec2::ZERO, Vec2::X], 120.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidEntity(_)));
    }

    #[test]
    fn test_rejects_zero_perimeter() {
        let p = Vec2::new(3.0, 3.0);
        assert!(Polygon::new(vec![p, p, p], 120.0).is_err());
    }

    #[test]
    fn test_point_at_interpolates() {
        let poly = square(100.0);
        let p = poly.point_at(150.0, 4.0);
        assert_eq!(p.edge, 1);
        assert!((p.position - Vec2::new(100.0, 50.0)).length() < 1e-4);
        assert!(!p.at_vertex);

        let p = poly.point_at(202.0, 4.0);
        assert_eq!(p.edge, 2);
        assert!(p.at_vertex);
    }

    #[test]
    fn test_zero_length_edge_skipped() {
        let poly = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
            ],
            120.0,
        )
        .unwrap();
        let p = poly.point_at(15.0, 4.0);
        assert!(p.position.is_finite());
        assert_eq!(p.edge, 2);
        assert!((p.position - Vec2::new(10.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_vertex_fires_once_while_dwelling() {
        let mut poly = square(100.0);
        // First step lands inside the threshold of vertex 0
        assert_eq!(poly.advance(1.0, 4.0).map(|p| p.edge), Some(0));
        // Still dwelling near vertex 0
        assert!(poly.advance(1.0, 4.0).is_none());
        assert!(poly.advance(1.0, 4.0).is_none());
        // Move to just past vertex 1
        assert_eq!(poly.advance(99.0, 4.0).map(|p| p.edge), Some(1));
        assert!(poly.advance(0.5, 4.0).is_none());
    }

    #[test]
    fn test_wrap_resets_marker() {
        let mut poly = square(100.0);
        poly.advance(1.0, 4.0);
        // One big step skips vertices 1-3, so vertex 0 is still the last crossing
        poly.advance(398.0, 4.0);
        assert_eq!(poly.last_crossed_edge(), Some(0));
        // 399 -> wraps to 1.0 and vertex 0 fires again
        let fired = poly.advance(2.0, 4.0);
        assert!((poly.cursor() - 1.0).abs() < 1e-3);
        assert_eq!(fired.map(|p| p.edge), Some(0));
    }

    #[test]
    fn test_exact_perimeter_wraps_to_zero() {
        let mut poly = square(100.0);
        poly.advance(400.0, 4.0);
        assert_eq!(poly.cursor(), 0.0);
    }

    #[test]
    fn test_full_lap_fires_every_vertex() {
        let mut poly = square(100.0);
        let mut edges = Vec::new();
        // 120 units/s at 60 Hz = 2 units per frame; stop one frame short of the lap
        for _ in 0..199 {
            if let Some(p) = poly.advance(2.0, 4.0) {
                edges.push(p.edge);
            }
        }
        assert_eq!(edges, vec![0, 1, 2, 3]);
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_in_range(steps in prop::collection::vec(0.0f32..2000.0, 1..50)) {
            let mut poly = square(37.0);
            for step in steps {
                poly.advance(step, 4.0);
                prop_assert!(poly.cursor() >= 0.0);
                prop_assert!(poly.cursor() < poly.perimeter());
            }
        }
    }
}
