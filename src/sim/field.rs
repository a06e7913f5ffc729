//! Brush slowdown field
//!
//! Every brush stroke a point sits under multiplies the remaining speed by
//! `base`, never dropping below `floor`. Cost is O(strokes x points) per query.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::polyline_distance;

/// A freehand stroke that damps anything passing under it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrushStroke {
    pub points: Vec<Vec2>,
    /// Full stroke width; a point is covered within `width / 2` of the polyline
    pub width: f32,
}

impl BrushStroke {
    pub fn new(start: Vec2, width: f32) -> Self {
        Self {
            points: vec![start],
            width,
        }
    }

    pub fn extend(&mut self, point: Vec2) {
        self.points.push(point);
    }

    /// Whether `p` lies under the stroke (strokes with a single point cover nothing)
    pub fn covers(&self, p: Vec2) -> bool {
        match polyline_distance(p, &self.points) {
            Ok(dist) => dist <= self.width / 2.0,
            Err(_) => false,
        }
    }
}

/// Falloff parameters for stacked strokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlowFalloff {
    pub base: f32,
    pub floor: f32,
}

impl Default for SlowFalloff {
    fn default() -> Self {
        Self {
            base: crate::consts::BRUSH_SLOW_BASE,
            floor: crate::consts::BRUSH_SLOW_FLOOR,
        }
    }
}

impl SlowFalloff {
    /// Speed multiplier for `hits` overlapping strokes
    #[inline]
    pub fn factor(&self, hits: u32) -> f32 {
        if hits == 0 {
            return 1.0;
        }
        self.base.powi(hits as i32).max(self.floor)
    }
}

/// Speed multiplier at `p` given every stroke on the canvas
pub fn brush_slow_factor<'a>(
    p: Vec2,
    strokes: impl IntoIterator<Item = &'a BrushStroke>,
    falloff: SlowFalloff,
) -> f32 {
    let hits = strokes.into_iter().filter(|s| s.covers(p)).count() as u32;
    falloff.factor(hits)
}
