//! Sonic Playground - physics and playhead core for a sound canvas
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (geometry, brush field, collisions, playheads)
//! - `audio`: Pure mapping from trigger events to pitch and quad gains
//! - `settings`: Data-driven simulation constants
//! - `error`: Error taxonomy shared by the simulation
//! - `web`: wasm-bindgen host wrapper (wasm32 only)

pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{ConfigError, SimError};
pub use settings::{Integration, SimConfig};

use glam::Vec2;

/// Default simulation constants
pub mod consts {
    /// Velocity retention after a bounce (perfectly elastic)
    pub const RESTITUTION: f32 = 1.0;

    /// Ball defaults (speed is in canvas units per frame)
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_LAUNCH_SPEED: f32 = 3.0;

    /// Polygon playhead speed (canvas units per second)
    pub const PLAYHEAD_SPEED: f32 = 120.0;
    /// Offset into an edge below which the playhead counts as sitting on a vertex
    pub const VERTEX_THRESHOLD: f32 = 4.0;

    /// Brush defaults
    pub const BRUSH_WIDTH: f32 = 50.0;
    pub const BRUSH_SLOW_BASE: f32 = 0.7;
    pub const BRUSH_SLOW_FLOOR: f32 = 0.25;

    /// Arrow zones live this long (seconds)
    pub const ARROW_LIFETIME: f32 = 1.5;

    /// Arrow drag beyond this distance is clamped before mapping to controls
    pub const GESTURE_MAX_DRAG: f32 = 300.0;
    pub const GESTURE_VOLUME_PER_DRAG_DB: f32 = 6.0;
    pub const GESTURE_PITCH_PER_DRAG_SEMITONES: f32 = 3.0;
    pub const GESTURE_VOLUME_RANGE_DB: (f32, f32) = (-18.0, 6.0);
    pub const GESTURE_PITCH_RANGE_SEMITONES: (f32, f32) = (-12.0, 12.0);

    /// Obstacle drags shorter than this are discarded
    pub const MIN_SHAPE_RADIUS: f32 = 5.0;

    /// Default canvas size
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
}

/// Axis-aligned canvas bounds, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: consts::CANVAS_WIDTH,
            height: consts::CANVAS_HEIGHT,
        }
    }
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Position normalized to [0, 1] on both axes (None for a zero-area canvas)
    #[inline]
    pub fn normalize(&self, pos: Vec2) -> Option<Vec2> {
        if self.width == 0.0 || self.height == 0.0 {
            return None;
        }
        Some(Vec2::new(pos.x / self.width, pos.y / self.height))
    }
}

/// Convert polar (r, theta) to cartesian offset from `center`
#[inline]
pub fn polar_offset(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}
