//! Frame-stepped simulation module
//!
//! All physics and traversal logic lives here:
//! - One explicit `SimulationState`, no globals
//! - Host-supplied `dt`, no clock reads
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod collision;
pub mod events;
pub mod field;
pub mod geometry;
pub mod input;
pub mod playhead;
pub mod state;
pub mod tick;

pub use arena::{Arena, EntityId};
pub use collision::{CollisionResult, Wall, reflect_velocity};
pub use events::{TriggerEvent, TriggerSource, Voice};
pub use field::{BrushStroke, SlowFalloff, brush_slow_factor};
pub use geometry::{Rect, point_in_polygon, point_segment_distance, polygon_perimeter, polyline_distance};
pub use input::{Command, Outcome, apply};
pub use playhead::{PlayheadPoint, Polygon};
pub use state::{
    ArrowZone, Ball, BallKind, GestureControls, GestureLimits, Obstacle, ShapeKind, SimulationState,
};
pub use tick::advance;
