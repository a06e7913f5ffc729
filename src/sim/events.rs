//! Trigger events handed to the audio layer
//!
//! The simulation never makes sound. Each contact or vertex crossing becomes
//! a `TriggerEvent`; `crate::audio` turns those into note requests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::EntityId;
use super::collision::Wall;
use super::state::{Ball, BallKind};

/// What produced the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSource {
    /// Ball clamped against a canvas edge
    Wall(Wall),
    /// Ball bounced off an edge of a sounding polygon
    PolygonEdge(EntityId),
    /// Ball bounced off an arrow zone
    Arrow(EntityId),
    /// Ball bounced off a static obstacle
    Obstacle(EntityId),
    /// Ball collided with another ball
    Ball(EntityId),
    /// Polygon playhead arrived at the start of edge `edge`
    Vertex { edge: usize },
}

/// Timbre the audio layer should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Voice {
    Ball(BallKind),
    Playhead,
}

/// One abstract sound trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub source: TriggerSource,
    /// The ball or polygon that sounds
    pub emitter: EntityId,
    pub voice: Voice,
    /// Where the sound is placed in the quad field
    pub position: Vec2,
    /// Height the pitch is derived from
    pub pitch_y: f32,
    /// Post-contact velocity of the sounding ball (None for playheads)
    pub velocity: Option<Vec2>,
}

impl TriggerEvent {
    /// Event for a ball contact, pitched at the ball's own height
    pub fn ball(source: TriggerSource, id: EntityId, ball: &Ball) -> Self {
        Self::ball_at(source, id, ball, ball.pos.y)
    }

    /// Event for a ball contact with an explicit pitch height
    pub fn ball_at(source: TriggerSource, id: EntityId, ball: &Ball, pitch_y: f32) -> Self {
        Self {
            source,
            emitter: id,
            voice: Voice::Ball(ball.kind),
            position: ball.pos,
            pitch_y,
            velocity: Some(ball.vel),
        }
    }

    /// Event for a playhead arriving at a vertex
    pub fn vertex(id: EntityId, edge: usize, position: Vec2) -> Self {
        Self {
            source: TriggerSource::Vertex { edge },
            emitter: id,
            voice: Voice::Playhead,
            position,
            pitch_y: position.y,
            velocity: None,
        }
    }
}
