//! Collision detection and response for balls
//!
//! Every check mutates the ball in place and reports whether it hit, so the
//! caller can chain checks in a fixed order and emit one trigger per contact.
//! Responses are arcade-style: push out by the penetration, reflect, scale by
//! restitution. Nothing here tries to conserve energy beyond that.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Ball;
use crate::Canvas;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit normal the ball was pushed along (pointing toward the ball)
    pub normal: Vec2,
    /// Penetration depth that was corrected
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Which canvas edge a ball was clamped against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wall {
    Top,
    Bottom,
    Left,
    Right,
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Clamp a ball inside the canvas, checking top, bottom, left, right in order
///
/// Returns every wall the ball was clamped against this frame.
pub fn ball_wall_collisions(ball: &mut Ball, canvas: Canvas, restitution: f32) -> Vec<Wall> {
    let mut walls = Vec::new();
    let r = ball.radius;

    if ball.pos.y - r < 0.0 {
        ball.pos.y = r;
        ball.vel.y *= -restitution;
        walls.push(Wall::Top);
    }
    if ball.pos.y + r > canvas.height {
        ball.pos.y = canvas.height - r;
        ball.vel.y *= -restitution;
        walls.push(Wall::Bottom);
    }
    if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        ball.vel.x *= -restitution;
        walls.push(Wall::Left);
    }
    if ball.pos.x + r > canvas.width {
        ball.pos.x = canvas.width - r;
        ball.vel.x *= -restitution;
        walls.push(Wall::Right);
    }

    walls
}

/// Collide a ball with the finite segment `p1`-`p2`
///
/// The segment acts as its line restricted to the span where the ball's
/// center projects between the endpoints. A ball approaching an endpoint from
/// beyond that span passes through (corner tunneling is accepted).
/// Zero-length or non-finite segments never collide.
pub fn ball_segment_collision(ball: &mut Ball, p1: Vec2, p2: Vec2, restitution: f32) -> CollisionResult {
    let d = p2 - p1;
    let len_sq = d.length_squared();
    if !(len_sq > 0.0 && len_sq.is_finite()) {
        return CollisionResult::miss();
    }
    let len = len_sq.sqrt();
    let n = Vec2::new(-d.y, d.x) / len;

    let rel = ball.pos - p1;
    let dist = rel.dot(n);
    if !(dist.abs() < ball.radius) {
        return CollisionResult::miss();
    }
    let proj = rel.dot(d);
    if !(0.0..=len_sq).contains(&proj) {
        return CollisionResult::miss();
    }

    let penetration = ball.radius - dist.abs();
    let side = if dist > 0.0 { 1.0 } else { -1.0 };
    let normal = n * side;
    ball.pos += normal * penetration;
    ball.vel = reflect_velocity(ball.vel, n) * restitution;

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Collide a ball with a circular obstacle from outside or inside
///
/// Contact happens while the ball's center lies within `ball.radius` of the
/// obstacle's rim. Coincident centers and non-finite geometry are skipped.
pub fn ball_circle_collision(ball: &mut Ball, center: Vec2, radius: f32, restitution: f32) -> CollisionResult {
    let offset = ball.pos - center;
    let dist = offset.length();
    if !(dist > 0.0 && (dist - radius).abs() <= ball.radius) {
        return CollisionResult::miss();
    }

    let n = offset / dist;
    let (normal, penetration) = if dist > radius {
        (n, radius + ball.radius - dist)
    } else {
        (-n, dist - (radius - ball.radius))
    };
    ball.pos += normal * penetration;
    ball.vel = reflect_velocity(ball.vel, n) * restitution;

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Resolve overlap between two balls of equal mass
///
/// Each ball moves half the overlap along the center line. The impulse is
/// applied only if the balls are approaching. Returns the midpoint of the two
/// corrected centers, or None when they do not touch (or share a center).
pub fn ball_ball_collision(a: &mut Ball, b: &mut Ball, restitution: f32) -> Option<Vec2> {
    let offset = b.pos - a.pos;
    let dist = offset.length();
    let min_dist = a.radius + b.radius;
    if !(dist > 0.0 && dist < min_dist) {
        return None;
    }

    let n = offset / dist;
    let push = (min_dist - dist) / 2.0;
    a.pos -= n * push;
    b.pos += n * push;

    let rel_along_normal = (b.vel - a.vel).dot(n);
    if rel_along_normal < 0.0 {
        let j = -(1.0 + restitution) * rel_along_normal / 2.0;
        let impulse = n * j;
        a.vel -= impulse;
        b.vel += impulse;
    }

    Some((a.pos + b.pos) / 2.0)
}
