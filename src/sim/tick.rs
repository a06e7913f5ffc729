//! Frame step
//!
//! `advance` runs one frame to completion. The order inside a frame is fixed
//! and every check sees the state left by the one before it:
//!
//! 1. clock, arrow expiry
//! 2. per ball: brush field, integration, walls, polygon edges, arrows, obstacles
//! 3. all ball pairs
//! 4. polygon playheads

use super::collision::{
    ball_ball_collision, ball_circle_collision, ball_segment_collision, ball_wall_collisions,
};
use super::events::{TriggerEvent, TriggerSource};
use super::field::brush_slow_factor;
use super::geometry::edges;
use super::state::{Obstacle, SimulationState};

/// Advance the simulation by one frame of `dt` seconds
///
/// Ball positions move by `velocity` per frame (scaled only in
/// `Integration::TimeScaled` mode); playheads and arrow lifetimes use `dt`.
/// Negative or non-finite `dt` is treated as zero.
pub fn advance(state: &mut SimulationState, dt: f32) -> Vec<TriggerEvent> {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    state.time += dt;
    state.frame += 1;

    let expired = state.expire_arrows();
    if !expired.is_empty() {
        log::debug!("{} arrow(s) expired", expired.len());
    }

    let mut events = Vec::new();
    step_balls(state, dt, &mut events);
    resolve_ball_pairs(state, &mut events);
    advance_playheads(state, dt, &mut events);

    if !events.is_empty() {
        log::trace!("Frame {}: {} trigger(s)", state.frame, events.len());
    }
    events
}

/// Integrate each ball and collide it with walls and every obstacle collection
fn step_balls(state: &mut SimulationState, dt: f32, events: &mut Vec<TriggerEvent>) {
    let falloff = state.falloff();
    let SimulationState {
        config,
        balls,
        polygons,
        obstacles,
        arrows,
        strokes,
        ..
    } = state;
    let e = config.restitution;
    let scale = config.integration.step_scale(dt);

    for (id, ball) in balls.iter_mut() {
        let slow = brush_slow_factor(ball.pos, strokes.values(), falloff);
        ball.pos += ball.vel * slow * scale;

        for wall in ball_wall_collisions(ball, config.canvas, e) {
            events.push(TriggerEvent::ball(TriggerSource::Wall(wall), id, ball));
        }

        for (poly_id, poly) in polygons.iter() {
            for (a, b) in edges(poly.vertices()) {
                if ball_segment_collision(ball, a, b, e).hit {
                    events.push(TriggerEvent::ball(TriggerSource::PolygonEdge(poly_id), id, ball));
                }
            }
        }

        for (arrow_id, arrow) in arrows.iter() {
            if ball_segment_collision(ball, arrow.start, arrow.end, e).hit {
                events.push(TriggerEvent::ball(TriggerSource::Arrow(arrow_id), id, ball));
            }
        }

        for (obstacle_id, obstacle) in obstacles.iter() {
            let source = TriggerSource::Obstacle(obstacle_id);
            match obstacle {
                Obstacle::Circle { center, radius } => {
                    if ball_circle_collision(ball, *center, *radius, e).hit {
                        events.push(TriggerEvent::ball(source, id, ball));
                    }
                }
                Obstacle::Polygon { vertices, .. } => {
                    for (a, b) in edges(vertices) {
                        if ball_segment_collision(ball, a, b, e).hit {
                            events.push(TriggerEvent::ball(source, id, ball));
                        }
                    }
                }
            }
        }
    }
}

/// Pairwise ball collisions; both balls sound, pitched at the contact midpoint
fn resolve_ball_pairs(state: &mut SimulationState, events: &mut Vec<TriggerEvent>) {
    let e = state.config.restitution;
    state.balls.for_each_pair_mut(|(id_a, a), (id_b, b)| {
        if let Some(mid) = ball_ball_collision(a, b, e) {
            events.push(TriggerEvent::ball_at(TriggerSource::Ball(id_b), id_a, a, mid.y));
            events.push(TriggerEvent::ball_at(TriggerSource::Ball(id_a), id_b, b, mid.y));
        }
    });
}

/// Move every playhead; speed is damped by the brush field at its last position
fn advance_playheads(state: &mut SimulationState, dt: f32, events: &mut Vec<TriggerEvent>) {
    let falloff = state.falloff();
    let threshold = state.config.vertex_threshold;
    let SimulationState {
        polygons, strokes, ..
    } = state;

    for (id, poly) in polygons.iter_mut() {
        let slow = brush_slow_factor(poly.playhead(), strokes.values(), falloff);
        if let Some(point) = poly.advance(poly.speed * slow * dt, threshold) {
            events.push(TriggerEvent::vertex(id, point.edge, point.position));
        }
    }
}
