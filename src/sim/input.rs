//! Commands from the input layer
//!
//! Pointer and keyboard handling lives outside the core. Whatever it decides
//! reaches the simulation as a `Command`, applied between frames.

use glam::Vec2;

use super::arena::EntityId;
use super::state::{BallKind, Obstacle, ShapeKind, SimulationState};

/// One edit to the scene
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Drop a ball launched in a seeded random direction
    PlaceBall { at: Vec2, kind: BallKind },
    /// Close a clicked point sequence into a sounding polygon
    FinalizePolygon { points: Vec<Vec2> },
    /// Place an obstacle from a drag starting at `center`
    PlaceShape { kind: ShapeKind, center: Vec2, radius: f32 },
    /// Arrow gesture from `start` to `end`
    DrawArrow { start: Vec2, end: Vec2 },
    BeginStroke { at: Vec2 },
    ExtendStroke { stroke: EntityId, to: Vec2 },
    /// Pointer released; a stroke that never grew past one point is dropped
    EndStroke { stroke: EntityId },
    /// Drag-rectangle eraser, corners in any order
    EraseRect { from: Vec2, to: Vec2 },
    /// Remove everything
    Clear,
}

impl Command {
    /// Whether every coordinate and size carried by the command is finite
    pub fn is_finite(&self) -> bool {
        match self {
            Command::PlaceBall { at, .. } | Command::BeginStroke { at } => at.is_finite(),
            Command::FinalizePolygon { points } => points.iter().all(|p| p.is_finite()),
            Command::PlaceShape { center, radius, .. } => center.is_finite() && radius.is_finite(),
            Command::DrawArrow { start, end } => start.is_finite() && end.is_finite(),
            Command::ExtendStroke { to, .. } => to.is_finite(),
            Command::EraseRect { from, to } => from.is_finite() && to.is_finite(),
            Command::EndStroke { .. } | Command::Clear => true,
        }
    }
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(EntityId),
    Extended,
    Finished,
    Erased(Vec<EntityId>),
    /// Command had no effect (non-finite input, too few points, tiny shape, stale stroke id)
    Ignored,
}

/// Apply a command to the simulation
pub fn apply(state: &mut SimulationState, command: Command) -> Outcome {
    if !command.is_finite() {
        log::debug!("Ignoring command with non-finite input: {command:?}");
        return Outcome::Ignored;
    }
    match command {
        Command::PlaceBall { at, kind } => Outcome::Created(state.spawn_ball(at, kind)),

        Command::FinalizePolygon { points } => match state.add_polygon(points) {
            Ok(id) => Outcome::Created(id),
            Err(err) => {
                log::debug!("Polygon not created: {err}");
                Outcome::Ignored
            }
        },

        Command::PlaceShape {
            kind,
            center,
            radius,
        } => {
            if radius > state.config.min_shape_radius {
                Outcome::Created(state.add_obstacle(Obstacle::from_drag(kind, center, radius)))
            } else {
                Outcome::Ignored
            }
        }

        Command::DrawArrow { start, end } => Outcome::Created(state.add_arrow(start, end)),

        Command::BeginStroke { at } => Outcome::Created(state.begin_stroke(at)),

        Command::ExtendStroke { stroke, to } => {
            if state.extend_stroke(stroke, to) {
                Outcome::Extended
            } else {
                Outcome::Ignored
            }
        }

        Command::EndStroke { stroke } => match state.strokes.get(stroke).map(|s| s.points.len()) {
            Some(n) if n < 2 => {
                state.remove(stroke);
                Outcome::Erased(vec![stroke])
            }
            Some(_) => Outcome::Finished,
            None => Outcome::Ignored,
        },

        Command::EraseRect { from, to } => Outcome::Erased(state.erase_rect(from, to)),

        Command::Clear => {
            state.clear();
            Outcome::Erased(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GestureControls;

    #[test]
    fn test_polygon_with_two_points_ignored() {
        let mut state = SimulationState::default();
        let outcome = apply(
            &mut state,
            Command::FinalizePolygon {
                points: vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            },
        );
        assert_eq!(outcome, Outcome::Ignored);
        assert!(state.polygons.is_empty());
    }

    #[test]
    fn test_tiny_shape_ignored() {
        let mut state = SimulationState::default();
        let tiny = Command::PlaceShape {
            kind: ShapeKind::Square,
            center: Vec2::new(50.0, 50.0),
            radius: 5.0,
        };
        assert_eq!(apply(&mut state, tiny), Outcome::Ignored);

        let ok = Command::PlaceShape {
            kind: ShapeKind::Square,
            center: Vec2::new(50.0, 50.0),
            radius: 30.0,
        };
        assert!(matches!(apply(&mut state, ok), Outcome::Created(_)));
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut state = SimulationState::default();
        let Outcome::Created(stroke) = apply(&mut state, Command::BeginStroke { at: Vec2::ZERO }) else {
            panic!("stroke should be created");
        };
        let extend = Command::ExtendStroke {
            stroke,
            to: Vec2::new(40.0, 0.0),
        };
        assert_eq!(apply(&mut state, extend.clone()), Outcome::Extended);
        assert_eq!(state.strokes.get(stroke).unwrap().points.len(), 2);
        assert_eq!(apply(&mut state, Command::EndStroke { stroke }), Outcome::Finished);

        apply(&mut state, Command::Clear);
        assert_eq!(apply(&mut state, extend), Outcome::Ignored);
    }

    #[test]
    fn test_single_point_stroke_dropped_on_end() {
        let mut state = SimulationState::default();
        let Outcome::Created(stroke) = apply(&mut state, Command::BeginStroke { at: Vec2::ONE }) else {
            panic!("stroke should be created");
        };
        assert_eq!(
            apply(&mut state, Command::EndStroke { stroke }),
            Outcome::Erased(vec![stroke])
        );
        assert!(state.strokes.is_empty());
    }

    #[test]
    fn test_non_finite_commands_ignored() {
        let mut state = SimulationState::default();
        let nan = Vec2::new(f32::NAN, 20.0);
        let commands = [
            Command::PlaceBall {
                at: nan,
                kind: BallKind::Pluck,
            },
            Command::DrawArrow {
                start: Vec2::new(10.0, 10.0),
                end: nan,
            },
            Command::PlaceShape {
                kind: ShapeKind::Triangle,
                center: Vec2::new(f32::NAN, 50.0),
                radius: 40.0,
            },
            Command::PlaceShape {
                kind: ShapeKind::Circle,
                center: Vec2::new(50.0, 50.0),
                radius: f32::INFINITY,
            },
            Command::BeginStroke { at: nan },
        ];
        for command in commands {
            assert_eq!(apply(&mut state, command), Outcome::Ignored);
        }
        assert!(state.balls.is_empty());
        assert!(state.arrows.is_empty());
        assert!(state.obstacles.is_empty());
        assert!(state.strokes.is_empty());
        assert_eq!(state.controls, GestureControls::default());
    }

    #[test]
    fn test_erase_command() {
        let mut state = SimulationState::default();
        let Outcome::Created(ball) = apply(
            &mut state,
            Command::PlaceBall {
                at: Vec2::new(50.0, 50.0),
                kind: BallKind::Metal,
            },
        ) else {
            panic!("ball should be created");
        };
        let outcome = apply(
            &mut state,
            Command::EraseRect {
                from: Vec2::new(100.0, 100.0),
                to: Vec2::ZERO,
            },
        );
        assert_eq!(outcome, Outcome::Erased(vec![ball]));
    }
}
