//! Simulation state and entity types
//!
//! One `SimulationState` owns every entity collection. It is mutated only by
//! `tick::advance` and, between frames, by input commands.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::arena::{Arena, EntityId, IdAllocator};
use super::field::{BrushStroke, SlowFalloff};
use super::geometry::Rect;
use super::playhead::Polygon;
use crate::error::{ConfigError, SimError};
use crate::{Canvas, polar_offset};
use crate::settings::SimConfig;

/// Ball voice, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BallKind {
    #[default]
    Pluck,
    Metal,
    Pad,
}

impl BallKind {
    pub const ALL: [BallKind; 3] = [BallKind::Pluck, BallKind::Metal, BallKind::Pad];

    pub fn as_str(&self) -> &'static str {
        match self {
            BallKind::Pluck => "pluck",
            BallKind::Metal => "metal",
            BallKind::Pad => "pad",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pluck" | "type1" => Some(BallKind::Pluck),
            "metal" | "type2" => Some(BallKind::Metal),
            "pad" | "type3" => Some(BallKind::Pad),
            _ => None,
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Velocity in canvas units per frame
    pub vel: Vec2,
    pub radius: f32,
    pub kind: BallKind,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, kind: BallKind) -> Self {
        Self {
            pos,
            vel,
            radius,
            kind,
        }
    }
}

/// Obstacle outline requested by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Circle,
    Triangle,
    Square,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Square => "square",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "circle" | "1" => Some(ShapeKind::Circle),
            "triangle" | "2" => Some(ShapeKind::Triangle),
            "square" | "3" => Some(ShapeKind::Square),
            _ => None,
        }
    }
}

/// A static, silent obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Obstacle {
    Circle { center: Vec2, radius: f32 },
    Polygon { center: Vec2, vertices: Vec<Vec2> },
}

impl Obstacle {
    /// Expand a dragged shape into its collision outline
    ///
    /// Triangles are inscribed in a circle of `radius` with the first vertex
    /// pointing up; squares have side length `radius`.
    pub fn from_drag(kind: ShapeKind, center: Vec2, radius: f32) -> Self {
        match kind {
            ShapeKind::Circle => Obstacle::Circle { center, radius },
            ShapeKind::Triangle => Obstacle::Polygon {
                center,
                vertices: (0..3)
                    .map(|i| polar_offset(center, radius, -FRAC_PI_2 + i as f32 * TAU / 3.0))
                    .collect(),
            },
            ShapeKind::Square => {
                let h = radius / 2.0;
                Obstacle::Polygon {
                    center,
                    vertices: vec![
                        center + Vec2::new(-h, -h),
                        center + Vec2::new(h, -h),
                        center + Vec2::new(h, h),
                        center + Vec2::new(-h, h),
                    ],
                }
            }
        }
    }

    /// Anchor point used for erase hit-testing
    pub fn center(&self) -> Vec2 {
        match self {
            Obstacle::Circle { center, .. } | Obstacle::Polygon { center, .. } => *center,
        }
    }
}

/// A short-lived reflecting segment drawn by an arrow gesture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrowZone {
    pub start: Vec2,
    pub end: Vec2,
    /// Simulation time (seconds) at creation
    pub created_at: f32,
    /// Lifetime in seconds
    pub lifetime: f32,
}

impl ArrowZone {
    pub fn displacement(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) / 2.0
    }

    /// Remaining life in [0, 1], linear in age
    pub fn life(&self, now: f32) -> f32 {
        (1.0 - (now - self.created_at) / self.lifetime).max(0.0)
    }

    pub fn is_expired(&self, now: f32) -> bool {
        self.life(now) <= 0.0
    }

    /// Fade used by renderers: fully opaque when new, 30% at the end
    pub fn opacity(&self, now: f32) -> f32 {
        0.3 + 0.7 * self.life(now)
    }
}

/// Bounds for the gesture-driven audio controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureLimits {
    pub max_drag: f32,
    pub volume_per_drag_db: f32,
    pub pitch_per_drag: f32,
    pub volume_range_db: (f32, f32),
    pub pitch_range: (f32, f32),
}

impl From<&SimConfig> for GestureLimits {
    fn from(config: &SimConfig) -> Self {
        Self {
            max_drag: config.gesture_max_drag,
            volume_per_drag_db: config.gesture_volume_per_drag_db,
            pitch_per_drag: config.gesture_pitch_per_drag,
            volume_range_db: config.gesture_volume_range_db,
            pitch_range: config.gesture_pitch_range,
        }
    }
}

/// Global volume/pitch offsets accumulated from arrow gestures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureControls {
    pub volume_db: f32,
    pub pitch_semitones: f32,
}

impl GestureControls {
    /// Fold one arrow's drag into the controls
    ///
    /// Rightward drags raise the volume, upward drags (negative y) raise the
    /// pitch. Each axis is clamped per gesture and in total. A non-finite
    /// drag component counts as no drag on that axis.
    pub fn apply_drag(&mut self, drag: Vec2, limits: &GestureLimits) {
        if !(limits.max_drag > 0.0 && limits.max_drag.is_finite()) {
            log::debug!("Gesture ignored: max drag {} is not positive", limits.max_drag);
            return;
        }
        let finite_or_zero = |v: f32| if v.is_finite() { v } else { 0.0 };
        let dx = finite_or_zero(drag.x).clamp(-limits.max_drag, limits.max_drag);
        let dy = finite_or_zero(drag.y).clamp(-limits.max_drag, limits.max_drag);

        let volume = self.volume_db + dx / limits.max_drag * limits.volume_per_drag_db;
        let pitch = self.pitch_semitones - dy / limits.max_drag * limits.pitch_per_drag;

        self.volume_db = clamp_control("volume_db", volume, limits.volume_range_db);
        self.pitch_semitones = clamp_control("pitch_semitones", pitch, limits.pitch_range);
    }
}

fn check_control(name: &'static str, value: f32, (min, max): (f32, f32)) -> Result<f32, SimError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SimError::OutOfRangeControl {
            name,
            value,
            min,
            max,
        })
    }
}

fn clamp_control(name: &'static str, value: f32, range: (f32, f32)) -> f32 {
    check_control(name, value, range).unwrap_or_else(|err| {
        log::debug!("{err}, clamping");
        // Inverted ranges collapse to the lower bound
        value.max(range.0).min(range.1.max(range.0))
    })
}

/// RNG state wrapper for serialization
///
/// Each draw uses its own PCG stream so the sequence depends only on the
/// seed and the number of draws so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    pub fn next_angle(&mut self) -> f32 {
        let mut rng = Pcg32::new(self.seed, self.draws);
        self.draws += 1;
        rng.random_range(0.0..TAU)
    }
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub config: SimConfig,
    /// Simulation time in seconds (sum of every `dt` passed to `advance`)
    pub time: f32,
    /// Number of frames advanced
    pub frame: u64,
    pub balls: Arena<Ball>,
    pub polygons: Arena<Polygon>,
    pub obstacles: Arena<Obstacle>,
    pub arrows: Arena<ArrowZone>,
    pub strokes: Arena<BrushStroke>,
    pub controls: GestureControls,
    pub rng_state: RngState,
    ids: IdAllocator,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimulationState {
    /// Build a state from a config the caller has already validated
    pub fn new(config: SimConfig) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "invalid config: {:?}",
            config.validate()
        );
        log::info!(
            "Simulation created: canvas {}x{}, seed {}, integration {}",
            config.canvas.width,
            config.canvas.height,
            config.seed,
            config.integration.as_str()
        );
        Self {
            rng_state: RngState::new(config.seed),
            config,
            time: 0.0,
            frame: 0,
            balls: Arena::new(),
            polygons: Arena::new(),
            obstacles: Arena::new(),
            arrows: Arena::new(),
            strokes: Arena::new(),
            controls: GestureControls::default(),
            ids: IdAllocator::default(),
        }
    }

    /// Validate `config` before building the state
    pub fn try_new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Change the canvas bounds; negative or non-finite sizes are rejected
    pub fn resize(&mut self, canvas: Canvas) -> Result<(), ConfigError> {
        let config = SimConfig {
            canvas,
            ..self.config.clone()
        };
        config.validate()?;
        log::info!("Canvas resized to {}x{}", canvas.width, canvas.height);
        self.config = config;
        Ok(())
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    pub fn falloff(&self) -> SlowFalloff {
        SlowFalloff {
            base: self.config.slow_base,
            floor: self.config.slow_floor,
        }
    }

    /// Place a ball with the configured radius, launched in a seeded random direction
    pub fn spawn_ball(&mut self, pos: Vec2, kind: BallKind) -> EntityId {
        let angle = self.rng_state.next_angle();
        let vel = Vec2::from_angle(angle) * self.config.ball_speed;
        self.add_ball(Ball::new(pos, vel, self.config.ball_radius, kind))
    }

    pub fn add_ball(&mut self, ball: Ball) -> EntityId {
        let id = self.next_entity_id();
        log::debug!("Ball {id} ({}) at {:?}", ball.kind.as_str(), ball.pos);
        self.balls.insert(id, ball);
        id
    }

    /// Finalize a polygon; fewer than three points (or a zero perimeter) is rejected
    pub fn add_polygon(&mut self, vertices: Vec<Vec2>) -> Result<EntityId, SimError> {
        let polygon = Polygon::new(vertices, self.config.playhead_speed)?;
        let id = self.next_entity_id();
        log::debug!(
            "Polygon {id}: {} vertices, perimeter {:.1}",
            polygon.vertices().len(),
            polygon.perimeter()
        );
        self.polygons.insert(id, polygon);
        Ok(id)
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> EntityId {
        let id = self.next_entity_id();
        log::debug!("Obstacle {id} at {:?}", obstacle.center());
        self.obstacles.insert(id, obstacle);
        id
    }

    /// Add an arrow zone and fold its drag into the gesture controls
    pub fn add_arrow(&mut self, start: Vec2, end: Vec2) -> EntityId {
        let arrow = ArrowZone {
            start,
            end,
            created_at: self.time,
            lifetime: self.config.arrow_lifetime,
        };
        let limits = GestureLimits::from(&self.config);
        self.controls.apply_drag(arrow.displacement(), &limits);
        let id = self.next_entity_id();
        log::debug!(
            "Arrow {id}: volume {:+.1} dB, pitch {:+.2} st",
            self.controls.volume_db,
            self.controls.pitch_semitones
        );
        self.arrows.insert(id, arrow);
        id
    }

    pub fn begin_stroke(&mut self, start: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.strokes.insert(id, BrushStroke::new(start, self.config.brush_width));
        id
    }

    /// Append a point to a stroke; false if the stroke no longer exists
    pub fn extend_stroke(&mut self, id: EntityId, point: Vec2) -> bool {
        match self.strokes.get_mut(id) {
            Some(stroke) => {
                stroke.extend(point);
                true
            }
            None => false,
        }
    }

    /// Drop arrows whose lifetime has elapsed
    pub fn expire_arrows(&mut self) -> Vec<EntityId> {
        let now = self.time;
        self.arrows.retain(|_, arrow| !arrow.is_expired(now))
    }

    /// Remove every entity with a defining point inside the rectangle
    ///
    /// Balls match on position, obstacles on center, polygons and strokes on
    /// any vertex. Arrows match when both endpoints or the midpoint fall inside.
    pub fn erase_rect(&mut self, a: Vec2, b: Vec2) -> Vec<EntityId> {
        let rect = Rect::from_corners(a, b);
        let mut removed = Vec::new();

        removed.extend(self.balls.retain(|_, ball| !rect.contains(ball.pos)));
        removed.extend(self.obstacles.retain(|_, o| !rect.contains(o.center())));
        removed.extend(
            self.polygons
                .retain(|_, poly| !poly.vertices().iter().any(|&v| rect.contains(v))),
        );
        removed.extend(
            self.strokes
                .retain(|_, stroke| !stroke.points.iter().any(|&p| rect.contains(p))),
        );
        removed.extend(self.arrows.retain(|_, arrow| {
            let both_ends = rect.contains(arrow.start) && rect.contains(arrow.end);
            !(both_ends || rect.contains(arrow.midpoint()))
        }));

        if !removed.is_empty() {
            log::debug!("Erased {} entities", removed.len());
        }
        removed
    }

    /// Remove a single entity of any kind
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.balls.remove(id).is_some()
            || self.polygons.remove(id).is_some()
            || self.obstacles.remove(id).is_some()
            || self.arrows.remove(id).is_some()
            || self.strokes.remove(id).is_some()
    }

    /// Remove every entity and reset the gesture controls
    pub fn clear(&mut self) {
        self.balls.clear();
        self.polygons.clear();
        self.obstacles.clear();
        self.arrows.clear();
        self.strokes.clear();
        self.controls = GestureControls::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> GestureLimits {
        GestureLimits::from(&SimConfig::default())
    }

    #[test]
    fn test_erase_ball_inside_rect_only() {
        let mut state = SimulationState::default();
        let inside = state.spawn_ball(Vec2::new(50.0, 50.0), BallKind::Pluck);
        let outside = state.spawn_ball(Vec2::new(200.0, 200.0), BallKind::Metal);

        let removed = state.erase_rect(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        assert_eq!(removed, vec![inside]);
        assert!(state.balls.contains(outside));
    }

    #[test]
    fn test_erase_polygon_by_any_vertex() {
        let mut state = SimulationState::default();
        let id = state
            .add_polygon(vec![
                Vec2::new(90.0, 90.0),
                Vec2::new(300.0, 90.0),
                Vec2::new(300.0, 300.0),
            ])
            .unwrap();
        assert_eq!(state.erase_rect(Vec2::ZERO, Vec2::new(100.0, 100.0)), vec![id]);
    }

    #[test]
    fn test_erase_obstacle_by_center() {
        let mut state = SimulationState::default();
        // Body reaches into the rect, center does not
        state.add_obstacle(Obstacle::from_drag(ShapeKind::Circle, Vec2::new(150.0, 50.0), 80.0));
        assert!(state.erase_rect(Vec2::ZERO, Vec2::new(100.0, 100.0)).is_empty());
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_erase_arrow_rules() {
        let mut state = SimulationState::default();
        // Midpoint inside
        let mid = state.add_arrow(Vec2::new(-50.0, 50.0), Vec2::new(150.0, 50.0));
        // Only one endpoint inside, midpoint outside
        let partial = state.add_arrow(Vec2::new(90.0, 50.0), Vec2::new(400.0, 50.0));
        let removed = state.erase_rect(Vec2::ZERO, Vec2::new(100.0, 100.0));
        assert_eq!(removed, vec![mid]);
        assert!(state.arrows.contains(partial));
    }

    #[test]
    fn test_erase_stroke_by_any_point() {
        let mut state = SimulationState::default();
        let id = state.begin_stroke(Vec2::new(500.0, 500.0));
        assert!(state.extend_stroke(id, Vec2::new(50.0, 50.0)));
        assert_eq!(state.erase_rect(Vec2::ZERO, Vec2::new(100.0, 100.0)), vec![id]);
        assert!(!state.extend_stroke(id, Vec2::ZERO));
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let mut state = SimulationState::default();
        assert!(state.add_polygon(vec![Vec2::ZERO, Vec2::X]).is_err());
        assert!(state.polygons.is_empty());
    }

    #[test]
    fn test_triangle_vertices() {
        let obstacle = Obstacle::from_drag(ShapeKind::Triangle, Vec2::new(150.0, 150.0), 40.0);
        let Obstacle::Polygon { vertices, .. } = obstacle else {
            panic!("triangle should expand to a polygon");
        };
        assert_eq!(vertices.len(), 3);
        assert!((vertices[0] - Vec2::new(150.0, 110.0)).length() < 1e-4);
        assert!((vertices[1] - Vec2::new(184.641, 170.0)).length() < 1e-3);
        assert!((vertices[2] - Vec2::new(115.359, 170.0)).length() < 1e-3);
    }

    #[test]
    fn test_square_side_is_drag_radius() {
        let obstacle = Obstacle::from_drag(ShapeKind::Square, Vec2::new(100.0, 100.0), 40.0);
        let Obstacle::Polygon { vertices, .. } = obstacle else {
            panic!("square should expand to a polygon");
        };
        assert_eq!(vertices[0], Vec2::new(80.0, 80.0));
        assert_eq!(vertices[2], Vec2::new(120.0, 120.0));
        assert!((crate::sim::geometry::polygon_perimeter(&vertices).unwrap() - 160.0).abs() < 1e-4);
    }

    #[test]
    fn test_gesture_per_drag_mapping() {
        let mut controls = GestureControls::default();
        // Full-length drag right and up
        controls.apply_drag(Vec2::new(300.0, -300.0), &limits());
        assert!((controls.volume_db - 6.0).abs() < 1e-5);
        assert!((controls.pitch_semitones - 3.0).abs() < 1e-5);

        // Over-long drags count as max length
        let mut controls = GestureControls::default();
        controls.apply_drag(Vec2::new(-900.0, 150.0), &limits());
        assert!((controls.volume_db + 6.0).abs() < 1e-5);
        assert!((controls.pitch_semitones + 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_gesture_totals_clamped() {
        let mut controls = GestureControls::default();
        for _ in 0..10 {
            controls.apply_drag(Vec2::new(300.0, -300.0), &limits());
        }
        assert_eq!(controls.volume_db, 6.0);
        assert_eq!(controls.pitch_semitones, 12.0);
        for _ in 0..10 {
            controls.apply_drag(Vec2::new(-300.0, 300.0), &limits());
        }
        assert_eq!(controls.volume_db, -18.0);
        assert_eq!(controls.pitch_semitones, -12.0);
    }

    #[test]
    fn test_gesture_non_finite_drag_leaves_controls_finite() {
        let mut controls = GestureControls::default();
        controls.apply_drag(Vec2::new(f32::NAN, 10.0), &limits());
        controls.apply_drag(Vec2::new(f32::INFINITY, f32::NEG_INFINITY), &limits());
        assert_eq!(controls.volume_db, 0.0);
        assert!((controls.pitch_semitones + 0.1).abs() < 1e-5);

        controls.apply_drag(Vec2::new(300.0, -300.0), &limits());
        assert!((controls.volume_db - 6.0).abs() < 1e-5);
        assert!((controls.pitch_semitones - 2.9).abs() < 1e-5);
    }

    #[test]
    fn test_gesture_with_bad_limits_does_not_panic() {
        let mut controls = GestureControls::default();
        let negative = GestureLimits {
            max_drag: -300.0,
            ..limits()
        };
        controls.apply_drag(Vec2::new(100.0, 100.0), &negative);
        assert_eq!(controls, GestureControls::default());

        let inverted = GestureLimits {
            volume_range_db: (6.0, -18.0),
            ..limits()
        };
        controls.apply_drag(Vec2::new(300.0, 0.0), &inverted);
        assert_eq!(controls.volume_db, 6.0);
    }

    #[test]
    fn test_arrow_fades_and_expires() {
        let arrow = ArrowZone {
            start: Vec2::ZERO,
            end: Vec2::X,
            created_at: 1.0,
            lifetime: 1.5,
        };
        assert!((arrow.opacity(1.0) - 1.0).abs() < 1e-6);
        assert!(!arrow.is_expired(2.0));
        assert!(arrow.is_expired(2.5));
        assert!((arrow.opacity(3.0) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let config = SimConfig {
            gesture_max_drag: -300.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            SimulationState::try_new(config),
            Err(ConfigError::Invalid {
                field: "gesture_max_drag",
                ..
            })
        ));
        assert!(SimulationState::try_new(SimConfig::default()).is_ok());
    }

    #[test]
    fn test_resize_rejects_bad_sizes() {
        let mut state = SimulationState::default();
        assert!(state.resize(Canvas::new(-1.0, 600.0)).is_err());
        assert!(state.resize(Canvas::new(800.0, f32::NAN)).is_err());
        assert!(state.resize(Canvas::new(f32::INFINITY, 600.0)).is_err());
        assert_eq!(state.config.canvas, Canvas::default());

        state.resize(Canvas::new(1024.0, 768.0)).unwrap();
        assert_eq!(state.config.canvas, Canvas::new(1024.0, 768.0));
    }

    #[test]
    fn test_spawn_direction_is_seeded() {
        let mut a = SimulationState::new(SimConfig::default());
        let mut b = SimulationState::new(SimConfig::default());
        let ia = a.spawn_ball(Vec2::new(100.0, 100.0), BallKind::Pad);
        let ib = b.spawn_ball(Vec2::new(100.0, 100.0), BallKind::Pad);
        let va = a.balls.get(ia).unwrap().vel;
        let vb = b.balls.get(ib).unwrap().vel;
        assert_eq!(va, vb);
        assert!((va.length() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_ball_kind_names() {
        for kind in BallKind::ALL {
            assert_eq!(BallKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(BallKind::from_str("type2"), Some(BallKind::Metal));
        assert_eq!(ShapeKind::from_str("3"), Some(ShapeKind::Square));
    }
}
