//! Browser bindings
//!
//! Thin wasm-bindgen wrapper: the page forwards pointer gestures as calls,
//! steps the simulation from `requestAnimationFrame` and receives note
//! requests and state snapshots as JSON.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::SimConfig;
use crate::audio::NoteRequest;
use crate::sim::{self, BallKind, Command, Outcome, ShapeKind, SimulationState};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("Logger already initialized");
    }
    log::info!("Sonic Playground core loaded");
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One sound canvas
#[wasm_bindgen]
pub struct Playground {
    state: SimulationState,
}

#[wasm_bindgen]
impl Playground {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, seed: u64) -> Result<Playground, JsValue> {
        let config = SimConfig {
            seed,
            ..SimConfig::with_canvas(width, height)
        };
        Ok(Self {
            state: SimulationState::try_new(config).map_err(js_err)?,
        })
    }

    /// Build from a JSON `SimConfig`; missing fields take defaults
    pub fn from_config_json(json: &str) -> Result<Playground, JsValue> {
        let config = SimConfig::from_json(json).map_err(js_err)?;
        Ok(Self {
            state: SimulationState::try_new(config).map_err(js_err)?,
        })
    }

    /// Canvas resized by the page; false (and unchanged) for a bad size
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        match self.state.resize(crate::Canvas::new(width, height)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Resize to {width}x{height} rejected: {e}");
                false
            }
        }
    }

    /// Returns the new ball id, or 0 for an unknown kind
    pub fn place_ball(&mut self, x: f32, y: f32, kind: &str) -> u32 {
        let Some(kind) = BallKind::from_str(kind) else {
            log::warn!("Unknown ball kind: {kind}");
            return 0;
        };
        self.run(Command::PlaceBall {
            at: Vec2::new(x, y),
            kind,
        })
    }

    /// `coords` is a flat `[x0, y0, x1, y1, ...]` list
    pub fn add_polygon(&mut self, coords: Vec<f32>) -> u32 {
        let points = coords
            .chunks_exact(2)
            .map(|c| Vec2::new(c[0], c[1]))
            .collect();
        self.run(Command::FinalizePolygon { points })
    }

    pub fn place_shape(&mut self, kind: &str, cx: f32, cy: f32, radius: f32) -> u32 {
        let Some(kind) = ShapeKind::from_str(kind) else {
            log::warn!("Unknown shape kind: {kind}");
            return 0;
        };
        self.run(Command::PlaceShape {
            kind,
            center: Vec2::new(cx, cy),
            radius,
        })
    }

    pub fn draw_arrow(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> u32 {
        self.run(Command::DrawArrow {
            start: Vec2::new(x0, y0),
            end: Vec2::new(x1, y1),
        })
    }

    pub fn begin_stroke(&mut self, x: f32, y: f32) -> u32 {
        self.run(Command::BeginStroke { at: Vec2::new(x, y) })
    }

    pub fn extend_stroke(&mut self, stroke: u32, x: f32, y: f32) -> bool {
        let outcome = sim::apply(
            &mut self.state,
            Command::ExtendStroke {
                stroke: sim::EntityId(stroke),
                to: Vec2::new(x, y),
            },
        );
        outcome == Outcome::Extended
    }

    pub fn end_stroke(&mut self, stroke: u32) {
        sim::apply(
            &mut self.state,
            Command::EndStroke {
                stroke: sim::EntityId(stroke),
            },
        );
    }

    /// Returns the number of removed entities
    pub fn erase_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> usize {
        match sim::apply(
            &mut self.state,
            Command::EraseRect {
                from: Vec2::new(x0, y0),
                to: Vec2::new(x1, y1),
            },
        ) {
            Outcome::Erased(ids) => ids.len(),
            _ => 0,
        }
    }

    pub fn clear(&mut self) {
        sim::apply(&mut self.state, Command::Clear);
    }

    /// Advance one frame; returns the frame's note requests as JSON
    pub fn step(&mut self, dt: f32) -> Result<String, JsValue> {
        let events = sim::advance(&mut self.state, dt);
        let notes = NoteRequest::from_events(&events, self.state.config.canvas, &self.state.controls);
        serde_json::to_string(&notes).map_err(js_err)
    }

    /// Full simulation state as JSON for rendering
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(js_err)
    }

    pub fn volume_db(&self) -> f32 {
        self.state.controls.volume_db
    }

    pub fn pitch_semitones(&self) -> f32 {
        self.state.controls.pitch_semitones
    }
}

impl Playground {
    fn run(&mut self, command: Command) -> u32 {
        match sim::apply(&mut self.state, command) {
            Outcome::Created(id) => id.0,
            _ => 0,
        }
    }
}
