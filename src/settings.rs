//! Simulation settings
//!
//! Every tunable constant lives here so hosts can override them from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::Canvas;

/// How ball positions advance each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Integration {
    /// Positions advance by `velocity` once per frame, whatever `dt` is.
    /// Motion speed follows the host frame rate.
    #[default]
    PerFrame,
    /// Positions advance by `velocity * dt * reference_hz`, which matches
    /// `PerFrame` at `reference_hz` and stays frame-rate independent elsewhere.
    TimeScaled { reference_hz: f32 },
}

impl Integration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Integration::PerFrame => "per-frame",
            Integration::TimeScaled { .. } => "time-scaled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "per-frame" | "frame" => Some(Integration::PerFrame),
            "time-scaled" | "scaled" => Some(Integration::TimeScaled { reference_hz: 60.0 }),
            _ => None,
        }
    }

    /// Multiplier applied to velocity for a frame of length `dt`
    #[inline]
    pub fn step_scale(&self, dt: f32) -> f32 {
        match self {
            Integration::PerFrame => 1.0,
            Integration::TimeScaled { reference_hz } => dt * reference_hz,
        }
    }
}

/// Simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Canvas bounds balls are clamped to
    pub canvas: Canvas,
    /// Seed for ball launch directions
    pub seed: u64,
    /// Ball position integration mode
    pub integration: Integration,

    // === Collisions ===
    /// Velocity retention after any bounce
    pub restitution: f32,

    // === Balls ===
    pub ball_radius: f32,
    /// Launch speed in canvas units per frame
    pub ball_speed: f32,

    // === Playheads ===
    /// Playhead speed in canvas units per second
    pub playhead_speed: f32,
    pub vertex_threshold: f32,

    // === Brush field ===
    pub brush_width: f32,
    pub slow_base: f32,
    pub slow_floor: f32,

    // === Arrows / gestures ===
    /// Arrow lifetime in seconds
    pub arrow_lifetime: f32,
    pub gesture_max_drag: f32,
    pub gesture_volume_per_drag_db: f32,
    pub gesture_pitch_per_drag: f32,
    pub gesture_volume_range_db: (f32, f32),
    pub gesture_pitch_range: (f32, f32),

    // === Shapes ===
    pub min_shape_radius: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            seed: 0x5eed,
            integration: Integration::PerFrame,

            restitution: RESTITUTION,

            ball_radius: BALL_RADIUS,
            ball_speed: BALL_LAUNCH_SPEED,

            playhead_speed: PLAYHEAD_SPEED,
            vertex_threshold: VERTEX_THRESHOLD,

            brush_width: BRUSH_WIDTH,
            slow_base: BRUSH_SLOW_BASE,
            slow_floor: BRUSH_SLOW_FLOOR,

            arrow_lifetime: ARROW_LIFETIME,
            gesture_max_drag: GESTURE_MAX_DRAG,
            gesture_volume_per_drag_db: GESTURE_VOLUME_PER_DRAG_DB,
            gesture_pitch_per_drag: GESTURE_PITCH_PER_DRAG_SEMITONES,
            gesture_volume_range_db: GESTURE_VOLUME_RANGE_DB,
            gesture_pitch_range: GESTURE_PITCH_RANGE_SEMITONES,

            min_shape_radius: MIN_SHAPE_RADIUS,
        }
    }
}

impl SimConfig {
    /// Config with a custom canvas and defaults elsewhere
    pub fn with_canvas(width: f32, height: f32) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config (missing fields fall back to defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite and positive",
                })
            }
        }
        fn ordered(field: &'static str, range: (f32, f32)) -> Result<(), ConfigError> {
            if range.0.is_finite() && range.1.is_finite() && range.0 <= range.1 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "range must be finite with min <= max",
                })
            }
        }

        let Canvas { width, height } = self.canvas;
        if !(width >= 0.0 && height >= 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "canvas",
                reason: "dimensions must be finite and non-negative",
            });
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Invalid {
                field: "restitution",
                reason: "must lie in [0, 1]",
            });
        }
        if !(self.slow_base > 0.0 && self.slow_base <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "slow_base",
                reason: "must lie in (0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.slow_floor) {
            return Err(ConfigError::Invalid {
                field: "slow_floor",
                reason: "must lie in [0, 1]",
            });
        }
        if let Integration::TimeScaled { reference_hz } = self.integration {
            positive("integration.reference_hz", reference_hz)?;
        }

        positive("ball_radius", self.ball_radius)?;
        positive("playhead_speed", self.playhead_speed)?;
        positive("vertex_threshold", self.vertex_threshold)?;
        positive("brush_width", self.brush_width)?;
        positive("arrow_lifetime", self.arrow_lifetime)?;
        positive("gesture_max_drag", self.gesture_max_drag)?;
        ordered("gesture_volume_range_db", self.gesture_volume_range_db)?;
        ordered("gesture_pitch_range", self.gesture_pitch_range)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "restitution": 0.5, "canvas": { "width": 320, "height": 240 } }"#)
            .unwrap();
        assert_eq!(config.restitution, 0.5);
        assert_eq!(config.canvas, Canvas::new(320.0, 240.0));
        assert_eq!(config.ball_radius, BALL_RADIUS);
        assert_eq!(config.integration, Integration::PerFrame);
    }

    #[test]
    fn test_invalid_restitution_rejected() {
        let err = SimConfig::from_json(r#"{ "restitution": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "restitution",
                ..
            }
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_integration_mode() {
        let config = SimConfig {
            integration: Integration::TimeScaled { reference_hz: 60.0 },
            ..SimConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_integration_scale() {
        assert_eq!(Integration::PerFrame.step_scale(0.5), 1.0);
        let scaled = Integration::from_str("scaled").unwrap();
        assert!((scaled.step_scale(1.0 / 60.0) - 1.0).abs() < 1e-6);
        assert_eq!(Integration::from_str("bogus"), None);
    }
}
