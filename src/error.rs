//! Error taxonomy
//!
//! Simulation errors never escape a frame: geometry problems are skipped for
//! the entity that caused them, out-of-range controls are clamped. The only
//! errors a caller sees come from entity construction and config loading.

use thiserror::Error;

/// Errors raised by geometry, entities and gesture controls
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Not enough points (or zero length) for the requested geometric query
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// An entity that violates its construction invariants
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// A gesture control pushed past its allowed range
    #[error("control {name} = {value} outside [{min}, {max}]")]
    OutOfRangeControl {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Errors raised while loading or validating a `SimConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = SimError::OutOfRangeControl {
            name: "pitch",
            value: 14.0,
            min: -12.0,
            max: 12.0,
        };
        assert_eq!(err.to_string(), "control pitch = 14 outside [-12, 12]");
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
