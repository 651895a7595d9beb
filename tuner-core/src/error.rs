//! # Error Types
//!
//! Configuration is the only fallible stage of the tuner. Once a
//! [`TunerConfig`](crate::config::TunerConfig) has been validated and a
//! reference table built, the pipeline itself never fails: missing or
//! unusable input degrades to the blank display state instead.

use thiserror::Error;

/// Errors raised while building or loading a tuner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting was NaN, infinite, zero or negative.
    #[error("`{field}` must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// The close band is wider than the far band.
    #[error("close threshold ({close}) must not exceed far threshold ({far})")]
    ThresholdOrder { close: f32, far: f32 },

    /// The capture range would cut into the far band of the outer strings.
    #[error("capture range ({range} cents) must be at least the far band ({far} cents)")]
    CaptureRange { range: f32, far: f32 },

    /// The sampling window is shorter than a single tick.
    #[error("sampling window of {window_secs}s at {tick_rate_hz} Hz is shorter than one tick")]
    WindowTooShort { window_secs: f32, tick_rate_hz: u32 },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
