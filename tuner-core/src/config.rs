//! # Tuner Configuration
//!
//! All tunable constants of the pipeline live here: the sampling window,
//! the tick rate the pulse input is sampled at, the estimation strategy and
//! the cents bands the per-string Hz thresholds are derived from.
//!
//! Configuration can be loaded from JSON. Every field is optional and falls
//! back to the default below, so `{}` is a valid configuration file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::pitch::EstimationMode;

/// Default sampling window in seconds.
pub const DEFAULT_WINDOW_SECS: f32 = 0.5;

/// Default rate at which the pulse input is sampled.
pub const DEFAULT_TICK_RATE_HZ: u32 = 10_000;

/// Half-width of the `exact` band in cents.
pub const DEFAULT_CLOSE_CENTS: f32 = 24.0;

/// Half-width of the `close` band in cents. Anything beyond is `far`.
pub const DEFAULT_FAR_CENTS: f32 = 50.0;

/// How far outside the outermost strings an estimate may fall before it is
/// treated as out of range. 600 cents is half an octave.
pub const DEFAULT_CAPTURE_RANGE_CENTS: f32 = 600.0;

/// Complete configuration of the tuning pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Length of one measurement window in seconds.
    pub window_secs: f32,
    /// Sampling rate of the binary pulse input.
    pub tick_rate_hz: u32,
    /// How a window's edges are turned into a frequency.
    pub estimation: EstimationMode,
    pub close_cents: f32,
    pub far_cents: f32,
    pub capture_range_cents: f32,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            estimation: EstimationMode::default(),
            close_cents: DEFAULT_CLOSE_CENTS,
            far_cents: DEFAULT_FAR_CENTS,
            capture_range_cents: DEFAULT_CAPTURE_RANGE_CENTS,
        }
    }
}

impl TunerConfig {
    /// Returns a copy of this configuration running at a different tick rate.
    ///
    /// Used when the pulse input comes from an audio device whose sample
    /// rate is only known once the stream is open.
    pub fn with_tick_rate(mut self, tick_rate_hz: u32) -> Self {
        self.tick_rate_hz = tick_rate_hz;
        self
    }

    /// Number of ticks in one sampling window.
    pub fn window_ticks(&self) -> u32 {
        (self.window_secs as f64 * self.tick_rate_hz as f64).round() as u32
    }

    /// Checks every field for sane values.
    ///
    /// # Returns
    /// * `Ok(())` - The configuration can be used to build a pipeline
    /// * `Err(ConfigError)` - The first invalid field found
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("window_secs", self.window_secs)?;
        positive("tick_rate_hz", self.tick_rate_hz as f32)?;
        positive("close_cents", self.close_cents)?;
        positive("far_cents", self.far_cents)?;
        positive("capture_range_cents", self.capture_range_cents)?;

        if self.close_cents > self.far_cents {
            return Err(ConfigError::ThresholdOrder {
                close: self.close_cents,
                far: self.far_cents,
            });
        }
        if self.capture_range_cents < self.far_cents {
            return Err(ConfigError::CaptureRange {
                range: self.capture_range_cents,
                far: self.far_cents,
            });
        }
        if self.window_ticks() == 0 {
            return Err(ConfigError::WindowTooShort {
                window_secs: self.window_secs,
                tick_rate_hz: self.tick_rate_hz,
            });
        }
        Ok(())
    }

    /// Parses and validates a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TunerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field,
            value: value as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TunerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_ticks(), 5_000);
    }

    #[test]
    fn empty_json_gives_defaults() {
        let config = TunerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TunerConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config =
            TunerConfig::from_json_str(r#"{ "window_secs": 0.51, "estimation": "edge_count" }"#)
                .unwrap();
        assert_eq!(config.window_secs, 0.51);
        assert_eq!(config.estimation, EstimationMode::EdgeCount);
        assert_eq!(config.close_cents, DEFAULT_CLOSE_CENTS);
        assert_eq!(config.window_ticks(), 5_100);
    }

    #[test]
    fn rejects_inverted_bands() {
        let config = TunerConfig {
            close_cents: 60.0,
            ..TunerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn rejects_capture_range_inside_far_band() {
        let config = TunerConfig {
            capture_range_cents: 30.0,
            ..TunerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CaptureRange { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_and_zero_values() {
        let nan_window = TunerConfig {
            window_secs: f32::NAN,
            ..TunerConfig::default()
        };
        assert!(matches!(
            nan_window.validate(),
            Err(ConfigError::NotPositive { field: "window_secs", .. })
        ));

        let zero_rate = TunerConfig {
            tick_rate_hz: 0,
            ..TunerConfig::default()
        };
        assert!(zero_rate.validate().is_err());
    }

    #[test]
    fn rejects_window_shorter_than_a_tick() {
        let config = TunerConfig {
            window_secs: 0.0001,
            tick_rate_hz: 1_000,
            ..TunerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WindowTooShort { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            TunerConfig::from_json_str("{ window_secs: }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
