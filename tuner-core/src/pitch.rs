//! # Period Estimation Module
//!
//! Turns a sampled binary pulse train into one frequency estimate per fixed
//! sampling window. The estimator is advanced one tick at a time and only
//! yields a value once a window is complete, so a consumer never sees a
//! partial-window result.
//!
//! ## Features
//! - Rising-edge detection on a level sampled once per tick
//! - Two estimation strategies: plain edge counting and edge-to-edge period
//! - Integer millihertz arithmetic, truncated toward zero
//! - Explicit "no signal" result for silent windows

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy used to turn a window's edges into a frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    /// Measure the time between the first and last rising edge of the
    /// window and divide by the number of whole periods in between.
    #[default]
    Period,
    /// Count rising edges and divide by the window length. Resolution is
    /// limited to `1 / window` Hz.
    EdgeCount,
}

/// A measured frequency, stored in millihertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency {
    millihertz: u64,
}

impl Frequency {
    pub fn from_millihertz(millihertz: u64) -> Self {
        Self { millihertz }
    }

    pub fn millihertz(&self) -> u64 {
        self.millihertz
    }

    /// The frequency in Hz.
    pub fn hz(&self) -> f32 {
        self.millihertz as f32 / 1000.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03} Hz", self.millihertz / 1000, self.millihertz % 1000)
    }
}

/// Result of one sampling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyEstimate {
    /// Too few qualifying edges were seen to estimate anything.
    NoSignal,
    Measured(Frequency),
}

impl FrequencyEstimate {
    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            FrequencyEstimate::NoSignal => None,
            FrequencyEstimate::Measured(freq) => Some(*freq),
        }
    }
}

/// Accumulates edges over a sampling window.
///
/// Call [`tick`](PeriodEstimator::tick) once per sample of the pulse input.
/// Every `window_ticks` calls it returns the estimate for the window that
/// just ended and starts a fresh one.
#[derive(Debug, Clone)]
pub struct PeriodEstimator {
    // Configuration
    tick_rate_hz: u32,
    window_ticks: u32,
    mode: EstimationMode,

    // Internal state
    last_level: Option<bool>,
    elapsed: u32,
    edges: u32,
    first_edge: Option<u32>,
    last_edge: u32,
}

impl PeriodEstimator {
    /// Creates a new estimator.
    ///
    /// * `tick_rate_hz`: how often [`tick`](Self::tick) is called per second.
    /// * `window_ticks`: number of ticks per sampling window. Clamped to at
    ///   least one tick.
    pub fn new(tick_rate_hz: u32, window_ticks: u32, mode: EstimationMode) -> Self {
        Self {
            tick_rate_hz,
            window_ticks: window_ticks.max(1),
            mode,
            last_level: None,
            elapsed: 0,
            edges: 0,
            first_edge: None,
            last_edge: 0,
        }
    }

    pub fn window_ticks(&self) -> u32 {
        self.window_ticks
    }

    pub fn mode(&self) -> EstimationMode {
        self.mode
    }

    /// Feeds one sample of the pulse input.
    ///
    /// Returns `Some(estimate)` on the tick that completes a window and
    /// `None` otherwise.
    pub fn tick(&mut self, level: bool) -> Option<FrequencyEstimate> {
        // The first level after a reset is only a baseline; an input that
        // starts high is not a rising edge.
        let rising = self.last_level == Some(false) && level;
        self.last_level = Some(level);

        if rising {
            self.first_edge.get_or_insert(self.elapsed);
            self.last_edge = self.elapsed;
            self.edges += 1;
        }

        self.elapsed += 1;
        if self.elapsed < self.window_ticks {
            return None;
        }

        let estimate = self.estimate();
        self.clear_window();
        Some(estimate)
    }

    /// Discards the partial window and forgets the last seen level.
    pub fn reset(&mut self) {
        self.clear_window();
        self.last_level = None;
    }

    fn clear_window(&mut self) {
        self.elapsed = 0;
        self.edges = 0;
        self.first_edge = None;
        self.last_edge = 0;
    }

    fn estimate(&self) -> FrequencyEstimate {
        // Products of a full window of edges and a u32 tick rate need 128 bits.
        let tick_rate_mhz = self.tick_rate_hz as u128 * 1000;
        let millihertz = match self.mode {
            EstimationMode::EdgeCount => {
                if self.edges == 0 {
                    return FrequencyEstimate::NoSignal;
                }
                self.edges as u128 * tick_rate_mhz / self.window_ticks as u128
            }
            EstimationMode::Period => {
                let Some(first) = self.first_edge else {
                    return FrequencyEstimate::NoSignal;
                };
                let span = (self.last_edge - first) as u128;
                if self.edges < 2 || span == 0 {
                    return FrequencyEstimate::NoSignal;
                }
                (self.edges - 1) as u128 * tick_rate_mhz / span
            }
        };
        // Never above the tick rate itself, which fits in u64.
        let millihertz = millihertz as u64;

        if millihertz == 0 {
            FrequencyEstimate::NoSignal
        } else {
            FrequencyEstimate::Measured(Frequency::from_millihertz(millihertz))
        }
    }
}
