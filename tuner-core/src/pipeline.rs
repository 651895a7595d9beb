//! # Tuning Pipeline
//!
//! Wires the three stages together: the [`PeriodEstimator`] accumulates
//! edges tick by tick, and on every window boundary its estimate is matched
//! against the [`ReferenceTable`] and the resulting [`Reading`] is published
//! to the shared [`DisplayLatch`], all within the same tick.

use log::{debug, info};
use std::sync::Arc;

use crate::config::TunerConfig;
use crate::display::DisplayLatch;
use crate::error::ConfigError;
use crate::pitch::{FrequencyEstimate, PeriodEstimator};
use crate::signal::PulseShaper;
use crate::tuning::{ReferenceTable, Reading, calculate_cents_deviation};

/// Evaluates one completed window. Pure: no state survives the call.
pub fn evaluate(table: &ReferenceTable, estimate: FrequencyEstimate) -> Reading {
    table.evaluate(estimate)
}

/// The tick-driven tuner.
///
/// Owns the estimator and the reference table and is the only writer of
/// its latch. Readers get the latch through [`latch`](Tuner::latch).
#[derive(Debug)]
pub struct Tuner {
    estimator: PeriodEstimator,
    table: ReferenceTable,
    latch: Arc<DisplayLatch>,
}

impl Tuner {
    /// Builds a tuner from a configuration, validating it first.
    pub fn new(config: &TunerConfig) -> Result<Self, ConfigError> {
        let table = ReferenceTable::from_config(config)?;
        Ok(Self::with_table(config, table))
    }

    /// Builds a tuner around an explicit reference table.
    ///
    /// The window settings of `config` are used as given.
    pub fn with_table(config: &TunerConfig, table: ReferenceTable) -> Self {
        let estimator =
            PeriodEstimator::new(config.tick_rate_hz, config.window_ticks(), config.estimation);
        info!(
            "[TUNER] window of {} ticks at {} Hz, {:?} estimation",
            estimator.window_ticks(),
            config.tick_rate_hz,
            estimator.mode()
        );
        Self {
            estimator,
            table,
            latch: Arc::new(DisplayLatch::new()),
        }
    }

    /// Shared handle to the published result.
    pub fn latch(&self) -> Arc<DisplayLatch> {
        Arc::clone(&self.latch)
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Advances the pipeline by one sample of the pulse input.
    ///
    /// Returns the new reading on the tick that completes a window.
    pub fn tick(&mut self, level: bool) -> Option<Reading> {
        let estimate = self.estimator.tick(level)?;
        let reading = evaluate(&self.table, estimate);
        match estimate.frequency() {
            Some(freq) => {
                let nearest = self.table.nearest(freq.hz());
                debug!(
                    "[TUNER] window complete: {} -> {:?} ({:+.1} cents off {})",
                    freq,
                    reading,
                    calculate_cents_deviation(freq.hz(), nearest.target_hz()),
                    nearest.name()
                );
            }
            None => debug!("[TUNER] window complete: no signal"),
        }
        self.latch.publish(reading);
        Some(reading)
    }

    /// Feeds a run of samples, returning the last reading completed.
    pub fn process(&mut self, levels: impl IntoIterator<Item = bool>) -> Option<Reading> {
        levels.into_iter().filter_map(|level| self.tick(level)).last()
    }

    /// Squares up analog samples with `shaper` and feeds them, one tick per
    /// sample. Returns the last reading completed.
    pub fn process_samples(&mut self, shaper: &mut PulseShaper, samples: &[f32]) -> Option<Reading> {
        self.process(samples.iter().map(|&sample| shaper.update(sample)))
    }

    /// Clears the accumulated window and blanks the display.
    pub fn reset(&mut self) {
        info!("[TUNER] reset");
        self.estimator.reset();
        self.latch.clear();
    }
}
