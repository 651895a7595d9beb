// tuner-core/src/lib.rs

//! The core decision engine of the guitar string tuner.
//! This crate turns a sampled pulse train into a frequency estimate,
//! matches it against the six strings of a guitar, classifies how far off
//! it is, and encodes the result for a two-digit seven-segment display.
//! It is completely headless and contains no GUI code.

#[cfg(feature = "audio")]
pub mod audio;
pub mod config;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod pitch;
pub mod signal;
pub mod tuning;

pub use config::TunerConfig;
pub use display::{DigitSelect, DisplayFrame, DisplayLatch, Multiplexer, SegmentPattern};
pub use error::ConfigError;
pub use pipeline::Tuner;
pub use pitch::{EstimationMode, Frequency, FrequencyEstimate, PeriodEstimator};
pub use tuning::{NoteName, ProximityBucket, RangeSide, Reading, ReferenceNote, ReferenceTable};
