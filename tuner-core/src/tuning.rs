//! # Guitar Tuning Module
//!
//! Holds the reference table for the six strings of a guitar in standard
//! tuning and implements the two decisions made on every completed window:
//! which string the estimate belongs to, and how far off that string it is.
//!
//! ## Thresholds
//! A fixed tolerance in cents is a very different tolerance in Hz at the
//! bottom and the top of the neck: one Hz at the low E string is about
//! 21 cents, at the high E string about 5 cents. Each [`ReferenceNote`]
//! therefore carries its own Hz thresholds. They are derived from the
//! configured cents bands once, when the table is built, so classifying an
//! estimate is nothing more than a subtraction and two comparisons.

use once_cell::sync::Lazy;
use std::fmt;

use crate::config::TunerConfig;
use crate::error::ConfigError;
use crate::pitch::FrequencyEstimate;

/// Number of strings, and so of entries in a [`ReferenceTable`].
pub const STRING_COUNT: usize = 6;

/// Target frequencies of standard tuning, low E to high E, as the device
/// rounds them.
pub const STANDARD_TUNING: [(NoteName, f32); STRING_COUNT] = [
    (NoteName::E, 83.0),
    (NoteName::A, 110.0),
    (NoteName::D, 147.0),
    (NoteName::G, 196.0),
    (NoteName::B, 247.0),
    (NoteName::E, 330.0),
];

/// The standard tuning table built with the default cents bands.
pub static STANDARD_TABLE: Lazy<ReferenceTable> = Lazy::new(|| {
    let config = TunerConfig::default();
    ReferenceTable::from_cents(
        STANDARD_TUNING,
        config.close_cents,
        config.far_cents,
        config.capture_range_cents,
    )
});

/// Note letters the display can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteName {
    pub const ALL: [NoteName; 7] = [
        NoteName::A,
        NoteName::B,
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<NoteName> {
        Self::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How far an estimate is from its matched string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProximityBucket {
    LowFar,
    LowClose,
    Exact,
    HighClose,
    HighFar,
}

impl ProximityBucket {
    pub const ALL: [ProximityBucket; 5] = [
        ProximityBucket::LowFar,
        ProximityBucket::LowClose,
        ProximityBucket::Exact,
        ProximityBucket::HighClose,
        ProximityBucket::HighFar,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<ProximityBucket> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Which side of the capture range an estimate fell off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSide {
    Below,
    Above,
}

/// Outcome of matching one window's estimate against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reading {
    /// Nothing was heard during the window.
    NoSignal,
    /// Something was heard, but too far from any string to be matched.
    OutOfRange(RangeSide),
    Matched {
        note: NoteName,
        bucket: ProximityBucket,
    },
}

impl Reading {
    /// Returns true when the display should show no note.
    pub fn is_blank(&self) -> bool {
        !matches!(self, Reading::Matched { .. })
    }
}

/// One string of the instrument with its precomputed tolerance band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceNote {
    name: NoteName,
    target_hz: f32,
    close_hz: f32,
    far_hz: f32,
}

impl ReferenceNote {
    /// Creates a reference note from explicit Hz thresholds.
    ///
    /// # Returns
    /// * `Err(ConfigError)` - if any value is non-positive or `close > far`
    pub fn new(
        name: NoteName,
        target_hz: f32,
        close_hz: f32,
        far_hz: f32,
    ) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("target_hz", target_hz),
            ("close_hz", close_hz),
            ("far_hz", far_hz),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive {
                    field,
                    value: value as f64,
                });
            }
        }
        if close_hz > far_hz {
            return Err(ConfigError::ThresholdOrder {
                close: close_hz,
                far: far_hz,
            });
        }
        Ok(Self {
            name,
            target_hz,
            close_hz,
            far_hz,
        })
    }

    /// Derives the Hz thresholds from cents bands above the target.
    ///
    /// Cents bands must already be validated (positive, `close <= far`).
    pub fn from_cents(name: NoteName, target_hz: f32, close_cents: f32, far_cents: f32) -> Self {
        Self {
            name,
            target_hz,
            close_hz: cents_to_hz_offset(target_hz, close_cents),
            far_hz: cents_to_hz_offset(target_hz, far_cents),
        }
    }

    pub fn name(&self) -> NoteName {
        self.name
    }

    pub fn target_hz(&self) -> f32 {
        self.target_hz
    }

    pub fn close_hz(&self) -> f32 {
        self.close_hz
    }

    pub fn far_hz(&self) -> f32 {
        self.far_hz
    }

    /// Buckets the signed deviation of `freq_hz` from this note's target.
    pub fn classify(&self, freq_hz: f32) -> ProximityBucket {
        let deviation = freq_hz - self.target_hz;
        if deviation < -self.far_hz {
            ProximityBucket::LowFar
        } else if deviation < -self.close_hz {
            ProximityBucket::LowClose
        } else if deviation <= self.close_hz {
            ProximityBucket::Exact
        } else if deviation <= self.far_hz {
            ProximityBucket::HighClose
        } else {
            ProximityBucket::HighFar
        }
    }
}

/// The active set of six strings, sorted by target frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    notes: [ReferenceNote; STRING_COUNT],
    min_hz: f32,
    max_hz: f32,
}

impl ReferenceTable {
    /// Builds a table from explicit reference notes.
    ///
    /// `capture_range_cents` sets how far below the lowest and above the
    /// highest target an estimate may fall before it is out of range.
    pub fn new(mut notes: [ReferenceNote; STRING_COUNT], capture_range_cents: f32) -> Self {
        notes.sort_by(|a, b| a.target_hz.total_cmp(&b.target_hz));
        let ratio = cents_to_ratio(capture_range_cents);
        let min_hz = notes[0].target_hz / ratio;
        let max_hz = notes[STRING_COUNT - 1].target_hz * ratio;
        Self {
            notes,
            min_hz,
            max_hz,
        }
    }

    /// Builds a table deriving every note's thresholds from the same bands.
    pub fn from_cents(
        strings: [(NoteName, f32); STRING_COUNT],
        close_cents: f32,
        far_cents: f32,
        capture_range_cents: f32,
    ) -> Self {
        let notes = strings
            .map(|(name, target)| ReferenceNote::from_cents(name, target, close_cents, far_cents));
        Self::new(notes, capture_range_cents)
    }

    /// Builds the standard tuning table from a validated configuration.
    pub fn from_config(config: &TunerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_cents(
            STANDARD_TUNING,
            config.close_cents,
            config.far_cents,
            config.capture_range_cents,
        ))
    }

    pub fn notes(&self) -> &[ReferenceNote; STRING_COUNT] {
        &self.notes
    }

    /// Lowest frequency still matched to a string.
    pub fn min_hz(&self) -> f32 {
        self.min_hz
    }

    /// Highest frequency still matched to a string.
    pub fn max_hz(&self) -> f32 {
        self.max_hz
    }

    /// Finds the string closest to `freq_hz`. On an exact tie the lower
    /// string wins.
    pub fn nearest(&self, freq_hz: f32) -> &ReferenceNote {
        let mut best = &self.notes[0];
        for note in &self.notes[1..] {
            if (note.target_hz - freq_hz).abs() < (best.target_hz - freq_hz).abs() {
                best = note;
            }
        }
        best
    }

    /// Matches one window's estimate and classifies it.
    pub fn evaluate(&self, estimate: FrequencyEstimate) -> Reading {
        let Some(freq) = estimate.frequency() else {
            return Reading::NoSignal;
        };
        let hz = freq.hz();
        if hz < self.min_hz {
            return Reading::OutOfRange(RangeSide::Below);
        }
        if hz > self.max_hz {
            return Reading::OutOfRange(RangeSide::Above);
        }

        let note = self.nearest(hz);
        Reading::Matched {
            note: note.name,
            bucket: note.classify(hz),
        }
    }
}

/// Converts a pitch interval in cents to a frequency ratio.
pub fn cents_to_ratio(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}

/// Width in Hz of a band of `cents` above `target_hz`.
pub fn cents_to_hz_offset(target_hz: f32, cents: f32) -> f32 {
    target_hz * (cents_to_ratio(cents) - 1.0)
}

/// Calculates the deviation of `freq` from `target_freq` in cents.
///
/// Used for the per-window diagnostic log; classification never takes a
/// logarithm.
pub fn calculate_cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}
