//! # Display Encoding Module
//!
//! Maps a [`Reading`] onto the two seven-segment digits of the tuner and
//! exposes them one at a time on a shared 8-bit bus.
//!
//! Bit layout of a [`SegmentPattern`], most significant bit first:
//!
//! ```text
//!  bit: 7 6 5 4 3 2 1 0
//!  seg: a b c d e f g dp
//! ```
//!
//! The latest reading lives in a [`DisplayLatch`] as a single atomic byte.
//! The pipeline is its only writer; the multiplexer can read it from any
//! thread at any time and always gets both digits from the same window.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::tuning::{NoteName, ProximityBucket, RangeSide, Reading};

/// Lit segments of one digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentPattern(pub u8);

impl SegmentPattern {
    pub const BLANK: SegmentPattern = SegmentPattern(0b0000_0000);
    pub const DASH: SegmentPattern = SegmentPattern(0b0000_0010);

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether the segment at `bit` (7 = a, 0 = decimal point) is lit.
    pub fn is_lit(self, bit: u8) -> bool {
        bit < 8 && self.0 & (1 << bit) != 0
    }
}

/// State of the digit-select line.
///
/// The polarity is fixed: a low line addresses the proximity digit, a high
/// line the note digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitSelect {
    Proximity,
    Note,
}

impl DigitSelect {
    pub fn from_level(level: bool) -> Self {
        if level {
            DigitSelect::Note
        } else {
            DigitSelect::Proximity
        }
    }

    pub fn level(self) -> bool {
        self == DigitSelect::Note
    }

    pub fn toggled(self) -> Self {
        Self::from_level(!self.level())
    }
}

/// Segment pattern of a note letter.
pub fn encode_note(note: NoteName) -> SegmentPattern {
    SegmentPattern(match note {
        NoteName::A => 0b1110_1110,
        NoteName::B => 0b0011_1110, // b
        NoteName::C => 0b1001_1100,
        NoteName::D => 0b0111_1010, // d
        NoteName::E => 0b1001_1110,
        NoteName::F => 0b1000_1110,
        NoteName::G => 0b1111_0110, // g
    })
}

/// Segment pattern of a proximity glyph.
pub fn encode_proximity(bucket: ProximityBucket) -> SegmentPattern {
    SegmentPattern(match bucket {
        ProximityBucket::LowFar => 0b0011_1000,
        ProximityBucket::LowClose => 0b0010_1010,
        ProximityBucket::Exact => 0b0000_0001,
        ProximityBucket::HighClose => 0b0100_0110,
        ProximityBucket::HighFar => 0b1100_0100,
    })
}

/// Both digits for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayFrame {
    pub note: SegmentPattern,
    pub proximity: SegmentPattern,
}

impl DisplayFrame {
    /// The idle frame: a dash for the note and nothing for proximity.
    pub const BLANK: DisplayFrame = DisplayFrame {
        note: SegmentPattern::DASH,
        proximity: SegmentPattern::BLANK,
    };

    /// The pattern the bus carries for a given select state.
    pub fn select(&self, select: DigitSelect) -> SegmentPattern {
        match select {
            DigitSelect::Note => self.note,
            DigitSelect::Proximity => self.proximity,
        }
    }
}

impl From<Reading> for DisplayFrame {
    fn from(reading: Reading) -> Self {
        match reading {
            Reading::Matched { note, bucket } => DisplayFrame {
                note: encode_note(note),
                proximity: encode_proximity(bucket),
            },
            Reading::NoSignal | Reading::OutOfRange(_) => DisplayFrame::BLANK,
        }
    }
}

// Packed layout of a reading inside the latch:
//   0x00                      no signal
//   0x01 / 0x02               out of range below / above
//   0x80 | note << 3 | bucket matched
const PACKED_NO_SIGNAL: u8 = 0x00;
const PACKED_BELOW: u8 = 0x01;
const PACKED_ABOVE: u8 = 0x02;
const PACKED_MATCHED: u8 = 0x80;

fn pack(reading: Reading) -> u8 {
    match reading {
        Reading::NoSignal => PACKED_NO_SIGNAL,
        Reading::OutOfRange(RangeSide::Below) => PACKED_BELOW,
        Reading::OutOfRange(RangeSide::Above) => PACKED_ABOVE,
        Reading::Matched { note, bucket } => PACKED_MATCHED | note.index() << 3 | bucket.index(),
    }
}

fn unpack(bits: u8) -> Reading {
    match bits {
        PACKED_BELOW => Reading::OutOfRange(RangeSide::Below),
        PACKED_ABOVE => Reading::OutOfRange(RangeSide::Above),
        bits if bits & PACKED_MATCHED != 0 => {
            let note = NoteName::from_index((bits >> 3) & 0x0F);
            let bucket = ProximityBucket::from_index(bits & 0x07);
            match (note, bucket) {
                (Some(note), Some(bucket)) => Reading::Matched { note, bucket },
                _ => Reading::NoSignal,
            }
        }
        _ => Reading::NoSignal,
    }
}

/// The single shared result of the pipeline.
///
/// One writer publishes a whole [`Reading`] per window with one atomic
/// store, so a reader can never observe the note of one window paired with
/// the proximity of another.
#[derive(Debug)]
pub struct DisplayLatch {
    packed: AtomicU8,
}

impl Default for DisplayLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayLatch {
    /// Creates a latch holding the blank state.
    pub fn new() -> Self {
        Self {
            packed: AtomicU8::new(PACKED_NO_SIGNAL),
        }
    }

    pub fn publish(&self, reading: Reading) {
        self.packed.store(pack(reading), Ordering::Release);
    }

    /// Forces the blank state.
    pub fn clear(&self) {
        self.publish(Reading::NoSignal);
    }

    pub fn current(&self) -> Reading {
        unpack(self.packed.load(Ordering::Acquire))
    }

    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame::from(self.current())
    }
}

/// Drives the shared segment bus from a latch.
///
/// Holds no reading of its own: every [`read`](Multiplexer::read) takes the
/// latest published value. A consumer that must show both digits from the
/// same window takes one [`DisplayLatch::frame`] snapshot instead.
#[derive(Debug, Clone, Copy)]
pub struct Multiplexer<'a> {
    latch: &'a DisplayLatch,
}

impl<'a> Multiplexer<'a> {
    pub fn new(latch: &'a DisplayLatch) -> Self {
        Self { latch }
    }

    /// Value on the bus for the given select state.
    pub fn read(&self, select: DigitSelect) -> SegmentPattern {
        self.latch.frame().select(select)
    }
}
