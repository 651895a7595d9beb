//! End-to-end runs of the tuner against a simulated string.
//!
//! Each case resets the tuner, plays a square wave at the given frequency
//! for a while, then reads both digits back through the multiplexer the
//! way the display hardware would.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tuner_core::display::{encode_note, encode_proximity};
use tuner_core::{
    DigitSelect, DisplayFrame, DisplayLatch, EstimationMode, Multiplexer, NoteName,
    ProximityBucket, Reading, SegmentPattern, Tuner, TunerConfig,
};

const TICK_RATE: u32 = 10_000;

/// Square wave sampled at [`TICK_RATE`], in whole-hertz steps.
struct StringSource {
    freq_hz: u64,
    tick: u64,
}

impl StringSource {
    fn new(freq_hz: u64) -> Self {
        Self { freq_hz, tick: 0 }
    }

    /// Starts the wave part-way through a period.
    fn with_phase(freq_hz: u64, offset_ticks: u64) -> Self {
        Self {
            freq_hz,
            tick: offset_ticks,
        }
    }

    fn next_level(&mut self) -> bool {
        let level = (self.tick * 2 * self.freq_hz / TICK_RATE as u64) % 2 == 1;
        self.tick += 1;
        level
    }
}

fn harness_config() -> TunerConfig {
    TunerConfig {
        window_secs: 0.51,
        tick_rate_hz: TICK_RATE,
        ..TunerConfig::default()
    }
}

/// Plays `freq_hz` for `secs` seconds and returns what the bus shows for
/// (proximity, note).
fn play(config: &TunerConfig, freq_hz: u64, secs: f64) -> (SegmentPattern, SegmentPattern) {
    let mut tuner = Tuner::new(config).unwrap();
    tuner.reset();
    let latch = tuner.latch();

    let mut source = StringSource::new(freq_hz);
    let ticks = (secs * TICK_RATE as f64).round() as u64;
    for _ in 0..ticks {
        tuner.tick(source.next_level());
    }

    let mux = Multiplexer::new(&latch);
    (
        mux.read(DigitSelect::from_level(false)),
        mux.read(DigitSelect::from_level(true)),
    )
}

fn assert_shows(freq_hz: u64, note: NoteName, bucket: ProximityBucket) {
    let (proximity, shown_note) = play(&harness_config(), freq_hz, 1.3);
    assert_eq!(shown_note, encode_note(note), "note digit for {} Hz", freq_hz);
    assert_eq!(
        proximity,
        encode_proximity(bucket),
        "proximity digit for {} Hz",
        freq_hz
    );
}

#[test]
fn g_three_hz_sharp_is_high_close() {
    assert_shows(199, NoteName::G, ProximityBucket::HighClose);
}

#[test]
fn high_e_twenty_hz_sharp_is_high_far() {
    assert_shows(350, NoteName::E, ProximityBucket::HighFar);
}

#[test]
fn low_e_seven_hz_flat_is_low_far() {
    assert_shows(76, NoteName::E, ProximityBucket::LowFar);
}

#[test]
fn low_e_one_hz_flat_is_exact() {
    assert_shows(82, NoteName::E, ProximityBucket::Exact);
}

#[test]
fn high_e_seven_hz_flat_is_only_low_close() {
    assert_shows(323, NoteName::E, ProximityBucket::LowClose);
}

#[test]
fn high_e_on_pitch_is_exact() {
    assert_shows(330, NoteName::E, ProximityBucket::Exact);
}

#[test]
fn g_four_hz_flat_is_low_close() {
    assert_shows(192, NoteName::G, ProximityBucket::LowClose);
}

#[test]
fn g_ten_hz_flat_is_low_far() {
    assert_shows(186, NoteName::G, ProximityBucket::LowFar);
}

#[test]
fn a_seven_hz_sharp_is_high_far() {
    assert_shows(117, NoteName::A, ProximityBucket::HighFar);
}

#[test]
fn a_on_pitch_is_exact() {
    assert_shows(110, NoteName::A, ProximityBucket::Exact);
}

#[test]
fn b_four_hz_sharp_is_high_close() {
    assert_shows(251, NoteName::B, ProximityBucket::HighClose);
}

#[test]
fn b_one_hz_sharp_is_exact() {
    assert_shows(248, NoteName::B, ProximityBucket::Exact);
}

#[test]
fn half_second_window_agrees_with_the_harness_window() {
    let config = TunerConfig {
        window_secs: 0.5,
        ..harness_config()
    };
    for (freq, note, bucket) in [
        (199, NoteName::G, ProximityBucket::HighClose),
        (350, NoteName::E, ProximityBucket::HighFar),
        (76, NoteName::E, ProximityBucket::LowFar),
        (330, NoteName::E, ProximityBucket::Exact),
        (248, NoteName::B, ProximityBucket::Exact),
    ] {
        let (proximity, shown_note) = play(&config, freq, 1.0);
        assert_eq!(shown_note, encode_note(note), "{} Hz", freq);
        assert_eq!(proximity, encode_proximity(bucket), "{} Hz", freq);
    }
}

#[test]
fn twenty_hz_is_out_of_range_and_blank() {
    let (proximity, note) = play(&harness_config(), 20, 1.3);
    assert_eq!(note, SegmentPattern::DASH);
    assert_eq!(proximity, SegmentPattern::BLANK);
}

#[test]
fn silence_keeps_the_display_blank() {
    let mut tuner = Tuner::new(&harness_config()).unwrap();
    let latch = tuner.latch();
    let readings: Vec<Reading> = (0..15_300).filter_map(|_| tuner.tick(false)).collect();

    assert_eq!(readings, vec![Reading::NoSignal; 3]);
    assert_eq!(latch.frame(), DisplayFrame::BLANK);
}

#[test]
fn stable_input_gives_the_same_reading_every_window() {
    let mut tuner = Tuner::new(&harness_config()).unwrap();
    let mut source = StringSource::new(147);
    let readings: Vec<Reading> = (0..51_000)
        .filter_map(|_| tuner.tick(source.next_level()))
        .collect();

    assert_eq!(readings.len(), 10);
    assert!(readings.iter().all(|r| *r == readings[0]));
    assert_eq!(
        readings[0],
        Reading::Matched {
            note: NoteName::D,
            bucket: ProximityBucket::Exact
        }
    );
}

#[test]
fn window_may_start_mid_cycle() {
    for offset in [0, 7, 13, 21] {
        let mut tuner = Tuner::new(&harness_config()).unwrap();
        let mut source = StringSource::with_phase(196, offset);
        let reading = tuner.process((0..5_100).map(|_| source.next_level()));
        assert_eq!(
            reading,
            Some(Reading::Matched {
                note: NoteName::G,
                bucket: ProximityBucket::Exact
            }),
            "offset {}",
            offset
        );
    }
}

#[test]
fn edge_count_mode_cannot_resolve_three_hz_at_g() {
    let config = TunerConfig {
        window_secs: 0.5,
        estimation: EstimationMode::EdgeCount,
        ..harness_config()
    };
    let mut tuner = Tuner::new(&config).unwrap();
    let mut source = StringSource::new(199);
    let reading = tuner.process((0..5_000).map(|_| source.next_level()));
    // 99 edges in half a second reads as 198 Hz, inside the exact band.
    assert_eq!(
        reading,
        Some(Reading::Matched {
            note: NoteName::G,
            bucket: ProximityBucket::Exact
        })
    );
}

#[test]
fn reset_mid_window_blanks_and_restarts() {
    let mut tuner = Tuner::new(&harness_config()).unwrap();
    let latch = tuner.latch();
    let mut source = StringSource::new(110);
    tuner.process((0..5_100).map(|_| source.next_level()));
    assert!(!latch.current().is_blank());

    tuner.process((0..2_000).map(|_| source.next_level()));
    tuner.reset();
    assert_eq!(latch.frame(), DisplayFrame::BLANK);

    // The next reading needs a full window after the reset.
    assert_eq!(tuner.process((0..5_099).map(|_| source.next_level())), None);
    assert!(tuner.tick(source.next_level()).is_some());
}

#[test]
fn one_snapshot_never_mixes_two_windows() {
    let latch = Arc::new(DisplayLatch::new());
    let done = Arc::new(AtomicBool::new(false));

    // Neither glyph is shared between the two readings, so a mixed pair
    // cannot pass for either of them.
    let first = Reading::Matched {
        note: NoteName::A,
        bucket: ProximityBucket::LowFar,
    };
    let second = Reading::Matched {
        note: NoteName::G,
        bucket: ProximityBucket::HighFar,
    };
    let published = [Reading::NoSignal, first, second];
    let pairs: Vec<(SegmentPattern, SegmentPattern)> = published
        .iter()
        .map(|&r| {
            let frame = DisplayFrame::from(r);
            (frame.proximity, frame.note)
        })
        .collect();

    let writer = {
        let latch = Arc::clone(&latch);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..100_000 {
                latch.publish(if i % 2 == 0 { first } else { second });
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut reads = 0u64;
    while !done.load(Ordering::Acquire) || reads < 1_000 {
        let snapshot = latch.frame();
        let pair = (
            snapshot.select(DigitSelect::Proximity),
            snapshot.select(DigitSelect::Note),
        );
        assert!(pairs.contains(&pair), "mixed pair {:?}", pair);
        assert!(published.contains(&latch.current()));
        reads += 1;
    }

    writer.join().unwrap();
}
