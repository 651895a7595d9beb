//! # String Tuner - Two-Digit Display
//!
//! Desktop front end for the tuner core. It shows exactly what the device
//! shows: one seven-segment digit with the matched note letter and one with
//! the proximity glyph.
//!
//! ## Architecture
//! - **Audio Thread**: captures samples, squares them up and runs the
//!   tick-driven pipeline, publishing each window into the display latch
//! - **Main Thread**: Iced GUI that toggles the digit-select line on every
//!   scan tick and refreshes both digits from one latch snapshot per cycle
//! - **Communication**: Crossbeam channels for the latch hand-over and
//!   shutdown, the atomic latch for readings

mod ui;

use anyhow::{Context, Result};
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use iced::{Element, Subscription, Theme};
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tuner_core::{
    DigitSelect, DisplayFrame, DisplayLatch, SegmentPattern, Tuner, TunerConfig, audio,
    signal::PulseShaper,
};
use ui::main_display::create_main_view;

/// Half-width of the pulse shaper's hysteresis band, in sample units.
const SHAPER_HYSTERESIS: f32 = 0.02;

/// Time between two scans of the digit-select line.
const SCAN_INTERVAL: Duration = Duration::from_millis(4);

/// Frames buffered between the audio callback and the analysis thread.
const FRAME_QUEUE: usize = 64;

/// Main entry point.
///
/// Accepts an optional path to a JSON tuner configuration as the first
/// argument.
pub fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("[MAIN] starting string tuner");
    let result = iced::application("String Tuner", TunerApp::update, TunerApp::view)
        .subscription(TunerApp::subscription)
        .theme(TunerApp::theme)
        .window_size((360.0, 260.0))
        .run();
    info!("[MAIN] application finished with result: {:?}", result);
    result
}

/// Application message types.
#[derive(Debug, Clone)]
pub enum Message {
    /// Drive the digit-select line one step.
    Scan,
}

/// What the two digits currently show.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub audio_worker_active: bool,
    pub note_digit: SegmentPattern,
    pub proximity_digit: SegmentPattern,
}

impl AppDisplayData {
    fn show(&mut self, frame: DisplayFrame) {
        self.note_digit = frame.select(DigitSelect::Note);
        self.proximity_digit = frame.select(DigitSelect::Proximity);
    }
}

/// Drives the digit-select line.
///
/// One select cycle is a proximity scan followed by a note scan. The latch
/// is sampled once at the start of each cycle and both digits are taken
/// from that one snapshot, so they never show two different windows.
#[derive(Debug)]
struct Scanner {
    select: DigitSelect,
}

impl Scanner {
    fn new() -> Self {
        Self {
            select: DigitSelect::Proximity,
        }
    }

    /// Advances one scan step. Returns the frame to show when a cycle starts.
    fn step(&mut self, latch: Option<&DisplayLatch>) -> Option<DisplayFrame> {
        let starts_cycle = self.select == DigitSelect::Proximity;
        self.select = self.select.toggled();
        if !starts_cycle {
            return None;
        }
        Some(latch.map_or(DisplayFrame::BLANK, DisplayLatch::frame))
    }
}

/// Main application state.
#[derive(Debug)]
struct TunerApp {
    audio_worker: Option<AudioWorker>,
    latch_receiver: Option<Receiver<Arc<DisplayLatch>>>,
    latch: Option<Arc<DisplayLatch>>,
    scanner: Scanner,
    display_data: AppDisplayData,
}

/// Audio worker thread management structure.
///
/// Dropping it asks the thread to stop and waits for it.
#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                error!("[MAIN] audio thread panicked");
            }
        }
    }
}

impl Default for TunerApp {
    fn default() -> Self {
        let config = load_config();
        let (latch_tx, latch_rx) = crossbeam_channel::bounded(1);
        let audio_worker = start_audio_processing(config, latch_tx);
        Self {
            display_data: AppDisplayData {
                audio_worker_active: audio_worker.is_some(),
                note_digit: SegmentPattern::DASH,
                proximity_digit: SegmentPattern::BLANK,
            },
            audio_worker,
            latch_receiver: Some(latch_rx),
            latch: None,
            scanner: Scanner::new(),
        }
    }
}

impl TunerApp {
    fn update(&mut self, message: Message) {
        match message {
            Message::Scan => {
                if self.latch.is_none() {
                    self.latch = self
                        .latch_receiver
                        .as_ref()
                        .and_then(|rx| rx.try_recv().ok());
                    if self.latch.is_some() {
                        info!("[MAIN] display latch connected");
                        self.latch_receiver = None;
                    }
                }

                if let Some(frame) = self.scanner.step(self.latch.as_deref()) {
                    self.display_data.show(frame);
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(SCAN_INTERVAL).map(|_| Message::Scan)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Loads the configuration named on the command line, or the defaults.
fn load_config() -> TunerConfig {
    let Some(path) = std::env::args().nth(1) else {
        return TunerConfig::default();
    };
    match TunerConfig::from_json_file(&path) {
        Ok(config) => {
            info!("[MAIN] loaded configuration from {}", path);
            config
        }
        Err(e) => {
            warn!("[MAIN] ignoring configuration {}: {}", path, e);
            TunerConfig::default()
        }
    }
}

/// Starts the dedicated audio processing thread.
///
/// The thread opens the input device, builds the tuner at the device's
/// sample rate and hands its latch back over `latch_tx`. It then runs the
/// pipeline on every incoming frame until told to shut down.
fn start_audio_processing(
    config: TunerConfig,
    latch_tx: Sender<Arc<DisplayLatch>>,
) -> Option<AudioWorker> {
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
    let spawned = thread::Builder::new()
        .name("audio".into())
        .spawn(move || {
            if let Err(e) = run_audio_thread(config, latch_tx, shutdown_rx) {
                error!("[AUDIO-THREAD] {:#}", e);
            }
        });

    match spawned {
        Ok(handle) => Some(AudioWorker {
            shutdown_tx,
            thread_handle: Some(handle),
        }),
        Err(e) => {
            error!("[MAIN] could not spawn audio thread: {}", e);
            None
        }
    }
}

fn run_audio_thread(
    config: TunerConfig,
    latch_tx: Sender<Arc<DisplayLatch>>,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let (raw_audio_tx, raw_audio_rx) = crossbeam_channel::bounded::<Vec<f32>>(FRAME_QUEUE);
    let (stream, sample_rate) = audio::start_audio_capture(raw_audio_tx)?;

    let mut tuner = Tuner::new(&config.with_tick_rate(sample_rate))
        .context("building tuner for the input device")?;
    let mut shaper = PulseShaper::new(0.0, SHAPER_HYSTERESIS);
    tuner.reset();
    latch_tx
        .send(tuner.latch())
        .context("handing latch to the display")?;

    info!("[AUDIO-THREAD] entering processing loop");
    loop {
        crossbeam_channel::select! {
            recv(raw_audio_rx) -> msg => match msg {
                Ok(frame) => {
                    tuner.process_samples(&mut shaper, &frame);
                }
                Err(_) => {
                    warn!("[AUDIO-THREAD] audio channel closed");
                    break;
                }
            },
            recv(shutdown_rx) -> _ => {
                info!("[AUDIO-THREAD] received shutdown signal");
                break;
            },
        }
    }

    if let Err(e) = stream.pause() {
        warn!("[AUDIO-THREAD] error pausing stream: {}", e);
    }
    tuner.reset();
    Ok(())
}
