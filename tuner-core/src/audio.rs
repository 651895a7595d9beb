//! # Audio Capture Module
//!
//! Live input for the tuner using CPAL (Cross-Platform Audio Library).
//! Samples from the default input device are cut into fixed-size frames and
//! streamed over a channel; the receiving side squares them up with a
//! [`PulseShaper`](crate::signal::PulseShaper) and feeds the resulting
//! levels to the [`Tuner`](crate::pipeline::Tuner), one tick per sample.
//!
//! The device's sample rate therefore becomes the tuner's tick rate.

use anyhow::{Context, Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SupportedStreamConfigRange};
use crossbeam_channel::Sender;
use log::{error, info, warn};

/// Samples per frame sent to the analysis side.
pub const FRAME_SIZE: usize = 1024;

/// Preferred capture rate. A guitar's fundamentals sit far below this, but
/// a high rate keeps the period measurement fine-grained.
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Starts capturing from the default input device.
///
/// Multi-channel devices are reduced to their first channel.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - The running stream and its sample rate
/// * `Err(e)` - No usable device or configuration
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    info!("[AUDIO] using input device: {}", device.name()?);

    let configs = device
        .supported_input_configs()
        .context("querying input configurations")?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let channels = config.channels() as usize;
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    info!("[AUDIO] capturing {} channel(s) at {} Hz", channels, sample_rate);

    let err_fn = |err| error!("[AUDIO] stream error: {}", err);

    let mut pending = Vec::with_capacity(FRAME_SIZE * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            pending.extend(data.iter().step_by(channels.max(1)));

            while pending.len() >= FRAME_SIZE {
                let frame: Vec<f32> = pending.drain(..FRAME_SIZE).collect();
                if sender.try_send(frame).is_err() {
                    warn!("[AUDIO] analysis side is behind, dropping a frame");
                }
            }
        },
        err_fn,
        None,
    )?;

    stream.play().context("starting input stream")?;

    Ok((stream, sample_rate))
}

/// Picks the f32 configuration best suited to `target_rate`.
///
/// Mono configurations are preferred; among equals, the one whose rate
/// range lies closest to the target wins.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .min_by_key(|c| {
            let distance = if target_rate < c.min_sample_rate().0 {
                c.min_sample_rate().0 - target_rate
            } else {
                target_rate.saturating_sub(c.max_sample_rate().0)
            };
            (c.channels(), distance)
        })
}
