//! # Pulse Conditioning
//!
//! The estimator expects a clean binary pulse train. A microphone or pickup
//! delivers an analog waveform instead, so this module squares it up with a
//! Schmitt trigger: the output only goes high once the input rises above
//! `center + delta` and only goes low again once it falls below
//! `center - delta`. Noise smaller than the hysteresis band never toggles
//! the output.

/// Schmitt trigger turning analog samples into pulse levels.
#[derive(Debug, Clone)]
pub struct PulseShaper {
    // Configuration
    threshold_high: f32,
    threshold_low: f32,

    // Internal state
    high: bool,
}

impl PulseShaper {
    /// Creates a new shaper.
    ///
    /// * `center`: midpoint of the waveform, normally `0.0` for audio.
    /// * `delta`: half-width of the hysteresis band. Around 10-20% of the
    ///   expected amplitude works well for a plucked string.
    pub fn new(center: f32, delta: f32) -> Self {
        let delta = delta.abs();
        Self {
            threshold_high: center + delta,
            threshold_low: center - delta,
            // Assume low until the signal proves otherwise.
            high: false,
        }
    }

    /// Feeds one sample and returns the output level after it.
    pub fn update(&mut self, sample: f32) -> bool {
        if self.high {
            if sample < self.threshold_low {
                self.high = false;
            }
        } else if sample > self.threshold_high {
            self.high = true;
        }
        self.high
    }

    /// Current output level without feeding a sample.
    pub fn level(&self) -> bool {
        self.high
    }

    pub fn reset(&mut self) {
        self.high = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_a_clean_sine() {
        let mut shaper = PulseShaper::new(0.0, 0.1);
        let rate = 8_000.0;
        let freq = 100.0;
        let mut rising = 0;
        let mut last = shaper.level();
        for i in 0..8_000 {
            let sample = (2.0 * std::f32::consts::PI * freq * i as f32 / rate).sin();
            let level = shaper.update(sample);
            if level && !last {
                rising += 1;
            }
            last = level;
        }
        assert_eq!(rising, 100);
    }

    #[test]
    fn ignores_noise_inside_the_band() {
        let mut shaper = PulseShaper::new(0.0, 0.2);
        let noise = [0.1, -0.15, 0.19, -0.05, 0.0, 0.12];
        assert!(noise.iter().all(|&s| !shaper.update(s)));

        assert!(shaper.update(0.5));
        assert!([0.1, -0.15, 0.19].iter().all(|&s| shaper.update(s)));
        assert!(!shaper.update(-0.3));
    }

    #[test]
    fn negative_delta_is_treated_as_its_magnitude() {
        let mut shaper = PulseShaper::new(0.0, -0.2);
        assert!(!shaper.update(0.1));
        assert!(shaper.update(0.3));
    }

    #[test]
    fn reset_returns_low() {
        let mut shaper = PulseShaper::new(0.0, 0.1);
        shaper.update(1.0);
        shaper.reset();
        assert!(!shaper.level());
    }
}
