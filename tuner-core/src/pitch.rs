//! # Pitch Detection Module
//!
//! Autocorrelation pitch detection for a single monophonic note.
//!
//! ## Pipeline
//! 1. RMS noise gate rejects silence
//! 2. Autocorrelation of the whole frame (FFT-backed, see [`crate::fft`])
//! 3. Skip the descending slope that follows the zero-lag peak
//! 4. Strongest peak in the first half of the frame gives the period
//! 5. Parabolic interpolation for sub-sample accuracy
//! 6. Confidence gate: peak / zero-lag energy must reach the threshold
//!
//! The estimator holds its thresholds and the FFT plans for the configured
//! frame size. Every call is independent.

use thiserror::Error;

use crate::audio::AudioFrame;
use crate::config::TunerConfig;
use crate::fft::Autocorrelator;

/// Outcome of estimating the pitch of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchEstimate {
    NoPitch,
    /// Fundamental frequency in Hz, always positive and finite.
    Detected(f64),
}

impl PitchEstimate {
    pub fn frequency(&self) -> Option<f64> {
        match self {
            PitchEstimate::Detected(freq) => Some(*freq),
            PitchEstimate::NoPitch => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, PitchEstimate::Detected(_))
    }
}

impl From<Result<Detection, Rejection>> for PitchEstimate {
    fn from(result: Result<Detection, Rejection>) -> Self {
        match result {
            Ok(detection) => PitchEstimate::Detected(detection.frequency),
            Err(_) => PitchEstimate::NoPitch,
        }
    }
}

/// A successful detection with the numbers behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Fundamental frequency in Hz.
    pub frequency: f64,
    /// Refined period in samples.
    pub period: f64,
    /// Period peak divided by zero-lag autocorrelation.
    pub confidence: f32,
}

/// Why a frame produced no pitch.
///
/// None of these are fatal; the next frame is analysed as usual.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Rejection {
    #[error("signal too quiet (rms {rms:.4})")]
    LowSignal { rms: f32 },

    #[error("weak periodicity (confidence {confidence:.3})")]
    LowConfidence { confidence: f32 },

    #[error("frequency {frequency:.1} Hz outside the instrument range")]
    OutOfRange { frequency: f64 },

    #[error("degenerate buffer, no usable period")]
    Degenerate,
}

/// Root-mean-square level of a signal. Zero for an empty signal.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let energy: f64 = signal.iter().map(|&s| s as f64 * s as f64).sum();
    (energy / signal.len() as f64).sqrt() as f32
}

/// Autocorrelation pitch estimator with loudness and confidence gates.
#[derive(Debug, Clone)]
pub struct PitchEstimator {
    min_volume: f32,
    min_confidence: f32,
    correlator: Autocorrelator,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self::with_config(&TunerConfig::default())
    }
}

impl PitchEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &TunerConfig) -> Self {
        Self {
            min_volume: config.min_volume,
            min_confidence: config.min_confidence,
            correlator: Autocorrelator::new(config.frame_size),
        }
    }

    /// Estimates the fundamental frequency of one captured frame.
    pub fn estimate(&self, frame: &AudioFrame) -> PitchEstimate {
        let result = self.analyze(&frame.samples, frame.sample_rate);
        if let Err(reason) = &result {
            log::trace!("[PITCH] No pitch: {}", reason);
        }
        result.into()
    }

    /// Runs the detector on raw samples and reports why it gave up, if it did.
    ///
    /// # Arguments
    /// * `signal` - Time-domain samples, roughly in [-1.0, 1.0]
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    /// * `Ok(Detection)` - Frequency, refined period and confidence
    /// * `Err(Rejection)` - Silence, weak periodicity or a degenerate buffer
    pub fn analyze(&self, signal: &[f32], sample_rate: u32) -> Result<Detection, Rejection> {
        let size = signal.len();

        // --- Noise gate ---
        let level = rms(signal);
        if size == 0 || level < self.min_volume {
            return Err(Rejection::LowSignal { rms: level });
        }
        if sample_rate == 0 {
            return Err(Rejection::Degenerate);
        }

        let corr = self.correlator.process(signal);

        // --- Skip the slope that falls away from the zero-lag peak ---
        let mut dip = 0;
        while dip + 1 < size && corr[dip] > corr[dip + 1] {
            dip += 1;
        }

        // --- Strongest peak after the dip, within the first half ---
        // Ties keep the earliest lag so harmonics of the period never win.
        let mut peak: Option<(usize, f64)> = None;
        for (lag, &value) in corr.iter().enumerate().take(size / 2).skip(dip) {
            if peak.is_none_or(|(_, best)| value > best) {
                peak = Some((lag, value));
            }
        }
        let (max_pos, max_val) = peak.ok_or(Rejection::Degenerate)?;

        // --- Parabolic interpolation around the peak ---
        let mut period = max_pos as f64;
        if max_pos > 0 && max_pos < size - 1 {
            let x1 = corr[max_pos - 1];
            let x2 = corr[max_pos];
            let x3 = corr[max_pos + 1];
            let a = (x1 + x3 - 2.0 * x2) / 2.0;
            let b = (x3 - x1) / 2.0;
            if a != 0.0 {
                period -= b / (2.0 * a);
            }
        }

        // --- Confidence gate ---
        if corr[0] <= 0.0 {
            return Err(Rejection::Degenerate);
        }
        let confidence = (max_val / corr[0]) as f32;
        if confidence < self.min_confidence {
            return Err(Rejection::LowConfidence { confidence });
        }

        if !(period > 0.0) {
            return Err(Rejection::Degenerate);
        }
        let frequency = sample_rate as f64 / period;
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(Rejection::Degenerate);
        }

        Ok(Detection {
            frequency,
            period,
            confidence,
        })
    }
}
