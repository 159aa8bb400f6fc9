//! # Autocorrelation Module
//!
//! Computes the linear autocorrelation of an audio frame:
//!
//! `corr[i] = sum_{j=0}^{N-1-i} x[j] * x[j+i]` for `i` in `0..N`
//!
//! The direct sum is O(N²), which is too slow for 8192-sample frames at
//! display rate, so [`autocorrelate`] goes through the frequency domain
//! (Wiener-Khinchin) with RustFFT instead. The signal is zero-padded to at
//! least `2N` so the circular correlation of the FFT equals the linear one.
//!
//! Accumulation is done in `f64`; the zero-lag term of a loud 8192-sample
//! frame is in the thousands and `f32` round-off would leak into the
//! confidence ratio.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

/// FFT plans for one frame length, planned once and reused per frame.
#[derive(Clone)]
pub struct Autocorrelator {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for Autocorrelator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autocorrelator")
            .field("len", &self.len)
            .field("padded_len", &self.forward.len())
            .finish()
    }
}

impl Autocorrelator {
    /// Plans transforms for signals of `len` samples.
    pub fn new(len: usize) -> Self {
        let padded_len = (2 * len.max(1)).next_power_of_two();

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(padded_len);
        let inverse = planner.plan_fft_inverse(padded_len);

        Self { len, forward, inverse }
    }

    /// Frame length the plans were made for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Linear autocorrelation of `signal` for lags `0..signal.len()`.
    ///
    /// A signal of a different length gets one-off plans.
    pub fn process(&self, signal: &[f32]) -> Vec<f64> {
        if signal.is_empty() {
            return Vec::new();
        }
        if signal.len() != self.len {
            return Autocorrelator::new(signal.len()).process(signal);
        }

        let padded_len = self.forward.len();
        let mut buffer: Vec<Complex<f64>> = signal
            .iter()
            .map(|&sample| Complex { re: sample as f64, im: 0.0 })
            .chain(std::iter::repeat(Complex { re: 0.0, im: 0.0 }))
            .take(padded_len)
            .collect();

        self.forward.process(&mut buffer);

        // Power spectrum; its inverse transform is the autocorrelation.
        for bin in buffer.iter_mut() {
            *bin = Complex { re: bin.norm_sqr(), im: 0.0 };
        }

        self.inverse.process(&mut buffer);

        // RustFFT does not normalize the inverse transform.
        let scale = 1.0 / padded_len as f64;
        buffer.iter().take(self.len).map(|c| c.re * scale).collect()
    }
}

/// Linear autocorrelation of `signal` for lags `0..signal.len()`, via FFT.
///
/// Matches [`autocorrelate_direct`] within floating-point tolerance.
/// Plans from scratch; use an [`Autocorrelator`] for repeated frames.
pub fn autocorrelate(signal: &[f32]) -> Vec<f64> {
    Autocorrelator::new(signal.len()).process(signal)
}

/// Direct O(N²) autocorrelation. Reference for [`autocorrelate`].
pub fn autocorrelate_direct(signal: &[f32]) -> Vec<f64> {
    let n = signal.len();
    (0..n)
        .map(|lag| {
            signal[..n - lag]
                .iter()
                .zip(&signal[lag..])
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_signal_has_no_lags() {
        assert!(autocorrelate(&[]).is_empty());
        assert!(autocorrelate_direct(&[]).is_empty());
    }

    #[test]
    fn matches_direct_sum_on_short_sequence() {
        let signal = [1.0, 2.0, 3.0];
        let corr = autocorrelate(&signal);
        // 1+4+9, 2+6, 3
        assert_relative_eq!(corr[0], 14.0, epsilon = 1e-9);
        assert_relative_eq!(corr[1], 8.0, epsilon = 1e-9);
        assert_relative_eq!(corr[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn matches_direct_sum_on_tone() {
        let signal: Vec<f32> = (0..1024)
            .map(|i| {
                let t = i as f32 / 44100.0;
                0.6 * (2.0 * std::f32::consts::PI * 196.0 * t).sin()
                    + 0.2 * (2.0 * std::f32::consts::PI * 392.0 * t).sin()
            })
            .collect();

        let fast = autocorrelate(&signal);
        let slow = autocorrelate_direct(&signal);

        assert_eq!(fast.len(), slow.len());
        for (f, s) in fast.iter().zip(&slow) {
            assert!((f - s).abs() < 1e-6 * slow[0], "fft {} vs direct {}", f, s);
        }
    }

    #[test]
    fn planned_correlator_is_reusable() {
        let correlator = Autocorrelator::new(256);
        assert_eq!(correlator.len(), 256);

        for freq in [110.0_f32, 440.0] {
            let signal: Vec<f32> = (0..256)
                .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / 8000.0).sin())
                .collect();
            let fast = correlator.process(&signal);
            let slow = autocorrelate_direct(&signal);
            for (f, s) in fast.iter().zip(&slow) {
                assert!((f - s).abs() < 1e-9 * slow[0]);
            }
        }

        // Other lengths still work, with their own plans.
        let short = correlator.process(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(short[1], 8.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_lag_is_signal_energy() {
        let signal = vec![0.5_f32; 300];
        let corr = autocorrelate(&signal);
        assert_relative_eq!(corr[0], 300.0 * 0.25, max_relative = 1e-9);
        assert_relative_eq!(corr[299], 0.25, max_relative = 1e-6);
    }
}
