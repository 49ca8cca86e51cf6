//! Autocorrelation pitch detection
//!
//! Estimates the fundamental frequency of one monophonic frame.
//!
//! # Algorithm
//!
//! 1. Gate on RMS energy: quiet frames carry no pitch
//! 2. Compute the unnormalized autocorrelation `r[lag] = Σ s[i]·s[i+lag]` for
//!    every lag in `[0, len)`, FFT-accelerated: `ACF = IFFT(|FFT(x)|²)` over a
//!    zero-padded buffer, which equals the direct linear sum
//! 3. The zero-lag peak is skipped; among the strict local maxima that follow,
//!    the largest one gives the period
//! 4. `frequency = sample_rate / best_lag`
//!
//! This is a best-effort tracker for a single dominant periodic source.

use crate::preprocessing::silence::SilenceDetector;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Frame-by-frame fundamental frequency estimator
///
/// Holds an FFT planner and scratch buffers so repeated calls with the same
/// frame length do not re-plan or re-allocate.
pub struct PitchDetector {
    gate: SilenceDetector,
    min_correlation: f32,
    planner: FftPlanner<f64>,
    spectrum: Vec<Complex<f64>>,
    acf: Vec<f64>,
}

impl std::fmt::Debug for PitchDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PitchDetector")
            .field("min_rms", &self.gate.min_rms)
            .field("min_correlation", &self.min_correlation)
            .finish()
    }
}

impl Default for PitchDetector {
    fn default() -> Self {
        Self::new(0.01, 0.01)
    }
}

impl PitchDetector {
    /// Create a detector
    ///
    /// # Arguments
    ///
    /// * `min_rms` - Frames quieter than this RMS level carry no pitch
    /// * `min_correlation` - Smallest autocorrelation value accepted as a period peak
    pub fn new(min_rms: f32, min_correlation: f32) -> Self {
        Self {
            gate: SilenceDetector::new(min_rms),
            min_correlation,
            planner: FftPlanner::new(),
            spectrum: Vec::new(),
            acf: Vec::new(),
        }
    }

    /// Estimate the fundamental frequency of one frame
    ///
    /// # Arguments
    ///
    /// * `frame` - Time-domain samples (mono, typically 2048)
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    ///
    /// `Some(frequency)` in Hz, or `None` when the frame is too quiet or has no
    /// usable periodicity. A missing pitch is a normal outcome, not a fault.
    ///
    /// # Example
    ///
    /// ```
    /// use keylock::features::pitch::PitchDetector;
    ///
    /// let frame: Vec<f32> = (0..2048)
    ///     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
    ///     .collect();
    /// let mut detector = PitchDetector::default();
    /// let f0 = detector.detect(&frame, 44100).unwrap();
    /// assert!((f0 - 440.0).abs() < 4.4);
    /// ```
    pub fn detect(&mut self, frame: &[f32], sample_rate: u32) -> Option<f32> {
        if sample_rate == 0 {
            log::warn!("Pitch detection called with sample rate 0");
            return None;
        }
        if frame.len() < 3 || self.gate.is_silent(frame) {
            return None;
        }

        self.compute_autocorrelation(frame);

        let (best_lag, best_value) = best_period_peak(&self.acf)?;
        if best_value < self.min_correlation as f64 {
            log::trace!(
                "Rejecting weak period peak: lag={}, r={:.5}",
                best_lag,
                best_value
            );
            return None;
        }

        let frequency = sample_rate as f32 / best_lag as f32;
        log::trace!(
            "Detected pitch {:.2} Hz (lag={}, r={:.4})",
            frequency,
            best_lag,
            best_value
        );
        Some(frequency)
    }

    /// Linear autocorrelation of `frame` into `self.acf` (length = frame length)
    ///
    /// Uses the identity ACF = IFFT(|FFT(x)|²) with zero-padding to at least
    /// twice the frame length so the circular correlation does not wrap.
    fn compute_autocorrelation(&mut self, frame: &[f32]) {
        let n = frame.len();
        let fft_size = (2 * n).next_power_of_two();

        self.spectrum.clear();
        self.spectrum
            .extend(frame.iter().map(|&x| Complex::new(x as f64, 0.0)));
        self.spectrum.resize(fft_size, Complex::new(0.0, 0.0));

        let fft = self.planner.plan_fft_forward(fft_size);
        fft.process(&mut self.spectrum);

        for x in &mut self.spectrum {
            *x = Complex::new(x.norm_sqr(), 0.0);
        }

        let ifft = self.planner.plan_fft_inverse(fft_size);
        ifft.process(&mut self.spectrum);

        let scale = 1.0 / fft_size as f64;
        self.acf.clear();
        self.acf
            .extend(self.spectrum[..n].iter().map(|x| x.re * scale));
    }
}

/// Largest strict local maximum of the autocorrelation after the zero-lag peak
///
/// Scans lags `1..len-1`; the first and last lag cannot be strict maxima.
fn best_period_peak(acf: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for lag in 1..acf.len().saturating_sub(1) {
        let value = acf[lag];
        if value > acf[lag - 1] && value > acf[lag + 1] {
            match best {
                Some((_, best_value)) if best_value >= value => {}
                _ => best = Some((lag, value)),
            }
        }
    }
    best
}

/// Direct O(n²) autocorrelation, kept as the reference for the FFT path
#[cfg(test)]
fn autocorrelation_direct(frame: &[f32]) -> Vec<f64> {
    let n = frame.len();
    (0..n)
        .map(|lag| {
            (0..n - lag)
                .map(|i| frame[i] as f64 * frame[i + lag] as f64)
                .sum()
        })
        .collect()
}
