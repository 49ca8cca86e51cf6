//! Histogram-based key estimation
//!
//! Infers tonic and mode from the distribution of recently played pitch
//! classes.
//!
//! # Algorithm
//!
//! 1. Map every frequency to its pitch class and accumulate a 12-bin histogram
//! 2. The most frequent pitch class is the tonic (lowest class wins ties)
//! 3. Compare the major third (tonic + 4) against the minor third (tonic + 3):
//!    a strictly larger major-third count selects Ionian, anything else Aeolian
//!
//! Only Ionian and Aeolian are inferred; other modes come from manual
//! selection.

use super::histogram::PitchClassHistogram;
use crate::features::pitch::NoteMapper;
use crate::theory::{KeyCandidate, Mode};

/// Infers a key from a list of observed frequencies
#[derive(Debug, Clone, Copy)]
pub struct KeyEstimator {
    mapper: NoteMapper,
    min_samples: usize,
}

impl Default for KeyEstimator {
    fn default() -> Self {
        Self::new(NoteMapper::default(), 10)
    }
}

impl KeyEstimator {
    /// Create an estimator
    ///
    /// # Arguments
    ///
    /// * `mapper` - Frequency to pitch-class mapping
    /// * `min_samples` - Fewer frequencies than this yield no candidate (default: 10)
    pub fn new(mapper: NoteMapper, min_samples: usize) -> Self {
        Self {
            mapper,
            min_samples,
        }
    }

    /// Estimate the key of a frequency list
    ///
    /// # Returns
    ///
    /// `None` when fewer than `min_samples` frequencies are given; this is an
    /// "insufficient evidence" outcome, not an error.
    ///
    /// # Example
    ///
    /// ```
    /// use keylock::features::key::KeyEstimator;
    ///
    /// // C C C D E F G A B E
    /// let freqs = [261.63, 261.63, 261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88, 329.63];
    /// let key = KeyEstimator::default().estimate(&freqs).unwrap();
    /// assert_eq!(key.display_name(), "C Major");
    /// ```
    pub fn estimate(&self, frequencies: &[f32]) -> Option<KeyCandidate> {
        log::debug!("Estimating key from {} frequencies", frequencies.len());

        if frequencies.len() < self.min_samples {
            log::debug!(
                "Too few frequencies for key estimation: {} < {}",
                frequencies.len(),
                self.min_samples
            );
            return None;
        }

        let histogram =
            PitchClassHistogram::from_frequencies(&self.mapper, frequencies.iter().copied());
        self.estimate_from_histogram(&histogram)
    }

    /// Estimate the key from a prepared histogram
    ///
    /// Applies the same `min_samples` requirement to the histogram total.
    pub fn estimate_from_histogram(&self, histogram: &PitchClassHistogram) -> Option<KeyCandidate> {
        if histogram.total() < self.min_samples {
            return None;
        }

        let tonic = histogram.most_frequent()?;
        let major_third = histogram.count((tonic + 4) % 12);
        let minor_third = histogram.count((tonic + 3) % 12);

        let mode = if major_third > minor_third {
            Mode::Ionian
        } else {
            Mode::Aeolian
        };

        let key = KeyCandidate::new(tonic, mode);
        log::debug!(
            "Estimated key {} (tonic count={}, major third={}, minor third={})",
            key,
            histogram.count(tonic),
            major_third,
            minor_third
        );
        Some(key)
    }
}
