//! Confidence scoring module
//!
//! Rates how trustworthy a key candidate is given the pitches observed in the
//! rolling window.
//!
//! # Confidence Components
//!
//! 1. **Diversity**: distinct pitch classes out of 12
//! 2. **Key match**: share of observations inside the candidate's diatonic set
//! 3. **Repetition**: how often the tonic recurs, saturating at 20% of observations
//! 4. **Time**: elapsed analysis time relative to the window length
//!
//! The overall score is the weighted sum of the four factors, clamped to [0, 1].
//!
//! # Example
//!
//! ```
//! use keylock::analysis::confidence::ConfidenceScorer;
//! use keylock::features::key::PitchClassHistogram;
//! use keylock::theory::{KeyCandidate, Mode};
//! use std::time::Duration;
//!
//! let mut histogram = PitchClassHistogram::new();
//! for pc in [0, 0, 2, 4, 5, 7, 9, 11] {
//!     histogram.add(pc);
//! }
//! let key = KeyCandidate::new(0, Mode::Ionian);
//! let confidence = ConfidenceScorer::default().score(&histogram, &key, Duration::from_secs(20));
//! assert!(confidence.overall > 0.8);
//! ```

use crate::config::ConfidenceWeights;
use crate::features::key::PitchClassHistogram;
use crate::features::pitch::NoteMapper;
use crate::theory::KeyCandidate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Share of all observations at which the tonic repetition factor saturates
const TONIC_SATURATION_SHARE: f32 = 0.2;

/// Individual confidence factors and their weighted combination
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Note diversity (0.0-1.0)
    pub diversity: f32,

    /// In-key observation ratio (0.0-1.0)
    pub key_match: f32,

    /// Tonic repetition (0.0-1.0)
    pub repetition: f32,

    /// Elapsed analysis time relative to the window (0.0-1.0)
    pub time: f32,

    /// Weighted combination of the four factors (0.0-1.0)
    pub overall: f32,
}

impl ConfidenceBreakdown {
    /// Whether the overall score reaches `threshold`
    pub fn meets(&self, threshold: f32) -> bool {
        self.overall >= threshold
    }

    /// Overall score as a rounded percentage (0-100)
    pub fn percent(&self) -> u8 {
        (self.overall.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Weighted multi-factor confidence scorer
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    window: Duration,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(ConfidenceWeights::default(), Duration::from_millis(40_000))
    }
}

impl ConfidenceScorer {
    /// Create a scorer
    ///
    /// # Arguments
    ///
    /// * `weights` - Factor weights (default: 0.25 / 0.40 / 0.20 / 0.15)
    /// * `window` - Elapsed time at which the time factor saturates (default: 40 s)
    pub fn new(weights: ConfidenceWeights, window: Duration) -> Self {
        Self { weights, window }
    }

    /// Factor weights
    pub fn weights(&self) -> &ConfidenceWeights {
        &self.weights
    }

    /// Score a key candidate against a pitch-class histogram
    ///
    /// # Arguments
    ///
    /// * `histogram` - Pitch classes observed in the rolling window
    /// * `key` - Candidate being rated
    /// * `elapsed` - Time since the analysis session started
    ///
    /// # Returns
    ///
    /// All four factors plus the combined score. An empty histogram scores 0
    /// on every factor.
    pub fn score(
        &self,
        histogram: &PitchClassHistogram,
        key: &KeyCandidate,
        elapsed: Duration,
    ) -> ConfidenceBreakdown {
        let total = histogram.total();
        log::debug!(
            "Scoring {} against {} observations ({:?} elapsed)",
            key,
            total,
            elapsed
        );

        if total == 0 {
            return ConfidenceBreakdown::default();
        }

        let total = total as f32;
        let diversity = (histogram.unique_count() as f32 / 12.0).min(1.0);
        let key_match = histogram.in_key_count(key) as f32 / total;
        let tonic_count = histogram.count(key.tonic()) as f32;
        let repetition = (tonic_count / (total * TONIC_SATURATION_SHARE)).min(1.0);
        let time = if self.window.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.window.as_secs_f32()).min(1.0)
        };

        let overall = combine(&self.weights, diversity, key_match, repetition, time);

        log::debug!(
            "Confidence for {}: {:.3} (diversity={:.3}, key_match={:.3}, repetition={:.3}, time={:.3})",
            key,
            overall,
            diversity,
            key_match,
            repetition,
            time
        );

        ConfidenceBreakdown {
            diversity,
            key_match,
            repetition,
            time,
            overall,
        }
    }

    /// Score a key candidate against raw frequencies
    pub fn score_frequencies(
        &self,
        mapper: &NoteMapper,
        frequencies: &[f32],
        key: &KeyCandidate,
        elapsed: Duration,
    ) -> ConfidenceBreakdown {
        let histogram = PitchClassHistogram::from_frequencies(mapper, frequencies.iter().copied());
        self.score(&histogram, key, elapsed)
    }
}

/// Weighted sum of the four factors, clamped to [0, 1]
pub fn combine(
    weights: &ConfidenceWeights,
    diversity: f32,
    key_match: f32,
    repetition: f32,
    time: f32,
) -> f32 {
    (diversity * weights.diversity
        + key_match * weights.key_match
        + repetition * weights.repetition
        + time * weights.time)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Mode;

    fn histogram(classes: &[u8]) -> PitchClassHistogram {
        let mut h = PitchClassHistogram::new();
        for &pc in classes {
            h.add(pc);
        }
        h
    }

    #[test]
    fn test_empty_scores_zero() {
        let key = KeyCandidate::new(0, Mode::Ionian);
        let c = ConfidenceScorer::default().score(
            &PitchClassHistogram::new(),
            &key,
            Duration::from_secs(60),
        );
        assert_eq!(c.overall, 0.0);
        assert_eq!(c, ConfidenceBreakdown::default());
        assert!(!c.meets(0.8));
    }

    #[test]
    fn test_factor_values() {
        // C C D E F G A B C B: 7 classes, all in C major, tonic 3/10
        let h = histogram(&[0, 0, 2, 4, 5, 7, 9, 11, 0, 11]);
        let key = KeyCandidate::new(0, Mode::Ionian);
        let c = ConfidenceScorer::default().score(&h, &key, Duration::from_secs(20));

        assert!((c.diversity - 7.0 / 12.0).abs() < 1e-6);
        assert!((c.key_match - 1.0).abs() < 1e-6);
        assert!((c.repetition - 1.0).abs() < 1e-6, "3/10 saturates above 20%");
        assert!((c.time - 0.5).abs() < 1e-6);

        let expected = 0.25 * 7.0 / 12.0 + 0.40 + 0.20 + 0.15 * 0.5;
        assert!(
            (c.overall - expected).abs() < 1e-5,
            "overall {} != expected {}",
            c.overall,
            expected
        );
        assert_eq!(c.percent(), 82);
    }

    #[test]
    fn test_bounds_hold() {
        let scorer = ConfidenceScorer::default();
        let all: Vec<u8> = (0..12).collect();
        for tonic in 0..12 {
            for mode in Mode::ALL {
                let key = KeyCandidate::new(tonic, mode);
                for secs in [0, 10, 40, 400] {
                    let c = scorer.score(&histogram(&all), &key, Duration::from_secs(secs));
                    for v in [c.diversity, c.key_match, c.repetition, c.time, c.overall] {
                        assert!((0.0..=1.0).contains(&v), "factor {} out of range", v);
                    }
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_key_match() {
        let scorer = ConfidenceScorer::default();
        let key = KeyCandidate::new(0, Mode::Ionian);
        let elapsed = Duration::from_secs(10);

        // Same diversity and tonic count, one more in-key observation
        let fewer = scorer.score(&histogram(&[0, 0, 4, 7, 1, 1]), &key, elapsed);
        let more = scorer.score(&histogram(&[0, 0, 4, 7, 7, 1]), &key, elapsed);
        assert!(more.key_match > fewer.key_match);
        assert!(more.overall >= fewer.overall);
    }

    #[test]
    fn test_time_saturates() {
        let scorer = ConfidenceScorer::default();
        let key = KeyCandidate::new(0, Mode::Ionian);
        let h = histogram(&[0, 2, 4]);
        let c = scorer.score(&h, &key, Duration::from_secs(120));
        assert_eq!(c.time, 1.0);

        let instant = ConfidenceScorer::new(ConfidenceWeights::default(), Duration::ZERO)
            .score(&h, &key, Duration::ZERO);
        assert_eq!(instant.time, 1.0);
    }

    #[test]
    fn test_combine_clamps() {
        let heavy = ConfidenceWeights {
            diversity: 1.0,
            key_match: 1.0,
            repetition: 1.0,
            time: 1.0,
        };
        assert_eq!(combine(&heavy, 1.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(combine(&ConfidenceWeights::default(), 0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_score_frequencies_matches_histogram() {
        let scorer = ConfidenceScorer::default();
        let mapper = NoteMapper::default();
        let key = KeyCandidate::new(9, Mode::Aeolian);
        let freqs = [440.0, 220.0, 493.88, 523.25, 659.25];
        let elapsed = Duration::from_secs(5);

        let direct = scorer.score_frequencies(&mapper, &freqs, &key, elapsed);
        let via = scorer.score(
            &PitchClassHistogram::from_frequencies(&mapper, freqs),
            &key,
            elapsed,
        );
        assert_eq!(direct, via);
    }
}
