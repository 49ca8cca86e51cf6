//! Pitch-class histograms

use crate::features::pitch::NoteMapper;
use crate::theory::{KeyCandidate, PitchClass};
use serde::{Deserialize, Serialize};

/// Observation counts for the 12 pitch classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchClassHistogram {
    counts: [usize; 12],
}

impl PitchClassHistogram {
    /// Empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Histogram of a frequency list; invalid frequencies are skipped
    pub fn from_frequencies<I>(mapper: &NoteMapper, frequencies: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let mut histogram = Self::new();
        for frequency in frequencies {
            if let Some(pc) = mapper.pitch_class(frequency) {
                histogram.add(pc);
            }
        }
        histogram
    }

    /// Count one observation of `pitch_class`
    pub fn add(&mut self, pitch_class: PitchClass) {
        self.counts[(pitch_class % 12) as usize] += 1;
    }

    /// Observations of one pitch class (wrapping above 11)
    pub fn count(&self, pitch_class: PitchClass) -> usize {
        self.counts[(pitch_class % 12) as usize]
    }

    /// All 12 counts, indexed by pitch class
    pub fn counts(&self) -> &[usize; 12] {
        &self.counts
    }

    /// Total number of observations
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Number of pitch classes observed at least once (0-12)
    pub fn unique_count(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Most frequent pitch class; the lowest pitch class wins ties
    ///
    /// Returns `None` for an empty histogram.
    pub fn most_frequent(&self) -> Option<PitchClass> {
        let mut best: Option<(usize, usize)> = None;
        for (pc, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((pc, count)),
            }
        }
        best.map(|(pc, _)| pc as PitchClass)
    }

    /// Observations whose pitch class lies in the key's diatonic set
    pub fn in_key_count(&self, key: &KeyCandidate) -> usize {
        key.pitch_classes()
            .iter()
            .map(|&pc| self.count(pc))
            .sum()
    }
}
