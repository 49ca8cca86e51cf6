//! Rolling pitch history

use crate::features::key::PitchClassHistogram;
use crate::features::pitch::NoteMapper;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One detected pitch with the instant it was observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchSample {
    frequency: f32,
    timestamp: Instant,
}

impl PitchSample {
    /// Create a sample; `None` unless the frequency is positive and finite
    pub fn new(frequency: f32, timestamp: Instant) -> Option<Self> {
        if frequency > 0.0 && frequency.is_finite() {
            Some(Self {
                frequency,
                timestamp,
            })
        } else {
            None
        }
    }

    /// Frequency in Hz
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Observation instant
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

/// Time-windowed history of detected pitches
///
/// Samples are kept in insertion order. Eviction is lazy: callers run
/// [`evict`](Self::evict) before reading, after which every retained sample
/// is younger than the window.
#[derive(Debug, Clone)]
pub struct RollingPitchBuffer {
    samples: VecDeque<PitchSample>,
    window: Duration,
    mapper: NoteMapper,
}

impl RollingPitchBuffer {
    /// Create an empty buffer
    ///
    /// # Arguments
    ///
    /// * `window` - Maximum sample age (default: 40 s)
    /// * `mapper` - Frequency to pitch-class mapping used by the note queries
    pub fn new(window: Duration, mapper: NoteMapper) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
            mapper,
        }
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Append a pitch observation
    ///
    /// Returns `false` (and stores nothing) for invalid frequencies.
    pub fn push(&mut self, frequency: f32, timestamp: Instant) -> bool {
        match PitchSample::new(frequency, timestamp) {
            Some(sample) => {
                self.samples.push_back(sample);
                true
            }
            None => false,
        }
    }

    /// Remove every sample with `timestamp <= now - window`
    ///
    /// # Returns
    ///
    /// Number of samples removed
    pub fn evict(&mut self, now: Instant) -> usize {
        let before = self.samples.len();
        let window = self.window;
        self.samples
            .retain(|s| now.saturating_duration_since(s.timestamp) < window);
        let removed = before - self.samples.len();
        if removed > 0 {
            log::trace!(
                "Evicted {} pitch samples older than {:?} ({} retained)",
                removed,
                window,
                self.samples.len()
            );
        }
        removed
    }

    /// Retained frequencies in insertion order
    pub fn frequencies(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.frequency).collect()
    }

    /// Pitch-class histogram of the retained samples
    pub fn histogram(&self) -> PitchClassHistogram {
        PitchClassHistogram::from_frequencies(&self.mapper, self.samples.iter().map(|s| s.frequency))
    }

    /// Number of distinct pitch classes among retained samples (0-12)
    pub fn unique_note_count(&self) -> usize {
        self.histogram().unique_count()
    }

    /// Retained samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &PitchSample> {
        self.samples.iter()
    }

    /// Timestamp of the oldest retained sample
    pub fn oldest(&self) -> Option<Instant> {
        self.samples.front().map(|s| s.timestamp)
    }

    /// Timestamp of the newest retained sample
    pub fn newest(&self) -> Option<Instant> {
        self.samples.back().map(|s| s.timestamp)
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are retained
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
