//! Key stability tracking
//!
//! A key estimate is only reported as stable after the same candidate has
//! held a high confidence for a minimum duration.
//!
//! # State machine
//!
//! ```text
//! Listening ──(≥ min unique notes)──► Analyzing ──(stable candidate)──► Locked
//!     ▲                                   │
//!     └──────(evidence drops below)───────┘
//! ```
//!
//! `Locked` is terminal for the lifetime of a tracker: once locked, no
//! further evidence or observations are evaluated.

use crate::config::AnalysisConfig;
use crate::theory::KeyCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Analysis phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisState {
    /// Not enough distinct notes to estimate a key
    Listening,
    /// Estimating and scoring keys on every detection tick
    Analyzing,
    /// A stable key has been found; evaluation stopped
    Locked,
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisState::Listening => "Listening",
            AnalysisState::Analyzing => "Analyzing",
            AnalysisState::Locked => "Locked",
        };
        f.write_str(name)
    }
}

/// The candidate currently accumulating stability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyConfidenceState {
    /// Candidate key
    pub key: KeyCandidate,
    /// High-confidence ticks observed for this key
    pub consecutive_count: u32,
    /// Instant of the first high-confidence tick
    pub first_detected_at: Instant,
    /// Confidence of the most recent high-confidence tick
    pub latest_confidence: f32,
}

/// Result of feeding one scored estimate to the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StabilityOutcome {
    /// Not evaluated (tracker is not analyzing)
    Ignored,
    /// Confidence under the threshold; any candidacy is left as is
    BelowThreshold,
    /// A new candidacy began
    Started,
    /// The existing candidacy gained another tick without locking yet
    Extended,
    /// The candidate locked
    Locked {
        /// The stable key
        key: KeyCandidate,
        /// Confidence at the locking tick
        confidence: f32,
    },
}

/// Listening / Analyzing / Locked state machine
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    threshold: f32,
    stability: Duration,
    min_unique_notes: usize,
    state: AnalysisState,
    candidacy: Option<KeyConfidenceState>,
    locked: Option<(KeyCandidate, f32)>,
    last_locked_key: Option<String>,
}

impl Default for StabilityTracker {
    fn default() -> Self {
        Self::new(0.8, Duration::from_millis(1_500), 5)
    }
}

impl StabilityTracker {
    /// Create a tracker in the `Listening` state
    ///
    /// # Arguments
    ///
    /// * `threshold` - Minimum confidence counted towards stability (default: 0.8)
    /// * `stability` - Time a candidate must persist before locking (default: 1500 ms)
    /// * `min_unique_notes` - Distinct pitch classes needed to analyze (default: 5)
    pub fn new(threshold: f32, stability: Duration, min_unique_notes: usize) -> Self {
        Self {
            threshold,
            stability,
            min_unique_notes,
            state: AnalysisState::Listening,
            candidacy: None,
            locked: None,
            last_locked_key: None,
        }
    }

    /// Tracker parameterized from an analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.confidence_threshold,
            config.stability(),
            config.min_unique_notes,
        )
    }

    /// Current state
    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Whether a key has locked
    pub fn is_locked(&self) -> bool {
        self.state == AnalysisState::Locked
    }

    /// The in-progress candidacy, if any
    pub fn candidacy(&self) -> Option<&KeyConfidenceState> {
        self.candidacy.as_ref()
    }

    /// The locked key and its confidence at lock time
    pub fn locked_key(&self) -> Option<(KeyCandidate, f32)> {
        self.locked
    }

    /// Update the state from the amount of evidence in the window
    ///
    /// # Returns
    ///
    /// `Some((from, to))` when the state changed. Locked trackers never change.
    pub fn note_evidence(&mut self, unique_notes: usize) -> Option<(AnalysisState, AnalysisState)> {
        if self.is_locked() {
            return None;
        }

        let next = if unique_notes >= self.min_unique_notes && unique_notes > 0 {
            AnalysisState::Analyzing
        } else {
            AnalysisState::Listening
        };

        if next == self.state {
            return None;
        }

        log::debug!(
            "Analysis state {} -> {} ({} unique notes, need {})",
            self.state,
            next,
            unique_notes,
            self.min_unique_notes
        );
        let from = self.state;
        self.state = next;
        Some((from, next))
    }

    /// Feed one scored key estimate
    ///
    /// High-confidence ticks of a new key replace the candidacy; ticks of the
    /// current key extend it and lock it once it has persisted for the
    /// stability duration. Low-confidence ticks leave the candidacy untouched.
    pub fn observe(&mut self, key: KeyCandidate, confidence: f32, now: Instant) -> StabilityOutcome {
        if self.state != AnalysisState::Analyzing {
            return StabilityOutcome::Ignored;
        }

        if confidence.is_nan() || confidence < self.threshold {
            log::trace!(
                "{} below threshold ({:.3} < {:.3})",
                key,
                confidence,
                self.threshold
            );
            return StabilityOutcome::BelowThreshold;
        }

        let candidacy = match self.candidacy.as_mut() {
            Some(current) if current.key == key => current,
            _ => {
                log::debug!("New key candidate {} ({:.3})", key, confidence);
                self.candidacy = Some(KeyConfidenceState {
                    key,
                    consecutive_count: 1,
                    first_detected_at: now,
                    latest_confidence: confidence,
                });
                return StabilityOutcome::Started;
            }
        };

        candidacy.consecutive_count += 1;
        candidacy.latest_confidence = confidence;

        let held_for = now.saturating_duration_since(candidacy.first_detected_at);
        let key_string = key.key_string();
        let repeats_last_lock = self.last_locked_key.as_deref() == Some(key_string.as_str());

        if held_for >= self.stability && !repeats_last_lock {
            log::debug!(
                "Key {} stable for {:?} over {} ticks",
                key,
                held_for,
                candidacy.consecutive_count
            );
            self.state = AnalysisState::Locked;
            self.locked = Some((key, confidence));
            self.last_locked_key = Some(key_string);
            return StabilityOutcome::Locked { key, confidence };
        }

        StabilityOutcome::Extended
    }
}
