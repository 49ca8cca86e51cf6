//! Per-session analysis state

use super::confidence::ConfidenceBreakdown;
use super::stability::{AnalysisState, StabilityTracker};
use crate::config::AnalysisConfig;
use crate::features::pitch::NoteMapper;
use crate::io::RollingPitchBuffer;
use crate::theory::KeyCandidate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Mutable state of one capture session
///
/// Created by [`AnalysisController::start`](super::AnalysisController::start)
/// and discarded on stop; nothing carries over between sessions.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) buffer: RollingPitchBuffer,
    pub(crate) tracker: StabilityTracker,
    pub(crate) started_at: Instant,
    pub(crate) sample_rate: u32,
    pub(crate) device: Option<String>,
    pub(crate) latest: Option<(KeyCandidate, ConfidenceBreakdown)>,
}

impl Session {
    pub(crate) fn new(
        config: &AnalysisConfig,
        mapper: NoteMapper,
        sample_rate: u32,
        device: Option<String>,
        now: Instant,
    ) -> Self {
        Self {
            buffer: RollingPitchBuffer::new(config.window(), mapper),
            tracker: StabilityTracker::from_config(config),
            started_at: now,
            sample_rate,
            device,
            latest: None,
        }
    }

    /// Rolling pitch history
    pub fn buffer(&self) -> &RollingPitchBuffer {
        &self.buffer
    }

    /// Stability state machine
    pub fn tracker(&self) -> &StabilityTracker {
        &self.tracker
    }

    /// Current analysis state
    pub fn state(&self) -> AnalysisState {
        self.tracker.state()
    }

    /// Instant the session started; the time confidence factor counts from here
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Capture sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Opaque capture device label
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Most recent estimate and its confidence
    pub fn latest_estimate(&self) -> Option<(KeyCandidate, ConfidenceBreakdown)> {
        self.latest
    }

    /// Locked key, once the session has locked
    pub fn locked_key(&self) -> Option<KeyCandidate> {
        self.tracker.locked_key().map(|(key, _)| key)
    }

    /// Point-in-time summary for display layers
    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot {
            state: self.state(),
            latest_estimate: self.latest.map(|(key, _)| key),
            latest_confidence: self.latest.map(|(_, confidence)| confidence),
            locked_key: self.locked_key(),
            buffered_samples: self.buffer.len(),
            unique_notes: self.buffer.unique_note_count(),
            sample_rate: self.sample_rate,
            device: self.device.clone(),
        }
    }
}

/// Serializable summary of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    /// Analysis state
    pub state: AnalysisState,

    /// Most recently estimated key
    pub latest_estimate: Option<KeyCandidate>,

    /// Confidence breakdown of the latest estimate
    pub latest_confidence: Option<ConfidenceBreakdown>,

    /// Locked key
    pub locked_key: Option<KeyCandidate>,

    /// Pitch samples currently buffered (evicted lazily on detection ticks)
    pub buffered_samples: usize,

    /// Distinct pitch classes among buffered samples
    pub unique_notes: usize,

    /// Capture sample rate in Hz
    pub sample_rate: u32,

    /// Opaque capture device label
    pub device: Option<String>,
}
