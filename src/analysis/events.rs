//! Events emitted by the analysis controller
//!
//! Consumers (display layers, loggers, network bridges) receive every
//! observable change as an [`AnalysisEvent`] through an [`EventSink`].

use super::stability::AnalysisState;
use crate::theory::KeyCandidate;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

/// Per-frame pitch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEvent {
    /// Detected frequency in Hz, `None` for silence or no clear period
    pub frequency: Option<f32>,

    /// Note name with octave (e.g. "A4")
    pub note: Option<String>,

    /// Whether the note belongs to the active key, when one is set
    pub in_key: Option<bool>,
}

impl PitchEvent {
    /// Event for a frame without a pitch
    pub fn silent() -> Self {
        Self {
            frequency: None,
            note: None,
            in_key: None,
        }
    }
}

/// Key estimate produced by one evaluated detection tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimateEvent {
    /// Estimated key
    pub key: KeyCandidate,

    /// Overall confidence (0.0-1.0)
    pub confidence: f32,
}

/// A key that held its confidence long enough to lock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StableKeyEvent {
    /// Locked key
    pub key: KeyCandidate,

    /// Confidence at the locking tick (0.0-1.0)
    pub confidence: f32,
}

/// Everything the controller reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisEvent {
    /// A frame was processed
    Pitch(PitchEvent),

    /// A detection tick estimated a key
    KeyEstimate(KeyEstimateEvent),

    /// A key locked
    StableKey(StableKeyEvent),

    /// The session's analysis state changed
    StateChanged {
        /// Previous state
        from: AnalysisState,
        /// New state
        to: AnalysisState,
    },

    /// A capture session started
    SessionStarted {
        /// Opaque capture device label
        device: Option<String>,
        /// Capture sample rate in Hz
        sample_rate: u32,
    },

    /// The capture session stopped
    SessionStopped,
}

/// Receiver of analysis events
pub trait EventSink {
    /// Deliver one event
    fn emit(&mut self, event: AnalysisEvent);
}

impl EventSink for Vec<AnalysisEvent> {
    fn emit(&mut self, event: AnalysisEvent) {
        self.push(event);
    }
}

impl EventSink for mpsc::Sender<AnalysisEvent> {
    fn emit(&mut self, event: AnalysisEvent) {
        if self.send(event).is_err() {
            log::trace!("Event receiver disconnected, dropping event");
        }
    }
}
