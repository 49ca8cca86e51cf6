//! Analysis and orchestration modules
//!
//! Turns buffered pitches into a stable key:
//! - Confidence scoring
//! - Stability tracking (Listening / Analyzing / Locked)
//! - Session state, events and the controller driving them

pub mod confidence;
pub mod controller;
pub mod events;
pub mod session;
pub mod stability;

pub use confidence::{ConfidenceBreakdown, ConfidenceScorer};
pub use controller::AnalysisController;
pub use events::{AnalysisEvent, EventSink, KeyEstimateEvent, PitchEvent, StableKeyEvent};
pub use session::{AnalysisSnapshot, Session};
pub use stability::{AnalysisState, KeyConfidenceState, StabilityOutcome, StabilityTracker};
