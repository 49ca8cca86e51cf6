//! # keylock
//!
//! Live musical key detection for monophonic performance: listens to a
//! stream of audio frames, infers the key (tonic + mode) being played, and
//! locks the estimate once it has stayed confident long enough.
//!
//! ## Features
//!
//! - **Pitch Detection**: FFT-accelerated time-domain autocorrelation per frame
//! - **Key Estimation**: Pitch-class histogram over a rolling 40 s window
//! - **Confidence Scoring**: Weighted diversity, key match, tonic repetition and time
//! - **Key Locking**: Stability state machine with event output
//!
//! ## Quick Start
//!
//! ```no_run
//! use keylock::{AnalysisConfig, AnalysisController, AnalysisEvent};
//! use std::time::Instant;
//!
//! let mut controller = AnalysisController::new(AnalysisConfig::default())?;
//! controller.start(44100, None, Instant::now());
//!
//! // From the capture callback, ~60 times per second
//! let frame = vec![0.0f32; 2048];
//! let pitch = controller.process_frame(&frame, Instant::now())?;
//! println!("Note: {:?}", pitch.note);
//!
//! // From a 3 s timer
//! for event in controller.detection_tick(Instant::now())? {
//!     if let AnalysisEvent::StableKey(stable) = event {
//!         println!("Key: {}", stable.key.display_name());
//!     }
//! }
//! # Ok::<(), keylock::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Frames → PitchDetector → NoteMapper → RollingPitchBuffer
//!                                            │ (every 3 s)
//!          StabilityTracker ← ConfidenceScorer ← KeyEstimator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod theory;

// Re-export main types
pub use analysis::{
    AnalysisController, AnalysisEvent, AnalysisSnapshot, AnalysisState, ConfidenceBreakdown,
    EventSink, KeyEstimateEvent, PitchEvent, StableKeyEvent,
};
pub use config::{AnalysisConfig, ConfidenceWeights};
pub use error::AnalysisError;
pub use io::{FrameScheduler, FrameSource, SampleBuffer, Tick};
pub use theory::{KeyCandidate, Mode};

/// Analyze pre-recorded audio as if it were played live
///
/// Frames the samples at the configured frame size, stepping through them
/// at the configured frame rate, and runs a full analysis session on a
/// synthetic timebase.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (typically 44100 or 48000)
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// Snapshot of the session after the last frame: the locked key if one
/// locked, otherwise the latest estimate.
///
/// # Errors
///
/// Returns `AnalysisError` for empty input, a zero sample rate or an invalid
/// configuration.
///
/// # Example
///
/// ```no_run
/// use keylock::{analyze_samples, AnalysisConfig};
///
/// let samples = vec![0.0f32; 44100 * 30]; // 30 seconds of silence
/// let snapshot = analyze_samples(&samples, 44100, AnalysisConfig::default())?;
/// assert!(snapshot.locked_key.is_none());
/// # Ok::<(), keylock::AnalysisError>(())
/// ```
pub fn analyze_samples(
    samples: &[f32],
    sample_rate: u32,
    config: AnalysisConfig,
) -> Result<AnalysisSnapshot, AnalysisError> {
    log::debug!(
        "Starting offline key analysis: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
    }

    let mut controller = AnalysisController::new(config)?;
    let config = controller.config();
    let hop = ((sample_rate as f32 / config.frame_rate_hz).round() as usize).max(1);
    let mut source = SampleBuffer::new(sample_rate, config.frame_size, hop)?;
    source.push(samples);

    let mut events: Vec<AnalysisEvent> = Vec::new();
    controller.analyze_source(source, None, std::time::Instant::now(), &mut events)?;

    let stable = events
        .iter()
        .filter(|e| matches!(e, AnalysisEvent::StableKey(_)))
        .count();
    log::debug!(
        "Offline analysis finished: {} events, {} stable key(s)",
        events.len(),
        stable
    );

    controller.snapshot().ok_or(AnalysisError::SessionNotActive)
}
