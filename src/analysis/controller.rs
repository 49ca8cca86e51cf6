//! Analysis orchestration
//!
//! [`AnalysisController`] owns the detection pipeline and at most one capture
//! [`Session`]. Two drivers feed it:
//!
//! - the **frame driver** ([`process_frame`](AnalysisController::process_frame)),
//!   once per capture frame (about 60 per second): pitch detection, note
//!   mapping and buffering
//! - the **detection driver** ([`detection_tick`](AnalysisController::detection_tick)),
//!   every few seconds: eviction, evidence check, key estimation, confidence
//!   scoring and the stability step
//!
//! Both take `&mut self`, so they never interleave within one controller.
//!
//! # Example
//!
//! ```
//! use keylock::{AnalysisConfig, AnalysisController};
//! use std::time::{Duration, Instant};
//!
//! let mut controller = AnalysisController::new(AnalysisConfig::default())?;
//! let t0 = Instant::now();
//! controller.start(44100, Some("default".to_string()), t0);
//!
//! let frame: Vec<f32> = (0..2048)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//! let pitch = controller.process_frame(&frame, t0)?;
//! assert_eq!(pitch.note.as_deref(), Some("A4"));
//!
//! let events = controller.detection_tick(t0 + Duration::from_secs(3))?;
//! assert!(events.is_empty(), "one note is not enough evidence");
//! # Ok::<(), keylock::AnalysisError>(())
//! ```

use super::confidence::ConfidenceScorer;
use super::events::{AnalysisEvent, EventSink, KeyEstimateEvent, PitchEvent, StableKeyEvent};
use super::session::{AnalysisSnapshot, Session};
use super::stability::{AnalysisState, StabilityOutcome};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::key::KeyEstimator;
use crate::features::pitch::{NoteMapper, PitchDetector};
use crate::io::{FrameScheduler, FrameSource, Tick};
use crate::theory::KeyCandidate;
use std::time::Instant;

/// Live key analysis controller
#[derive(Debug)]
pub struct AnalysisController {
    config: AnalysisConfig,
    detector: PitchDetector,
    mapper: NoteMapper,
    estimator: KeyEstimator,
    scorer: ConfidenceScorer,
    session: Option<Session>,
    manual_key: Option<KeyCandidate>,
}

impl AnalysisController {
    /// Create a controller with no active session
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if the configuration fails validation.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        let mapper = NoteMapper::new(config.reference_frequency);
        Ok(Self {
            detector: PitchDetector::new(config.min_rms, config.min_correlation),
            mapper,
            estimator: KeyEstimator::new(mapper, config.min_samples),
            scorer: ConfidenceScorer::new(config.weights, config.window()),
            session: None,
            manual_key: None,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Frequency to note mapping in use
    pub fn note_mapper(&self) -> &NoteMapper {
        &self.mapper
    }

    /// Whether a session is active
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The active session
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Begin a capture session
    ///
    /// Always creates a fresh session, replacing any active one.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Capture sample rate in Hz
    /// * `device` - Opaque capture device label, passed through to events
    /// * `now` - Session start; the time confidence factor counts from here
    pub fn start(&mut self, sample_rate: u32, device: Option<String>, now: Instant) -> AnalysisEvent {
        if self.session.is_some() {
            log::warn!("Starting a new session while one is active; discarding it");
        }
        if sample_rate == 0 {
            log::warn!("Session started with sample rate 0; no pitch will be detected");
        }

        log::info!(
            "Analysis session started ({} Hz, device: {})",
            sample_rate,
            device.as_deref().unwrap_or("default")
        );

        self.session = Some(Session::new(
            &self.config,
            self.mapper,
            sample_rate,
            device.clone(),
            now,
        ));

        AnalysisEvent::SessionStarted {
            device,
            sample_rate,
        }
    }

    /// End the active session, discarding all of its state
    ///
    /// Returns `None` (and does nothing) when no session is active.
    pub fn stop(&mut self) -> Option<AnalysisEvent> {
        let session = self.session.take()?;
        log::info!(
            "Analysis session stopped ({} samples buffered, state {})",
            session.buffer.len(),
            session.state()
        );
        Some(AnalysisEvent::SessionStopped)
    }

    /// Process one capture frame
    ///
    /// Detects the frame's pitch, buffers it when present and reports it.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::SessionNotActive` if no session is active.
    pub fn process_frame(&mut self, frame: &[f32], now: Instant) -> Result<PitchEvent, AnalysisError> {
        let session = self.session.as_mut().ok_or(AnalysisError::SessionNotActive)?;

        let Some(frequency) = self.detector.detect(frame, session.sample_rate) else {
            return Ok(PitchEvent::silent());
        };
        let Some(note) = self.mapper.note(frequency) else {
            return Ok(PitchEvent::silent());
        };

        session.buffer.push(frequency, now);

        let active_key = self.manual_key.or_else(|| session.locked_key());
        let in_key = active_key.map(|key| key.contains(note.pitch_class));

        log::trace!("Frame pitch {:.2} Hz ({})", frequency, note);

        Ok(PitchEvent {
            frequency: Some(frequency),
            note: Some(note.to_string()),
            in_key,
        })
    }

    /// Run one detection step
    ///
    /// Does nothing once the session has locked. Otherwise evicts stale
    /// pitches, updates the analysis state from the remaining evidence and,
    /// while analyzing, estimates and scores a key and advances the stability
    /// tracker.
    ///
    /// # Returns
    ///
    /// Events in order: state changes, the key estimate (only on ticks that
    /// evaluated a key), and the stable key on the locking tick.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::SessionNotActive` if no session is active.
    pub fn detection_tick(&mut self, now: Instant) -> Result<Vec<AnalysisEvent>, AnalysisError> {
        let session = self.session.as_mut().ok_or(AnalysisError::SessionNotActive)?;
        let mut events = Vec::new();

        if session.tracker.is_locked() {
            return Ok(events);
        }

        session.buffer.evict(now);
        let histogram = session.buffer.histogram();
        log::debug!(
            "Detection tick: {} samples, {} unique notes",
            histogram.total(),
            histogram.unique_count()
        );

        if let Some((from, to)) = session.tracker.note_evidence(histogram.unique_count()) {
            events.push(AnalysisEvent::StateChanged { from, to });
        }
        if session.tracker.state() != AnalysisState::Analyzing {
            return Ok(events);
        }

        let Some(key) = self.estimator.estimate_from_histogram(&histogram) else {
            return Ok(events);
        };

        let elapsed = now.saturating_duration_since(session.started_at);
        let confidence = self.scorer.score(&histogram, &key, elapsed);
        session.latest = Some((key, confidence));
        events.push(AnalysisEvent::KeyEstimate(KeyEstimateEvent {
            key,
            confidence: confidence.overall,
        }));

        if let StabilityOutcome::Locked { key, confidence } =
            session.tracker.observe(key, confidence.overall, now)
        {
            log::info!(
                "Key locked: {} ({}% confidence)",
                key.display_name(),
                (confidence * 100.0).round()
            );
            events.push(AnalysisEvent::StateChanged {
                from: AnalysisState::Analyzing,
                to: AnalysisState::Locked,
            });
            events.push(AnalysisEvent::StableKey(StableKeyEvent { key, confidence }));
        }

        Ok(events)
    }

    /// Feed a stream of ticks to the two drivers, forwarding every event
    ///
    /// # Errors
    ///
    /// Stops at the first driver error (`SessionNotActive`).
    pub fn drive<I, K>(&mut self, ticks: I, sink: &mut K) -> Result<(), AnalysisError>
    where
        I: IntoIterator<Item = Tick>,
        K: EventSink + ?Sized,
    {
        for tick in ticks {
            match tick {
                Tick::Frame { samples, at } => {
                    let pitch = self.process_frame(&samples, at)?;
                    sink.emit(AnalysisEvent::Pitch(pitch));
                }
                Tick::Detection { at } => {
                    for event in self.detection_tick(at)? {
                        sink.emit(event);
                    }
                }
            }
        }
        Ok(())
    }

    /// Analyze a whole frame source on a synthetic timebase
    ///
    /// Starts a session at `origin` with the source's sample rate, then drives
    /// it with frames stamped at the configured frame rate. The session stays
    /// active afterwards so it can be inspected.
    ///
    /// # Returns
    ///
    /// The locked key, if the material locked one
    pub fn analyze_source<S, K>(
        &mut self,
        source: S,
        device: Option<String>,
        origin: Instant,
        sink: &mut K,
    ) -> Result<Option<KeyCandidate>, AnalysisError>
    where
        S: FrameSource,
        K: EventSink + ?Sized,
    {
        let started = self.start(source.sample_rate(), device, origin);
        sink.emit(started);

        let ticks = FrameScheduler::offline(
            source,
            origin,
            self.config.frame_rate_hz,
            self.config.detection_interval(),
        );
        self.drive(ticks, sink)?;

        Ok(self.session.as_ref().and_then(|s| s.locked_key()))
    }

    /// Override the key manually (any mode), or clear the override with `None`
    ///
    /// The override outlives sessions and takes precedence over a locked key.
    pub fn set_manual_key(&mut self, key: Option<KeyCandidate>) {
        match key {
            Some(key) => log::info!("Manual key set: {}", key.display_name()),
            None => log::info!("Manual key cleared"),
        }
        self.manual_key = key;
    }

    /// Manual key override
    pub fn manual_key(&self) -> Option<KeyCandidate> {
        self.manual_key
    }

    /// Key consumers should display: the manual override, else the locked key
    pub fn active_key(&self) -> Option<KeyCandidate> {
        self.manual_key
            .or_else(|| self.session.as_ref().and_then(|s| s.locked_key()))
    }

    /// Summary of the active session
    pub fn snapshot(&self) -> Option<AnalysisSnapshot> {
        self.session.as_ref().map(Session::snapshot)
    }
}
