//! Frame and detection tick scheduling
//!
//! Turns a [`FrameSource`] into one ordered stream of [`Tick`]s that drives
//! both analysis cadences: every frame yields a frame tick, and whenever the
//! detection period elapses a detection tick follows the frame that crossed
//! the deadline.
//!
//! Two timebases are supported:
//! - **Live**: every frame is stamped with the current time of a [`Clock`].
//!   Pacing is left to the source (a capture callback delivers frames at the
//!   device rate).
//! - **Offline**: frames are stamped from their index at a nominal frame rate,
//!   so pre-recorded audio is analyzed as if played back in real time without
//!   waiting for it.

use super::clock::{Clock, PeriodicTimer};
use super::sample_buffer::FrameSource;
use std::fmt;
use std::time::{Duration, Instant};

/// One unit of work for the analysis drivers
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// A capture frame observed at `at`
    Frame {
        /// Mono samples
        samples: Vec<f32>,
        /// Observation instant
        at: Instant,
    },
    /// The detection period elapsed at `at`
    Detection {
        /// Tick instant
        at: Instant,
    },
}

impl Tick {
    /// Instant the tick refers to
    pub fn at(&self) -> Instant {
        match self {
            Tick::Frame { at, .. } | Tick::Detection { at } => *at,
        }
    }
}

enum Timebase {
    Live(Box<dyn Clock + Send>),
    Offline {
        origin: Instant,
        frame_rate_hz: f64,
        frames: u64,
    },
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timebase::Live(_) => f.write_str("Live"),
            Timebase::Offline {
                origin,
                frame_rate_hz,
                frames,
            } => f
                .debug_struct("Offline")
                .field("origin", origin)
                .field("frame_rate_hz", frame_rate_hz)
                .field("frames", frames)
                .finish(),
        }
    }
}

/// Iterator of frame and detection ticks over a frame source
#[derive(Debug)]
pub struct FrameScheduler<S> {
    source: S,
    timebase: Timebase,
    detection: PeriodicTimer,
    pending_detection: Option<Instant>,
}

impl<S: FrameSource> FrameScheduler<S> {
    /// Schedule frames stamped by a live clock
    ///
    /// The detection timer is armed by the first frame.
    pub fn live<C>(source: S, clock: C, detection_interval: Duration) -> Self
    where
        C: Clock + Send + 'static,
    {
        Self {
            source,
            timebase: Timebase::Live(Box::new(clock)),
            detection: PeriodicTimer::new(detection_interval),
            pending_detection: None,
        }
    }

    /// Schedule frames on a synthetic timebase
    ///
    /// # Arguments
    ///
    /// * `source` - Frame supplier
    /// * `origin` - Instant of the first frame (normally the session start)
    /// * `frame_rate_hz` - Nominal frames per second; non-positive rates fall back to 60
    /// * `detection_interval` - Detection period, measured from `origin`
    pub fn offline(
        source: S,
        origin: Instant,
        frame_rate_hz: f32,
        detection_interval: Duration,
    ) -> Self {
        let frame_rate_hz = if frame_rate_hz > 0.0 && frame_rate_hz.is_finite() {
            frame_rate_hz as f64
        } else {
            log::warn!("Invalid frame rate {}, using 60 fps", frame_rate_hz);
            60.0
        };

        let mut detection = PeriodicTimer::new(detection_interval);
        detection.arm(origin);

        Self {
            source,
            timebase: Timebase::Offline {
                origin,
                frame_rate_hz,
                frames: 0,
            },
            detection,
            pending_detection: None,
        }
    }

    /// Sample rate of the underlying source
    pub fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    /// Underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    fn stamp(&mut self) -> Instant {
        match &mut self.timebase {
            Timebase::Live(clock) => clock.now(),
            Timebase::Offline {
                origin,
                frame_rate_hz,
                frames,
            } => {
                let at = *origin + Duration::from_secs_f64(*frames as f64 / *frame_rate_hz);
                *frames += 1;
                at
            }
        }
    }
}

impl<S: FrameSource> Iterator for FrameScheduler<S> {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if let Some(at) = self.pending_detection.take() {
            return Some(Tick::Detection { at });
        }

        let samples = self.source.next_frame()?;
        let at = self.stamp();
        if self.detection.poll(at) {
            self.pending_detection = Some(at);
        }
        Some(Tick::Frame { samples, at })
    }
}
