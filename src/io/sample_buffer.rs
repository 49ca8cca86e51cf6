//! Capture frame sources
//!
//! The capture layer is external; these types describe the contract it
//! fulfils (fixed-size mono frames at a known sample rate) and provide
//! in-memory sources for offline analysis and tests.

use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::{downmix_interleaved, ChannelMixMode};

/// A supplier of fixed-size mono sample frames
pub trait FrameSource {
    /// Sample rate of every frame in Hz
    fn sample_rate(&self) -> u32;

    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Option<Vec<f32>>;
}

/// Buffer for windowed audio processing
///
/// Chunks pre-recorded mono samples into frames of `frame_size`, advancing
/// by `hop_size` between frames. A trailing partial frame is not emitted.
#[derive(Debug)]
pub struct SampleBuffer {
    /// Buffer data
    data: Vec<f32>,
    /// Current position
    position: usize,
    /// Sample rate of `data`
    sample_rate: u32,
    /// Samples per frame
    frame_size: usize,
    /// Samples advanced between frames
    hop_size: usize,
}

impl SampleBuffer {
    /// Create an empty sample buffer
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for a zero frame or hop size.
    pub fn new(sample_rate: u32, frame_size: usize, hop_size: usize) -> Result<Self, AnalysisError> {
        if frame_size == 0 || hop_size == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Frame and hop size must be positive (frame={}, hop={})",
                frame_size, hop_size
            )));
        }
        Ok(Self {
            data: Vec::with_capacity(frame_size),
            position: 0,
            sample_rate,
            frame_size,
            hop_size,
        })
    }

    /// Buffer holding mono samples, framed back to back (hop = frame size)
    pub fn from_samples(
        samples: Vec<f32>,
        sample_rate: u32,
        frame_size: usize,
    ) -> Result<Self, AnalysisError> {
        let mut buffer = Self::new(sample_rate, frame_size, frame_size)?;
        buffer.data = samples;
        Ok(buffer)
    }

    /// Buffer holding interleaved multichannel samples, down-mixed to mono
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for zero channels or a zero frame size.
    pub fn from_interleaved(
        samples: &[f32],
        channels: usize,
        mode: ChannelMixMode,
        sample_rate: u32,
        frame_size: usize,
    ) -> Result<Self, AnalysisError> {
        let mono = downmix_interleaved(samples, channels, mode)?;
        Self::from_samples(mono, sample_rate, frame_size)
    }

    /// Add samples to buffer
    pub fn push(&mut self, samples: &[f32]) {
        self.data.extend_from_slice(samples);
    }

    /// Samples not yet consumed by a frame
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Get next window of samples
    pub fn next_window(&mut self) -> Option<Vec<f32>> {
        if self.position + self.frame_size > self.data.len() {
            return None;
        }

        let window = self.data[self.position..self.position + self.frame_size].to_vec();
        self.position += self.hop_size;
        Some(window)
    }
}

impl FrameSource for SampleBuffer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn next_frame(&mut self) -> Option<Vec<f32>> {
        self.next_window()
    }
}

/// Frame source over an in-memory list of frames
#[derive(Debug, Clone)]
pub struct FrameList {
    frames: std::collections::VecDeque<Vec<f32>>,
    sample_rate: u32,
}

impl FrameList {
    /// Source yielding `frames` in order
    pub fn new<I>(frames: I, sample_rate: u32) -> Self
    where
        I: IntoIterator<Item = Vec<f32>>,
    {
        Self {
            frames: frames.into_iter().collect(),
            sample_rate,
        }
    }
}

impl FrameSource for FrameList {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn next_frame(&mut self) -> Option<Vec<f32>> {
        self.frames.pop_front()
    }
}
