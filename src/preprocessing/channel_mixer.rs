//! Channel mixing utilities (multichannel capture to mono)

use crate::error::AnalysisError;

/// Channel mixing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMixMode {
    /// Average of all channels
    #[default]
    Mono,
    /// Keep the sample with the largest magnitude in each frame
    Dominant,
    /// Keep only the first channel
    First,
}

/// Convert stereo to mono
///
/// # Arguments
///
/// * `left` - Left channel samples
/// * `right` - Right channel samples
/// * `mode` - Mixing mode
///
/// # Returns
///
/// Mono samples
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the channels differ in length.
pub fn stereo_to_mono(
    left: &[f32],
    right: &[f32],
    mode: ChannelMixMode,
) -> Result<Vec<f32>, AnalysisError> {
    log::debug!("Converting stereo to mono using {:?}", mode);

    if left.len() != right.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "Channel length mismatch: left={}, right={}",
            left.len(),
            right.len()
        )));
    }

    Ok(left
        .iter()
        .zip(right)
        .map(|(&l, &r)| mix(&[l, r], mode))
        .collect())
}

/// Down-mix interleaved multichannel samples to mono
///
/// A trailing partial frame is dropped.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `channels` is zero.
pub fn downmix_interleaved(
    samples: &[f32],
    channels: usize,
    mode: ChannelMixMode,
) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput(
            "Channel count must be positive".to_string(),
        ));
    }
    if channels == 1 {
        return Ok(samples.to_vec());
    }

    log::trace!(
        "Down-mixing {} interleaved samples over {} channels ({:?})",
        samples.len(),
        channels,
        mode
    );

    Ok(samples
        .chunks_exact(channels)
        .map(|frame| mix(frame, mode))
        .collect())
}

fn mix(frame: &[f32], mode: ChannelMixMode) -> f32 {
    match mode {
        ChannelMixMode::Mono => frame.iter().sum::<f32>() / frame.len() as f32,
        ChannelMixMode::Dominant => frame
            .iter()
            .copied()
            .fold(0.0f32, |best, x| if x.abs() > best.abs() { x } else { best }),
        ChannelMixMode::First => frame[0],
    }
}
