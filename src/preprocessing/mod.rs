//! Audio preprocessing modules
//!
//! Utilities for preparing capture frames for analysis:
//! - Silence gating (RMS threshold)
//! - Channel mixing (multichannel to mono)

pub mod channel_mixer;
pub mod silence;

pub use channel_mixer::{downmix_interleaved, stereo_to_mono, ChannelMixMode};
pub use silence::{rms, SilenceDetector};
