//! Pitch modules
//!
//! Per-frame monophonic pitch tracking:
//! - Autocorrelation fundamental frequency detection
//! - Frequency to note / pitch-class mapping

pub mod detector;
pub mod note_mapper;

pub use detector::PitchDetector;
pub use note_mapper::{Note, NoteMapper};
