//! Static music-theory tables
//!
//! The single home of pitch-class names and mode interval sets, plus the
//! key type every other module works with:
//! - Note names and circle-of-fifths order
//! - The seven diatonic modes
//! - Key candidates (tonic + mode)

pub mod key;
pub mod mode;
pub mod notes;

pub use key::KeyCandidate;
pub use mode::Mode;
pub use notes::{note_name, pitch_class_from_name, PitchClass, NOTE_NAMES};
