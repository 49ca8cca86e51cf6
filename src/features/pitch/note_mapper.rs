//! Frequency to note mapping (12-TET)

use crate::theory::notes::{note_name, PitchClass};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A note with octave, e.g. A4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Pitch class (0 = C, ..., 11 = B)
    pub pitch_class: PitchClass,
    /// Scientific pitch octave (C4 = middle C)
    pub octave: i32,
}

impl Note {
    /// Note name without octave, e.g. "A"
    pub fn name(&self) -> &'static str {
        note_name(self.pitch_class)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

/// Maps frequencies to equal-tempered notes relative to an A4 reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteMapper {
    c0: f64,
}

impl Default for NoteMapper {
    fn default() -> Self {
        Self::new(440.0)
    }
}

impl NoteMapper {
    /// Create a mapper for the given A4 reference frequency in Hz
    pub fn new(reference_a4: f32) -> Self {
        Self {
            c0: reference_a4 as f64 * 2f64.powf(-4.75),
        }
    }

    /// Frequency of C0 under this reference
    pub fn c0(&self) -> f32 {
        self.c0 as f32
    }

    /// Half steps above C0, rounded to the nearest semitone
    fn half_steps(&self, frequency: f32) -> Option<i32> {
        if !(frequency > 0.0 && frequency.is_finite()) {
            return None;
        }
        Some((12.0 * (frequency as f64 / self.c0).log2()).round() as i32)
    }

    /// Nearest note (pitch class and octave)
    ///
    /// # Returns
    ///
    /// `None` for non-positive or non-finite frequencies
    ///
    /// # Example
    ///
    /// ```
    /// use keylock::features::pitch::NoteMapper;
    ///
    /// let mapper = NoteMapper::default();
    /// assert_eq!(mapper.note(440.0).unwrap().to_string(), "A4");
    /// assert_eq!(mapper.note(261.63).unwrap().to_string(), "C4");
    /// ```
    pub fn note(&self, frequency: f32) -> Option<Note> {
        let half_steps = self.half_steps(frequency)?;
        Some(Note {
            pitch_class: half_steps.rem_euclid(12) as PitchClass,
            octave: half_steps.div_euclid(12),
        })
    }

    /// Nearest note name with octave, e.g. "C#5"
    pub fn note_name(&self, frequency: f32) -> Option<String> {
        self.note(frequency).map(|n| n.to_string())
    }

    /// Pitch class only, as used for histograms
    pub fn pitch_class(&self, frequency: f32) -> Option<PitchClass> {
        self.half_steps(frequency)
            .map(|h| h.rem_euclid(12) as PitchClass)
    }

    /// Deviation from the nearest equal-tempered note in cents (-50..=50)
    pub fn cents_offset(&self, frequency: f32) -> Option<f32> {
        if !(frequency > 0.0 && frequency.is_finite()) {
            return None;
        }
        let exact = 12.0 * (frequency as f64 / self.c0).log2();
        Some(((exact - exact.round()) * 100.0) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_notes() {
        let mapper = NoteMapper::default();
        assert_eq!(mapper.note_name(440.0).as_deref(), Some("A4"));
        assert_eq!(mapper.note_name(441.0).as_deref(), Some("A4"));
        assert_eq!(mapper.note_name(261.63).as_deref(), Some("C4"));
        assert_eq!(mapper.note_name(277.18).as_deref(), Some("C#4"));
        assert_eq!(mapper.note_name(493.88).as_deref(), Some("B4"));
        assert_eq!(mapper.note_name(523.25).as_deref(), Some("C5"));
        assert_eq!(mapper.note_name(27.5).as_deref(), Some("A0"));
    }

    #[test]
    fn test_c0_value() {
        let mapper = NoteMapper::default();
        assert!((mapper.c0() - 16.3516).abs() < 1e-3, "C0 = {}", mapper.c0());
    }

    #[test]
    fn test_pitch_classes_ignore_octave() {
        let mapper = NoteMapper::default();
        for &freq in &[110.0, 220.0, 440.0, 880.0, 1760.0] {
            assert_eq!(mapper.pitch_class(freq), Some(9), "{} Hz should be A", freq);
        }
        assert_eq!(mapper.pitch_class(311.13), Some(3));
    }

    #[test]
    fn test_below_c0_wraps_into_negative_octaves() {
        let mapper = NoteMapper::default();
        let note = mapper.note(15.43).unwrap(); // B-1
        assert_eq!(note.pitch_class, 11);
        assert_eq!(note.octave, -1);
    }

    #[test]
    fn test_invalid_frequencies() {
        let mapper = NoteMapper::default();
        assert_eq!(mapper.note(0.0), None);
        assert_eq!(mapper.note(-440.0), None);
        assert_eq!(mapper.pitch_class(f32::NAN), None);
        assert_eq!(mapper.cents_offset(f32::INFINITY), None);
    }

    #[test]
    fn test_cents_offset_and_custom_reference() {
        let mapper = NoteMapper::default();
        assert!(mapper.cents_offset(440.0).unwrap().abs() < 1e-3);
        let sharp = mapper.cents_offset(440.0 * 2f32.powf(20.0 / 1200.0)).unwrap();
        assert!((sharp - 20.0).abs() < 0.01, "got {}", sharp);

        // With A4 = 432 Hz, 432 Hz is A4 exactly
        let baroque = NoteMapper::new(432.0);
        assert_eq!(baroque.note_name(432.0).as_deref(), Some("A4"));
        assert!(baroque.cents_offset(432.0).unwrap().abs() < 1e-3);
    }
}
