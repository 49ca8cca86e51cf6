//! Key candidates (tonic + mode)

use super::mode::Mode;
use super::notes::{note_name, pitch_class_from_name, PitchClass, CIRCLE_OF_FIFTHS};
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A musical key: tonic pitch class plus mode
///
/// Two keys are equal when both tonic and mode match; there is no tolerance
/// for near matches. Serializes with its derived `display_name` for consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "KeyRecord", try_from = "KeyRecord")]
pub struct KeyCandidate {
    tonic: PitchClass,
    mode: Mode,
}

#[derive(Serialize, Deserialize)]
struct KeyRecord {
    tonic: PitchClass,
    mode: Mode,
    #[serde(default)]
    display_name: String,
}

impl From<KeyCandidate> for KeyRecord {
    fn from(key: KeyCandidate) -> Self {
        Self {
            tonic: key.tonic,
            mode: key.mode,
            display_name: key.display_name(),
        }
    }
}

impl TryFrom<KeyRecord> for KeyCandidate {
    type Error = AnalysisError;

    fn try_from(record: KeyRecord) -> Result<Self, Self::Error> {
        if record.tonic > 11 {
            return Err(AnalysisError::InvalidInput(format!(
                "Tonic pitch class out of range: {}",
                record.tonic
            )));
        }
        Ok(Self::new(record.tonic, record.mode))
    }
}

impl KeyCandidate {
    /// Create a key; tonic values above 11 wrap around
    pub fn new(tonic: PitchClass, mode: Mode) -> Self {
        Self {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Tonic pitch class (0 = C, ..., 11 = B)
    pub fn tonic(&self) -> PitchClass {
        self.tonic
    }

    /// Mode of the key
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Tonic note name, e.g. "F#"
    pub fn note_name(&self) -> &'static str {
        note_name(self.tonic)
    }

    /// Human-readable name
    ///
    /// Ionian keys read "<note> Major", Aeolian keys "<note> Minor", every
    /// other mode "<note> <Mode>".
    ///
    /// # Example
    ///
    /// ```
    /// use keylock::theory::{KeyCandidate, Mode};
    ///
    /// assert_eq!(KeyCandidate::new(0, Mode::Ionian).display_name(), "C Major");
    /// assert_eq!(KeyCandidate::new(9, Mode::Aeolian).display_name(), "A Minor");
    /// assert_eq!(KeyCandidate::new(2, Mode::Dorian).display_name(), "D Dorian");
    /// ```
    pub fn display_name(&self) -> String {
        match self.mode {
            Mode::Ionian => format!("{} Major", self.note_name()),
            Mode::Aeolian => format!("{} Minor", self.note_name()),
            other => format!("{} {}", self.note_name(), other),
        }
    }

    /// Identity string used for lock de-duplication, e.g. "C-Ionian"
    pub fn key_string(&self) -> String {
        format!("{}-{}", self.note_name(), self.mode)
    }

    /// The seven pitch classes of the key, in scale-degree order
    pub fn pitch_classes(&self) -> [PitchClass; 7] {
        self.mode.intervals().map(|iv| (self.tonic + iv) % 12)
    }

    /// Whether a pitch class belongs to the key's diatonic set
    pub fn contains(&self, pitch_class: PitchClass) -> bool {
        let offset = (pitch_class % 12 + 12 - self.tonic) % 12;
        self.mode.intervals().contains(&offset)
    }

    /// Note names of the scale, starting at the tonic
    pub fn scale_notes(&self) -> Vec<&'static str> {
        self.pitch_classes().iter().map(|&pc| note_name(pc)).collect()
    }

    /// Whether a note name belongs to the key; octave digits are ignored
    ///
    /// Unparsable names are reported as not in key.
    ///
    /// ```
    /// use keylock::theory::{KeyCandidate, Mode};
    ///
    /// let c_major = KeyCandidate::new(0, Mode::Ionian);
    /// assert!(c_major.is_note_in_key("E4"));
    /// assert!(!c_major.is_note_in_key("F#3"));
    /// ```
    pub fn is_note_in_key(&self, note: &str) -> bool {
        let name: String = note
            .chars()
            .filter(|c| !c.is_ascii_digit() && *c != '-')
            .collect();
        pitch_class_from_name(&name).is_some_and(|pc| self.contains(pc))
    }

    /// Position of the tonic on the circle of fifths (C = 0, G = 1, ..., F = 11)
    pub fn circle_of_fifths_position(&self) -> usize {
        CIRCLE_OF_FIFTHS
            .iter()
            .position(|&pc| pc == self.tonic)
            .unwrap_or(0)
    }

    /// Keys a fifth below and a fifth above, in the same mode
    pub fn circle_of_fifths_neighbors(&self) -> [KeyCandidate; 2] {
        [
            KeyCandidate::new((self.tonic + 5) % 12, self.mode),
            KeyCandidate::new((self.tonic + 7) % 12, self.mode),
        ]
    }
}

impl fmt::Display for KeyCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl FromStr for KeyCandidate {
    type Err = AnalysisError;

    /// Parses display names ("C Major", "A Minor", "Eb Dorian") and key
    /// strings ("C-Ionian").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (note, mode) = trimmed
            .split_once(' ')
            .or_else(|| trimmed.split_once('-'))
            .ok_or_else(|| AnalysisError::InvalidInput(format!("Unrecognized key: {}", s)))?;
        let tonic = pitch_class_from_name(note)
            .ok_or_else(|| AnalysisError::InvalidInput(format!("Unknown note: {}", note)))?;
        Ok(Self::new(tonic, mode.parse()?))
    }
}
