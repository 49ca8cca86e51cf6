//! The seven diatonic modes

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Diatonic scale pattern built on a tonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Major
    Ionian,
    /// Minor with raised sixth
    Dorian,
    /// Minor with lowered second
    Phrygian,
    /// Major with raised fourth
    Lydian,
    /// Major with lowered seventh
    Mixolydian,
    /// Natural minor
    Aeolian,
    /// Diminished fifth mode
    Locrian,
}

impl Mode {
    /// All modes in scale-degree order
    pub const ALL: [Mode; 7] = [
        Mode::Ionian,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Aeolian,
        Mode::Locrian,
    ];

    /// Semitone offsets of the seven scale degrees above the tonic (sorted)
    pub fn intervals(self) -> &'static [u8; 7] {
        match self {
            Mode::Ionian => &[0, 2, 4, 5, 7, 9, 11],
            Mode::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Mode::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
            Mode::Locrian => &[0, 1, 3, 5, 6, 8, 10],
        }
    }

    /// Mode name as written in key strings ("Ionian", "Dorian", ...)
    pub fn name(self) -> &'static str {
        match self {
            Mode::Ionian => "Ionian",
            Mode::Dorian => "Dorian",
            Mode::Phrygian => "Phrygian",
            Mode::Lydian => "Lydian",
            Mode::Mixolydian => "Mixolydian",
            Mode::Aeolian => "Aeolian",
            Mode::Locrian => "Locrian",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = AnalysisError;

    /// Parses mode names case-insensitively; "Major" and "Minor" are
    /// accepted for Ionian and Aeolian.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "major" => return Ok(Mode::Ionian),
            "minor" => return Ok(Mode::Aeolian),
            _ => {}
        }
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| AnalysisError::InvalidInput(format!("Unknown mode: {}", s)))
    }
}
