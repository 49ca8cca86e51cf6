//! Pitch-class naming

/// A note identity independent of octave (0 = C, 1 = C#, ..., 11 = B)
pub type PitchClass = u8;

/// Sharp-spelled names of the 12 pitch classes, indexed by pitch class
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Tonics in circle-of-fifths order, starting at C
pub const CIRCLE_OF_FIFTHS: [PitchClass; 12] = [0, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10, 5];

/// Name of a pitch class; values above 11 wrap around
pub fn note_name(pitch_class: PitchClass) -> &'static str {
    NOTE_NAMES[(pitch_class % 12) as usize]
}

/// Parse a note name into its pitch class
///
/// Accepts the sharp spellings of [`NOTE_NAMES`] and single-flat spellings
/// ("Eb", "Bb", "Cb", ...), case-insensitive on the letter.
///
/// # Example
///
/// ```
/// use keylock::theory::notes::pitch_class_from_name;
///
/// assert_eq!(pitch_class_from_name("C"), Some(0));
/// assert_eq!(pitch_class_from_name("Eb"), Some(3));
/// assert_eq!(pitch_class_from_name("a#"), Some(10));
/// assert_eq!(pitch_class_from_name("H"), None);
/// ```
pub fn pitch_class_from_name(name: &str) -> Option<PitchClass> {
    let mut chars = name.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let natural: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let accidental = match chars.as_str() {
        "" => 0,
        "#" => 1,
        "b" => -1,
        _ => return None,
    };
    Some((natural + accidental).rem_euclid(12) as PitchClass)
}
