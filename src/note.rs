//! Pitch classes and octave bound notes.

use std::{cmp::Ordering, fmt::Display};

use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------

mod range;
pub use range::NoteRange;

// -------------------------------------------------------------------------------------------------

/// One of the twelve equal tempered pitch classes. The subscript 's' means sharp.
///
/// PitchClass implements TryFrom<&str>, supporting the notations `C`, `C#`, `Cs`, `Db`, `E♭`.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C = 0,
    Cs = 1,
    D = 2,
    Ds = 3,
    E = 4,
    F = 5,
    Fs = 6,
    G = 7,
    Gs = 8,
    A = 9,
    As = 10,
    B = 11,
}

impl PitchClass {
    /// All pitch classes in ascending order.
    pub const ALL: [PitchClass; 12] = [
        Self::C,
        Self::Cs,
        Self::D,
        Self::Ds,
        Self::E,
        Self::F,
        Self::Fs,
        Self::G,
        Self::Gs,
        Self::A,
        Self::As,
        Self::B,
    ];

    /// Semitone index of the pitch class: 0 = C, 1 = C# ...
    pub fn index(&self) -> i32 {
        *self as i32
    }

    /// Pitch class for the given semitone index. Wraps around octaves.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    /// Return a new pitch class shifted by the given amount of semitones.
    #[must_use]
    pub fn shifted(&self, semitones: i32) -> Self {
        Self::from_index(self.index() + semitones)
    }

    /// Shortest signed semitone distance from this to the other pitch class, in range [-5..=6].
    pub fn delta(&self, to: PitchClass) -> i32 {
        let up = (to.index() - self.index()).rem_euclid(12);
        if up > 6 {
            up - 12
        } else {
            up
        }
    }
}

/// Parse a pitch name into a raw semitone index relative to C. Flats and sharps may step out of
/// the [0..12) range (e.g. `Cb` = -1), which matters when the name is bound to an octave.
fn pitch_name_index(s: &str) -> Result<i32, String> {
    let mut chars = s.trim().chars();
    let base = match chars.next() {
        Some('c' | 'C') => 0,
        Some('d' | 'D') => 2,
        Some('e' | 'E') => 4,
        Some('f' | 'F') => 5,
        Some('g' | 'G') => 7,
        Some('a' | 'A') => 9,
        Some('b' | 'B') => 11,
        Some(c) => {
            return Err(format!(
                "invalid pitch '{}' - note character '{}' is invalid.",
                s, c
            ))
        }
        None => return Err("invalid pitch - string is empty.".to_string()),
    };
    let accidental = match chars.next() {
        None => 0,
        Some('#' | '♯' | 's' | 'S') => 1,
        Some('b' | '♭') => -1,
        Some(c) => {
            return Err(format!(
                "invalid pitch '{}' - accidental '{}' is invalid.",
                s, c
            ))
        }
    };
    if chars.next().is_some() {
        return Err(format!("invalid pitch '{}' - string is too long.", s));
    }
    Ok(base + accidental)
}

impl TryFrom<&str> for PitchClass {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, String> {
        Ok(Self::from_index(pitch_name_index(s)?))
    }
}

impl Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        write!(f, "{}", NAMES[*self as usize])
    }
}

// -------------------------------------------------------------------------------------------------

/// A pitch class in a specific octave. `C4` is middle C (MIDI note 60), `A4` is 440Hz.
///
/// For TryFrom<&str> conversions, the following notation is supported:
/// `C4` (plain), `C#1` (sharps), `Db1` (flats), `D_2` (using _ as separator),
/// `G 5` (using space as separator).
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl Note {
    pub fn new(pitch_class: PitchClass, octave: i32) -> Self {
        Self {
            pitch_class,
            octave,
        }
    }

    /// Absolute semitone number, counted from C0.
    pub fn semitones(&self) -> i32 {
        self.octave * 12 + self.pitch_class.index()
    }

    /// Note from an absolute semitone number, counted from C0.
    pub fn from_semitones(semitones: i32) -> Self {
        Self {
            pitch_class: PitchClass::from_index(semitones),
            octave: semitones.div_euclid(12),
        }
    }

    /// MIDI note number: C4 = 60.
    pub fn midi(&self) -> i32 {
        self.semitones() + 12
    }

    /// Note from a MIDI note number.
    pub fn from_midi(midi: i32) -> Self {
        Self::from_semitones(midi - 12)
    }

    /// Frequency in Hz with equal temperament and A4 = 440Hz.
    pub fn frequency(&self) -> f64 {
        440.0 * 2.0_f64.powf((self.midi() - 69) as f64 / 12.0)
    }

    /// Signed semitone distance from this note to the other note.
    pub fn delta(&self, other: &Note) -> i32 {
        other.semitones() - self.semitones()
    }

    /// Return a new note transposed by the given amount of semitones.
    #[must_use]
    pub fn shifted(&self, semitones: i32) -> Self {
        Self::from_semitones(self.semitones() + semitones)
    }

    /// Return a new note moved up or down by the given amount of octaves.
    #[must_use]
    pub fn shifted_octave(&self, octaves: i32) -> Self {
        Self::new(self.pitch_class, self.octave + octaves)
    }

    /// Return the same pitch class in the given octave.
    #[must_use]
    pub fn with_octave(&self, octave: i32) -> Self {
        Self::new(self.pitch_class, octave)
    }

    /// The note of the given pitch class which is closest to this note.
    /// When up and down are equally far away, the lower note wins.
    #[must_use]
    pub fn nearest_with_pitch_class(&self, pitch_class: PitchClass) -> Self {
        let down = (self.pitch_class.index() - pitch_class.index()).rem_euclid(12);
        let up = (12 - down) % 12;
        if down <= up {
            self.shifted(-down)
        } else {
            self.shifted(up)
        }
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semitones().cmp(&other.semitones())
    }
}

impl TryFrom<&str> for Note {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-' || c == '_' || c == ' ')
            .ok_or_else(|| format!("invalid note str '{}' - octave is missing.", s))?;
        let (pitch_part, octave_part) = s.split_at(split);
        let pitch_index = pitch_name_index(pitch_part)
            .map_err(|err| format!("invalid note str '{}': {}", s, err))?;
        let octave_part = octave_part.trim_start_matches(['_', ' ']);
        let octave = octave_part
            .parse::<i32>()
            .map_err(|err| format!("invalid note str '{}': {}", s, err))?;
        if !(-1..=10).contains(&octave) {
            return Err(format!(
                "invalid note str '{}' - octave '{}' is out of range.",
                s, octave
            ));
        }
        Ok(Self::from_semitones(octave * 12 + pitch_index))
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

// --------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pitch_class_conversion() -> Result<(), String> {
        assert!(PitchClass::try_from("").is_err());
        assert!(PitchClass::try_from("x").is_err());
        assert!(PitchClass::try_from("c##").is_err());

        assert_eq!(PitchClass::try_from("C")?, PitchClass::C);
        assert_eq!(PitchClass::try_from("c#")?, PitchClass::Cs);
        assert_eq!(PitchClass::try_from("Db")?, PitchClass::Cs);
        assert_eq!(PitchClass::try_from("Cb")?, PitchClass::B);
        assert_eq!(PitchClass::try_from("E♭")?, PitchClass::Ds);
        assert_eq!(PitchClass::As.to_string(), "A#");
        Ok(())
    }

    #[test]
    fn pitch_class_delta() {
        assert_eq!(PitchClass::C.delta(PitchClass::C), 0);
        assert_eq!(PitchClass::C.delta(PitchClass::G), -5);
        assert_eq!(PitchClass::C.delta(PitchClass::F), 5);
        assert_eq!(PitchClass::C.delta(PitchClass::Fs), 6);
        assert_eq!(PitchClass::B.delta(PitchClass::C), 1);
        assert_eq!(PitchClass::C.delta(PitchClass::B), -1);
        assert_eq!(PitchClass::A.shifted(5), PitchClass::D);
        assert_eq!(PitchClass::D.shifted(-5), PitchClass::A);
    }

    #[test]
    fn note_conversion() -> Result<(), String> {
        assert!(Note::try_from("x4").is_err());
        assert!(Note::try_from("C").is_err());
        assert!(Note::try_from("c.2").is_err());
        assert!(Note::try_from("C12").is_err());

        assert_eq!(Note::try_from("C4")?, Note::new(PitchClass::C, 4));
        assert_eq!(Note::try_from("Cb4")?, Note::new(PitchClass::B, 3));
        assert_eq!(Note::try_from("C#3")?, Note::new(PitchClass::Cs, 3));
        assert_eq!(Note::try_from("E_7")?, Note::new(PitchClass::E, 7));
        assert_eq!(Note::try_from("g 5")?, Note::new(PitchClass::G, 5));
        assert_eq!(Note::try_from("A-1")?, Note::new(PitchClass::A, -1));
        assert_eq!(Note::new(PitchClass::Fs, 2).to_string(), "F#2");
        Ok(())
    }

    #[test]
    fn note_arithmetic() -> Result<(), String> {
        let c4 = Note::try_from("C4")?;
        assert_eq!(c4.midi(), 60);
        assert_eq!(Note::from_midi(69), Note::new(PitchClass::A, 4));
        assert!((Note::new(PitchClass::A, 4).frequency() - 440.0).abs() < 1e-9);
        assert!((Note::new(PitchClass::A, 3).frequency() - 220.0).abs() < 1e-9);
        assert_eq!(c4.delta(&Note::try_from("G4")?), 7);
        assert_eq!(c4.delta(&Note::try_from("G3")?), -5);
        assert_eq!(c4.shifted(-1), Note::new(PitchClass::B, 3));
        assert_eq!(c4.shifted_octave(2), Note::new(PitchClass::C, 6));
        assert!(Note::try_from("B3")? < c4);
        Ok(())
    }

    #[test]
    fn nearest_pitch_class() -> Result<(), String> {
        let c4 = Note::try_from("C4")?;
        assert_eq!(c4.nearest_with_pitch_class(PitchClass::D), Note::try_from("D4")?);
        assert_eq!(c4.nearest_with_pitch_class(PitchClass::A), Note::try_from("A3")?);
        // tritone: equally far away, prefer down
        assert_eq!(c4.nearest_with_pitch_class(PitchClass::Fs), Note::try_from("F#3")?);
        assert_eq!(c4.nearest_with_pitch_class(PitchClass::C), c4);
        Ok(())
    }
}
