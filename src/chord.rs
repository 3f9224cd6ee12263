//! Chord symbols: a root pitch class with intervals, parsed from authored chord names.

use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;
use pest::Parser;
use pest_derive::Parser;

use crate::note::{Note, PitchClass};

// --------------------------------------------------------------------------------------------------

// major chords
const MAJOR: [u8; 3] = [0, 4, 7];
const AUG: [u8; 3] = [0, 4, 8];
const SIX: [u8; 4] = [0, 4, 7, 9];
const SIX_NINE: [u8; 5] = [0, 4, 7, 9, 14];
const MAJOR7: [u8; 4] = [0, 4, 7, 11];
const MAJOR9: [u8; 5] = [0, 4, 7, 11, 14];
const ADD9: [u8; 4] = [0, 4, 7, 14];
const MAJOR11: [u8; 6] = [0, 4, 7, 11, 14, 17];
const ADD11: [u8; 4] = [0, 4, 7, 17];
const MAJOR13: [u8; 6] = [0, 4, 7, 11, 14, 21];
// dominant chords
const SEVEN: [u8; 4] = [0, 4, 7, 10];
const SEVEN_FLAT5: [u8; 4] = [0, 4, 6, 10];
const SEVEN_SHARP5: [u8; 4] = [0, 4, 8, 10];
const SEVEN_FLAT9: [u8; 5] = [0, 4, 7, 10, 13];
const NINE: [u8; 5] = [0, 4, 7, 10, 14];
const ELEVEN: [u8; 6] = [0, 4, 7, 10, 14, 17];
const THIRTEEN: [u8; 7] = [0, 4, 7, 10, 14, 17, 21];
// minor chords
const MINOR: [u8; 3] = [0, 3, 7];
const DIMINISHED: [u8; 3] = [0, 3, 6];
const MINOR6: [u8; 4] = [0, 3, 7, 9];
const MINOR7FLAT5: [u8; 4] = [0, 3, 6, 10];
const MINOR7: [u8; 4] = [0, 3, 7, 10];
const DIMINISHED7: [u8; 4] = [0, 3, 6, 9];
const MINOR9: [u8; 5] = [0, 3, 7, 10, 14];
const MINOR11: [u8; 6] = [0, 3, 7, 10, 14, 17];
const MINOR_MAJOR7: [u8; 4] = [0, 3, 7, 11];
// other chords
const FIVE: [u8; 2] = [0, 7];
const SUS2: [u8; 3] = [0, 2, 7];
const SUS4: [u8; 3] = [0, 5, 7];
const SEVEN_SUS4: [u8; 4] = [0, 5, 7, 10];

// map of all known chord qualities with various aliases
lazy_static! {
    static ref QUALITY_TABLE: HashMap<&'static str, Vec<u8>> = {
        HashMap::from([
            ("", Vec::from(MAJOR)),
            ("major", Vec::from(MAJOR)),
            ("maj", Vec::from(MAJOR)),
            ("M", Vec::from(MAJOR)),
            ("Δ", Vec::from(MAJOR)),
            ("aug", Vec::from(AUG)),
            ("+", Vec::from(AUG)),
            ("6", Vec::from(SIX)),
            ("69", Vec::from(SIX_NINE)),
            ("major7", Vec::from(MAJOR7)),
            ("maj7", Vec::from(MAJOR7)),
            ("M7", Vec::from(MAJOR7)),
            ("Δ7", Vec::from(MAJOR7)),
            ("maj9", Vec::from(MAJOR9)),
            ("M9", Vec::from(MAJOR9)),
            ("add9", Vec::from(ADD9)),
            ("maj11", Vec::from(MAJOR11)),
            ("add11", Vec::from(ADD11)),
            ("maj13", Vec::from(MAJOR13)),
            ("7", Vec::from(SEVEN)),
            ("dom7", Vec::from(SEVEN)),
            ("7b5", Vec::from(SEVEN_FLAT5)),
            ("7#5", Vec::from(SEVEN_SHARP5)),
            ("7b9", Vec::from(SEVEN_FLAT9)),
            ("9", Vec::from(NINE)),
            ("11", Vec::from(ELEVEN)),
            ("13", Vec::from(THIRTEEN)),
            ("minor", Vec::from(MINOR)),
            ("min", Vec::from(MINOR)),
            ("m", Vec::from(MINOR)),
            ("-", Vec::from(MINOR)),
            ("diminished", Vec::from(DIMINISHED)),
            ("dim", Vec::from(DIMINISHED)),
            ("o", Vec::from(DIMINISHED)),
            ("°", Vec::from(DIMINISHED)),
            ("m6", Vec::from(MINOR6)),
            ("min6", Vec::from(MINOR6)),
            ("m7b5", Vec::from(MINOR7FLAT5)),
            ("ø", Vec::from(MINOR7FLAT5)),
            ("minor7", Vec::from(MINOR7)),
            ("min7", Vec::from(MINOR7)),
            ("m7", Vec::from(MINOR7)),
            ("-7", Vec::from(MINOR7)),
            ("dim7", Vec::from(DIMINISHED7)),
            ("o7", Vec::from(DIMINISHED7)),
            ("m9", Vec::from(MINOR9)),
            ("min9", Vec::from(MINOR9)),
            ("m11", Vec::from(MINOR11)),
            ("min11", Vec::from(MINOR11)),
            ("mM7", Vec::from(MINOR_MAJOR7)),
            ("minMaj7", Vec::from(MINOR_MAJOR7)),
            ("5", Vec::from(FIVE)),
            ("sus2", Vec::from(SUS2)),
            ("sus4", Vec::from(SUS4)),
            ("sus", Vec::from(SUS4)),
            ("7sus4", Vec::from(SEVEN_SUS4)),
        ])
    };
}

/// Look up chord intervals by quality name: exact spelling first, so that `M` and `m` differ,
/// then ignoring whitespace and case, so that e.g. `Minor` or `MAJ 7` resolve too.
fn quality_intervals(quality: &str) -> Option<&'static Vec<u8>> {
    let quality = quality.trim();
    if let Some(intervals) = QUALITY_TABLE.get(quality) {
        return Some(intervals);
    }
    let compact = quality
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    if let Some(intervals) = QUALITY_TABLE.get(compact.as_str()) {
        return Some(intervals);
    }
    // only match lower case aliases here, as upper case ones are ambiguous (`M7` vs `m7`)
    let lower = compact.to_lowercase();
    QUALITY_TABLE
        .iter()
        .find(|(name, _)| name.to_lowercase() == **name && **name == lower)
        .map(|(_, intervals)| intervals)
}

// --------------------------------------------------------------------------------------------------

#[derive(Parser)]
#[grammar = "chord.pest"]
struct ChordParser;

// --------------------------------------------------------------------------------------------------

/// A chord: root pitch class, intervals and an optional slash bass.
///
/// The quality is kept as authored, so transposed chords print the way they were written.
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    root: PitchClass,
    quality: String,
    intervals: Vec<u8>,
    bass: Option<PitchClass>,
}

impl Chord {
    /// Create a new chord from the given root and intervals.
    pub fn new(root: PitchClass, intervals: Vec<u8>) -> Self {
        Self {
            root,
            quality: String::new(),
            intervals,
            bass: None,
        }
    }

    /// Root pitch class.
    pub fn root(&self) -> PitchClass {
        self.root
    }

    /// Quality name, as authored.
    pub fn quality(&self) -> &str {
        &self.quality
    }

    /// Intervals / steps from the root.
    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }

    /// Slash bass, if any.
    pub fn bass(&self) -> Option<PitchClass> {
        self.bass
    }

    /// Is this a minor chord (has a minor but no major third)?
    pub fn is_minor(&self) -> bool {
        self.intervals.contains(&3) && !self.intervals.contains(&4)
    }

    /// All distinct pitch classes of the chord, including the bass.
    pub fn pitch_classes(&self) -> Vec<PitchClass> {
        let mut pitch_classes = Vec::with_capacity(self.intervals.len() + 1);
        for interval in &self.intervals {
            let pitch_class = self.root.shifted(*interval as i32);
            if !pitch_classes.contains(&pitch_class) {
                pitch_classes.push(pitch_class);
            }
        }
        if let Some(bass) = self.bass {
            if !pitch_classes.contains(&bass) {
                pitch_classes.push(bass);
            }
        }
        pitch_classes
    }

    pub fn contains(&self, pitch_class: PitchClass) -> bool {
        self.pitch_classes().contains(&pitch_class)
    }

    /// Return a new chord transposed by the given amount of semitones.
    #[must_use]
    pub fn transposed(&self, semitones: i32) -> Self {
        Self {
            root: self.root.shifted(semitones),
            quality: self.quality.clone(),
            intervals: self.intervals.clone(),
            bass: self.bass.map(|bass| bass.shifted(semitones)),
        }
    }

    /// The smallest signed semitone shift which moves the given note onto a chord tone.
    /// When a shift up and down are equally far away, the downward shift wins.
    pub fn conform_shift(&self, note: &Note) -> i32 {
        let mut best: Option<i32> = None;
        for pitch_class in self.pitch_classes() {
            let down = (note.pitch_class.index() - pitch_class.index()).rem_euclid(12);
            let up = (12 - down) % 12;
            let shift = if down <= up { -down } else { up };
            best = match best {
                Some(current) if (current.abs(), current) <= (shift.abs(), shift) => Some(current),
                _ => Some(shift),
            };
        }
        best.unwrap_or(0)
    }

    /// Move the given note onto the nearest tone of this chord, in the same octave neighborhood.
    /// Notes which already are chord tones are returned unchanged.
    pub fn conform(&self, note: &Note) -> Note {
        note.shifted(self.conform_shift(note))
    }
}

impl TryFrom<&str> for Chord {
    type Error = String;

    /// Try converting the given chord symbol, e.g. "C", "Ebm7", "F# minor" or "G7/B".
    fn try_from(s: &str) -> Result<Self, String> {
        let chord = ChordParser::parse(Rule::chord, s.trim())
            .map_err(|err| format!("invalid chord '{}': {}", s, err))?
            .next()
            .ok_or_else(|| format!("invalid chord '{}'", s))?;
        let mut root = None;
        let mut quality = "";
        let mut bass = None;
        for pair in chord.into_inner() {
            match pair.as_rule() {
                Rule::pitch => root = Some(PitchClass::try_from(pair.as_str())?),
                Rule::quality => quality = pair.as_str().trim(),
                Rule::bass => {
                    if let Some(pitch) = pair.into_inner().next() {
                        bass = Some(PitchClass::try_from(pitch.as_str())?);
                    }
                }
                _ => {}
            }
        }
        let root = root.ok_or_else(|| format!("invalid chord '{}' - missing root", s))?;
        let intervals = quality_intervals(quality)
            .ok_or_else(|| format!("invalid chord '{}' - unknown quality '{}'", s, quality))?;
        Ok(Self {
            root,
            quality: quality.to_string(),
            intervals: intervals.clone(),
            bass,
        })
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.root, self.quality)?;
        if let Some(bass) = self.bass {
            write!(f, "/{}", bass)?;
        }
        Ok(())
    }
}

// --------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chord_string() -> Result<(), String> {
        assert!(Chord::try_from("").is_err());
        assert!(Chord::try_from("H7").is_err());
        assert!(Chord::try_from("Cqwe").is_err());
        assert!(Chord::try_from("C/").is_err());

        let c = Chord::try_from("C")?;
        assert_eq!(c.root(), PitchClass::C);
        assert_eq!(c.intervals(), &[0, 4, 7]);
        assert!(!c.is_minor());

        let ebm7 = Chord::try_from("Ebm7")?;
        assert_eq!(ebm7.root(), PitchClass::Ds);
        assert_eq!(ebm7.intervals(), &[0, 3, 7, 10]);
        assert!(ebm7.is_minor());

        assert_eq!(Chord::try_from("F# minor")?.intervals(), &[0, 3, 7]);
        assert_eq!(Chord::try_from("A Minor")?.intervals(), &[0, 3, 7]);
        assert_eq!(Chord::try_from("CM7")?.intervals(), &[0, 4, 7, 11]);
        assert_eq!(Chord::try_from("Cm7")?.intervals(), &[0, 3, 7, 10]);

        let slash = Chord::try_from("G7/B")?;
        assert_eq!(slash.bass(), Some(PitchClass::B));
        assert_eq!(slash.to_string(), "G7/B");
        Ok(())
    }

    #[test]
    fn chord_transpose() -> Result<(), String> {
        let chord = Chord::try_from("Am7/G")?.transposed(3);
        assert_eq!(chord.to_string(), "Cm7/A#");
        assert_eq!(
            chord.pitch_classes(),
            vec![PitchClass::C, PitchClass::Ds, PitchClass::G, PitchClass::As]
        );
        Ok(())
    }

    #[test]
    fn conform() -> Result<(), String> {
        let c_major = Chord::try_from("C")?;
        // chord tones stay where they are
        for name in ["C4", "E2", "G7"] {
            let note = Note::try_from(name)?;
            assert_eq!(c_major.conform(&note), note);
        }
        assert_eq!(c_major.conform(&Note::try_from("F4")?), Note::try_from("E4")?);
        assert_eq!(c_major.conform(&Note::try_from("A4")?), Note::try_from("G4")?);
        assert_eq!(c_major.conform(&Note::try_from("B3")?), Note::try_from("C4")?);
        // D is equally far away from C and E: prefer down
        assert_eq!(c_major.conform(&Note::try_from("D4")?), Note::try_from("C4")?);
        assert_eq!(c_major.conform_shift(&Note::try_from("D4")?), -2);

        let f_sharp_minor = Chord::try_from("F#m")?;
        assert_eq!(f_sharp_minor.conform(&Note::try_from("C5")?), Note::try_from("C#5")?);
        assert_eq!(f_sharp_minor.conform(&Note::try_from("G3")?), Note::try_from("F#3")?);
        Ok(())
    }
}
