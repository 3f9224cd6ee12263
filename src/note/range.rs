use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{Note, PitchClass};

// -------------------------------------------------------------------------------------------------

/// Maximum number of single octave shifts `to_available_octave` tries before giving up.
pub const MAX_OCTAVE_SHIFTS: usize = 8;

/// Octave that's used for pitch classes when there's no range to orientate at.
pub const DEFAULT_OCTAVE: i32 = 4;

// -------------------------------------------------------------------------------------------------

/// An inclusive range of notes, e.g. the natural range of an instrument or voice.
///
/// A range starts empty and grows via `expand`. Empty ranges accept everything.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct NoteRange {
    low: Option<Note>,
    high: Option<Note>,
}

impl NoteRange {
    pub fn new(low: Note, high: Note) -> Self {
        Self {
            low: Some(low.min(high)),
            high: Some(low.max(high)),
        }
    }

    /// Create a range which spans all the given notes.
    pub fn from_notes<I: IntoIterator<Item = Note>>(notes: I) -> Self {
        let mut range = Self::default();
        for note in notes {
            range.expand(note);
        }
        range
    }

    pub fn low(&self) -> Option<Note> {
        self.low
    }

    pub fn high(&self) -> Option<Note> {
        self.high
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_none() || self.high.is_none()
    }

    /// Grow the range so that it includes the given note.
    pub fn expand(&mut self, note: Note) {
        self.low = Some(self.low.map_or(note, |low| low.min(note)));
        self.high = Some(self.high.map_or(note, |high| high.max(note)));
    }

    pub fn contains(&self, note: &Note) -> bool {
        match (self.low, self.high) {
            (Some(low), Some(high)) => low <= *note && *note <= high,
            _ => false,
        }
    }

    /// Width of the range in semitones, 0 for empty ranges.
    pub fn delta_semitones(&self) -> i32 {
        match (self.low, self.high) {
            (Some(low), Some(high)) => low.delta(&high),
            _ => 0,
        }
    }

    /// Note in the middle of the range, rounded down.
    pub fn median(&self) -> Option<Note> {
        match (self.low, self.high) {
            (Some(low), Some(high)) => Some(Note::from_semitones(
                (low.semitones() + high.semitones()).div_euclid(2),
            )),
            _ => None,
        }
    }

    /// Return a new range moved by the given amount of semitones.
    #[must_use]
    pub fn shifted(&self, semitones: i32) -> Self {
        Self {
            low: self.low.map(|note| note.shifted(semitones)),
            high: self.high.map(|note| note.shifted(semitones)),
        }
    }

    /// Move the given note by whole octaves until it fits into the range.
    ///
    /// Notes which already are in range, or any note when the range is empty, are returned
    /// unchanged. When no octave of the note's pitch class can be reached within
    /// [`MAX_OCTAVE_SHIFTS`] attempts (e.g. ranges narrower than an octave), the note with the
    /// same pitch class closest to the nearest range bound is returned.
    pub fn to_available_octave(&self, note: Note) -> Note {
        let (Some(low), Some(high)) = (self.low, self.high) else {
            return note;
        };
        let mut shifted = note;
        for _ in 0..MAX_OCTAVE_SHIFTS {
            if shifted < low {
                shifted = shifted.shifted_octave(1);
            } else if shifted > high {
                shifted = shifted.shifted_octave(-1);
            } else {
                return shifted;
            }
        }
        if shifted >= low && shifted <= high {
            return shifted;
        }
        let bound = if (shifted.delta(&low)).abs() <= (shifted.delta(&high)).abs() {
            low
        } else {
            high
        };
        bound.nearest_with_pitch_class(note.pitch_class)
    }

    /// The note of the given pitch class which is closest to the range's median.
    /// Falls back to [`DEFAULT_OCTAVE`] when the range is empty.
    pub fn nearest_to_median(&self, pitch_class: PitchClass) -> Note {
        match self.median() {
            Some(median) => median.nearest_with_pitch_class(pitch_class),
            None => Note::new(pitch_class, DEFAULT_OCTAVE),
        }
    }
}

impl Display for NoteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.low, self.high) {
            (Some(low), Some(high)) => write!(f, "{}-{}", low, high),
            _ => write!(f, "---"),
        }
    }
}

// --------------------------------------------------------------------------------------------------
