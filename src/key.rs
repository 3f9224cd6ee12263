//! Musical keys: a tonic pitch class and a major or minor mode.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{chord::Chord, note::PitchClass};

// -------------------------------------------------------------------------------------------------

/// Mode of a [`Key`].
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum KeyMode {
    #[default]
    Major,
    Minor,
}

impl Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "Major"),
            Self::Minor => write!(f, "Minor"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Musical key of a program, sequence or segment.
///
/// Keys are written like chord symbols: `C`, `C major`, `Ebm`, `F# Minor`. Any chord quality
/// with a minor third and no major third results in a minor key.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct Key {
    pub root: PitchClass,
    pub mode: KeyMode,
}

impl Key {
    pub fn new(root: PitchClass, mode: KeyMode) -> Self {
        Self { root, mode }
    }

    /// Shortest signed semitone distance from this key's tonic to the other key's tonic.
    pub fn delta(&self, other: &Key) -> i32 {
        self.root.delta(other.root)
    }

    /// Return a new key with the tonic transposed by the given amount of semitones.
    #[must_use]
    pub fn transposed(&self, semitones: i32) -> Self {
        Self::new(self.root.shifted(semitones), self.mode)
    }
}

impl TryFrom<&str> for Key {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, String> {
        let chord = Chord::try_from(s).map_err(|err| format!("invalid key '{}': {}", s, err))?;
        let mode = if chord.is_minor() {
            KeyMode::Minor
        } else {
            KeyMode::Major
        };
        Ok(Self::new(chord.root(), mode))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.root, self.mode)
    }
}

// -------------------------------------------------------------------------------------------------
