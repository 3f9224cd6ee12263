use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{
    InstrumentAudioId, InstrumentId, ProgramId, ProgramSequenceBindingId, ProgramSequenceChordId,
    ProgramSequenceId, ProgramSequencePatternEventId, ProgramSequencePatternId, ProgramVoiceId,
};

// -------------------------------------------------------------------------------------------------

/// Type of a program, which also is the content type a craft pass works on.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum ProgramType {
    Macro,
    Main,
    Rhythm,
    Detail,
}

impl Display for ProgramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Publishing state of programs and instruments.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum ContentState {
    #[default]
    Published,
    Draft,
}

/// Type of an instrument, and of the program voices it can play.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    Percussion,
    Bass,
    Pad,
    Sticky,
    Stripe,
    Stab,
}

impl InstrumentType {
    /// Percussive instruments play their audio's own pitch instead of the event's notes.
    pub fn is_percussive(&self) -> bool {
        matches!(self, Self::Percussion)
    }
}

impl Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// -------------------------------------------------------------------------------------------------

/// Refers to a content entity which can carry memes or be bound directly to a chain.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum ContentRef {
    Program(ProgramId),
    ProgramSequenceBinding(ProgramSequenceBindingId),
    Instrument(InstrumentId),
}

// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub program_type: ProgramType,
    #[serde(default)]
    pub state: ContentState,
    pub key: String,
    /// Beats per minute.
    pub tempo: f64,
    #[serde(default)]
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSequence {
    pub id: ProgramSequenceId,
    pub program_id: ProgramId,
    pub name: String,
    pub key: String,
    /// Length in beats.
    pub total: u32,
    #[serde(default)]
    pub density: f64,
}

/// Places a sequence at an offset of a macro or main program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSequenceBinding {
    pub id: ProgramSequenceBindingId,
    pub program_id: ProgramId,
    pub program_sequence_id: ProgramSequenceId,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSequenceChord {
    pub id: ProgramSequenceChordId,
    pub program_sequence_id: ProgramSequenceId,
    /// Position in beats.
    pub position: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramVoice {
    pub id: ProgramVoiceId,
    pub program_id: ProgramId,
    pub name: String,
    pub instrument_type: InstrumentType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSequencePattern {
    pub id: ProgramSequencePatternId,
    pub program_id: ProgramId,
    pub program_sequence_id: ProgramSequenceId,
    pub program_voice_id: ProgramVoiceId,
    pub name: String,
    /// Length in beats.
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSequencePatternEvent {
    pub id: ProgramSequencePatternEventId,
    pub program_sequence_pattern_id: ProgramSequencePatternId,
    /// Event name, e.g. `KICK` or `LEAD`, matched against instrument audio events.
    pub name: String,
    /// Position in beats, relative to the pattern's start.
    pub position: f64,
    /// Duration in beats.
    pub duration: f64,
    pub velocity: f64,
    /// A note (`C4`), a pitch class (`C`), or `X` for atonal events.
    pub tones: String,
}

// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
    pub instrument_type: InstrumentType,
    #[serde(default)]
    pub state: ContentState,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAudio {
    pub id: InstrumentAudioId,
    pub instrument_id: InstrumentId,
    pub name: String,
    /// Event name this audio plays, matched against pattern event names.
    pub event: String,
    /// The audio's own pitch as note, or `X` when unpitched.
    pub tones: String,
    pub volume: f64,
}
