use serde::{Deserialize, Serialize};

use super::{
    InstrumentAudioId, InstrumentId, ProgramId, ProgramSequenceBindingId, ProgramSequenceId,
    ProgramSequencePatternEventId, ProgramType, ProgramVoiceId, SegmentChoiceArrangementId,
    SegmentChoiceArrangementPickId, SegmentChoiceId, SegmentChordId, SegmentId, SegmentMemeId,
};

// -------------------------------------------------------------------------------------------------

/// A segment's selection of one program for one program type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChoice {
    pub id: SegmentChoiceId,
    pub segment_id: SegmentId,
    pub program_id: ProgramId,
    pub program_type: ProgramType,
    pub program_sequence_binding_id: Option<ProgramSequenceBindingId>,
    pub program_sequence_id: Option<ProgramSequenceId>,
    /// Semitones the program's events are transposed by.
    pub transpose: i32,
    /// Beat in the segment at which the choice starts playing, None when it's continued from
    /// the previous segment.
    pub delta_in: Option<u32>,
    /// Beat in the segment at which the choice stops playing, None when it plays until the end.
    pub delta_out: Option<u32>,
}

impl SegmentChoice {
    pub fn new(segment_id: SegmentId, program_id: ProgramId, program_type: ProgramType) -> Self {
        Self {
            id: SegmentChoiceId::unique(),
            segment_id,
            program_id,
            program_type,
            program_sequence_binding_id: None,
            program_sequence_id: None,
            transpose: 0,
            delta_in: Some(0),
            delta_out: None,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Binds a choice's program voice to the instrument which plays it in a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChoiceArrangement {
    pub id: SegmentChoiceArrangementId,
    pub segment_id: SegmentId,
    pub segment_choice_id: SegmentChoiceId,
    pub program_voice_id: ProgramVoiceId,
    pub instrument_id: InstrumentId,
}

impl SegmentChoiceArrangement {
    pub fn new(
        choice: &SegmentChoice,
        program_voice_id: ProgramVoiceId,
        instrument_id: InstrumentId,
    ) -> Self {
        Self {
            id: SegmentChoiceArrangementId::unique(),
            segment_id: choice.segment_id,
            segment_choice_id: choice.id,
            program_voice_id,
            instrument_id,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// One concrete audio placement in a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChoiceArrangementPick {
    pub id: SegmentChoiceArrangementPickId,
    pub segment_id: SegmentId,
    pub segment_choice_arrangement_id: SegmentChoiceArrangementId,
    pub instrument_audio_id: InstrumentAudioId,
    pub program_sequence_pattern_event_id: ProgramSequencePatternEventId,
    /// Event name, as authored in the pattern.
    pub event: String,
    /// Start in seconds, relative to the segment's begin.
    pub start: f64,
    /// Length in seconds.
    pub length: f64,
    pub amplitude: f64,
    /// Final note name, or `X` for atonal picks.
    pub tones: String,
    /// Final pitch in Hz, 0 for atonal picks.
    pub pitch: f64,
}

// -------------------------------------------------------------------------------------------------

/// A meme which applies to a whole segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMeme {
    pub id: SegmentMemeId,
    pub segment_id: SegmentId,
    pub name: String,
}

impl SegmentMeme {
    pub fn new(segment_id: SegmentId, name: &str) -> Self {
        Self {
            id: SegmentMemeId::unique(),
            segment_id,
            name: name.to_string(),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// A chord which is active in a segment from the given beat position on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChord {
    pub id: SegmentChordId,
    pub segment_id: SegmentId,
    pub position: f64,
    pub name: String,
}

impl SegmentChord {
    pub fn new(segment_id: SegmentId, position: f64, name: &str) -> Self {
        Self {
            id: SegmentChordId::unique(),
            segment_id,
            position,
            name: name.to_string(),
        }
    }
}
