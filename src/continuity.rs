//! Carries program and instrument choices over segment boundaries.

use crate::{
    model::{InstrumentId, ProgramId, ProgramType, SegmentType},
    retrospective::Retrospective,
    source::ContentSource,
};

// -------------------------------------------------------------------------------------------------

/// Decides which program and instrument candidates get the continuity bonus in a segment.
///
/// In segments which continue the previous main program, an instrument which played the same
/// named voice of the same program type in the previous segment gets the bonus. In pivot
/// segments, voices usually change along with the program, so every instrument of the same
/// program type of the previous segment gets the bonus instead. Freshly chosen programs of
/// pivot segments get the bonus when the previous segment chose them for the same type.
#[derive(Debug, Clone, Default)]
pub struct Continuity {
    segment_type: SegmentType,
    // (program type, program) of the previous segment's choices
    programs: Vec<(ProgramType, ProgramId)>,
    // (program type, voice name, instrument) of the previous segment's arrangements
    previous: Vec<(ProgramType, String, InstrumentId)>,
}

impl Continuity {
    pub fn new<S: ContentSource + ?Sized>(
        segment_type: SegmentType,
        retrospective: &Retrospective,
        source: &S,
    ) -> Self {
        const PROGRAM_TYPES: [ProgramType; 4] = [
            ProgramType::Macro,
            ProgramType::Main,
            ProgramType::Rhythm,
            ProgramType::Detail,
        ];
        let mut programs = Vec::new();
        let mut previous = Vec::new();
        for program_type in PROGRAM_TYPES {
            if let Some(choice) = retrospective.previous_choice_of_type(program_type) {
                programs.push((program_type, choice.program_id));
            }
            for arrangement in retrospective.previous_arrangements_of_type(program_type) {
                let voice_name = source
                    .voice(arrangement.program_voice_id)
                    .map(|voice| voice.name.clone())
                    .unwrap_or_default();
                previous.push((program_type, voice_name, arrangement.instrument_id));
            }
        }
        Self {
            segment_type,
            programs,
            previous,
        }
    }

    /// Should the given program candidate of the given type get the continuity bonus?
    pub fn is_program_continued(&self, program_type: ProgramType, program_id: ProgramId) -> bool {
        match self.segment_type {
            SegmentType::NextMain | SegmentType::NextMacro => self
                .programs
                .contains(&(program_type, program_id)),
            SegmentType::Continue | SegmentType::Initial | SegmentType::Pending => false,
        }
    }

    /// Should the given instrument candidate for the given voice get the continuity bonus?
    pub fn is_continued(
        &self,
        program_type: ProgramType,
        voice_name: &str,
        instrument_id: InstrumentId,
    ) -> bool {
        match self.segment_type {
            SegmentType::Continue => self.previous.iter().any(|(t, name, id)| {
                *t == program_type && *id == instrument_id && name.eq_ignore_ascii_case(voice_name)
            }),
            SegmentType::NextMain | SegmentType::NextMacro => self
                .previous
                .iter()
                .any(|(t, _, id)| *t == program_type && *id == instrument_id),
            SegmentType::Initial | SegmentType::Pending => false,
        }
    }
}

// -------------------------------------------------------------------------------------------------
