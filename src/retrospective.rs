//! Read-only view of a chain's already crafted segments.

use crate::{
    model::{
        ProgramType, ProgramVoiceId, Segment, SegmentChoice, SegmentChoiceArrangement,
        SegmentState, SegmentType,
    },
    store::SegmentStore,
};

// -------------------------------------------------------------------------------------------------

/// Snapshot of the segments which precede a segment in its chain, together with their choices
/// and arrangements.
///
/// Only the run of crafted segments which lead up to the segment, back to and including the
/// segment which started their main program, is part of the retrospective. Failed or not yet
/// crafted segments end the run.
#[derive(Debug, Clone, Default)]
pub struct Retrospective {
    offset: u64,
    segments: Vec<Segment>,
    choices: Vec<SegmentChoice>,
    arrangements: Vec<SegmentChoiceArrangement>,
}

impl Retrospective {
    /// Create a retrospective for the given segment from the given store.
    pub fn new<S: SegmentStore + ?Sized>(store: &S, segment: &Segment) -> Self {
        let mut segments = Vec::new();
        let mut choices = Vec::new();
        let mut main_program = None;
        for offset in (0..segment.offset).rev() {
            let Some(other) = store
                .segment_at(segment.chain_id, offset)
                .filter(|other| {
                    matches!(
                        other.state(),
                        SegmentState::Crafted | SegmentState::Dubbing | SegmentState::Dubbed
                    )
                })
            else {
                break;
            };
            let other_choices = store.choices_of(other.id);
            let other_main = other_choices
                .iter()
                .find(|choice| choice.program_type == ProgramType::Main)
                .map(|choice| choice.program_id);
            match main_program {
                None => main_program = Some(other_main),
                Some(main) if main != other_main => break,
                Some(_) => (),
            }
            let started_main = other.segment_type != SegmentType::Continue;
            segments.push(other);
            choices.extend(other_choices);
            if started_main {
                break;
            }
        }
        segments.reverse();
        choices.sort_by_key(|choice| choice.id);
        let arrangements = choices
            .iter()
            .flat_map(|choice| store.arrangements_of(choice.id))
            .collect::<Vec<_>>();
        Self {
            offset: segment.offset,
            segments,
            choices,
            arrangements,
        }
    }

    /// All retrospective segments, sorted by offset.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment immediately before the current one, if it got crafted.
    pub fn previous_segment(&self) -> Option<&Segment> {
        self.segments
            .last()
            .filter(|previous| previous.offset + 1 == self.offset)
    }

    /// All choices of all retrospective segments.
    pub fn choices(&self) -> &[SegmentChoice] {
        &self.choices
    }

    /// Choices of the previous segment.
    pub fn previous_choices(&self) -> Vec<&SegmentChoice> {
        match self.previous_segment() {
            Some(previous) => self
                .choices
                .iter()
                .filter(|choice| choice.segment_id == previous.id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// The previous segment's choice of the given program type.
    pub fn previous_choice_of_type(&self, program_type: ProgramType) -> Option<&SegmentChoice> {
        self.previous_choices()
            .into_iter()
            .find(|choice| choice.program_type == program_type)
    }

    /// The most recent choice which arranged the given program voice.
    pub fn previous_choice_of_voice(&self, voice_id: ProgramVoiceId) -> Option<&SegmentChoice> {
        self.choices
            .iter()
            .rev()
            .find(|choice| {
                self.arrangements.iter().any(|arrangement| {
                    arrangement.segment_choice_id == choice.id
                        && arrangement.program_voice_id == voice_id
                })
            })
    }

    /// Arrangements of the previous segment's choice of the given program type.
    pub fn previous_arrangements_of_type(
        &self,
        program_type: ProgramType,
    ) -> Vec<&SegmentChoiceArrangement> {
        match self.previous_choice_of_type(program_type) {
            Some(choice) => self
                .arrangements
                .iter()
                .filter(|arrangement| arrangement.segment_choice_id == choice.id)
                .collect(),
            None => Vec::new(),
        }
    }
}

// -------------------------------------------------------------------------------------------------
