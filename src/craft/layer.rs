use log::debug;

use super::{
    arrangement::arrange_voices,
    program::{choose_program, choose_sequence, program_memes, sequence_key},
    CraftContext, CraftKind, Selection,
};
use crate::{
    error::Result,
    model::{SegmentChoice, SegmentType},
    source::ContentSource,
};

// -------------------------------------------------------------------------------------------------

/// Craft a rhythm or detail program choice, which plays along the macro and main programs.
///
/// Segments which continue the main program also continue the previous segment's program of
/// the same kind, without scoring any candidates. All other segments choose a fresh program,
/// where pivot segments favor the previous segment's program with the continuity bonus.
pub(super) fn craft_layer<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
    kind: CraftKind,
) -> Result<Selection<SegmentChoice>> {
    let source = context.source;
    let program_type = kind.program_type();
    let previous = context
        .retrospective
        .previous_choice_of_type(program_type)
        .filter(|_| context.segment.segment_type == SegmentType::Continue)
        .filter(|previous| source.program(previous.program_id).is_some())
        .cloned();

    let mut choice = match previous {
        Some(previous) => {
            debug!(
                "Continuing {} program {} of the previous segment",
                kind, previous.program_id
            );
            let mut choice =
                SegmentChoice::new(context.segment.id, previous.program_id, program_type);
            choice.program_sequence_id = previous.program_sequence_id;
            choice.transpose = previous.transpose;
            choice.delta_in = None;
            choice
        }
        None => match choose_program(context, kind, None) {
            Selection::Chosen(program_id) => {
                let mut choice = SegmentChoice::new(context.segment.id, program_id, program_type);
                choice.transpose = layer_transpose(context, &choice, kind);
                choice
            }
            Selection::Skipped(reason) => return Ok(Selection::Skipped(reason)),
        },
    };
    if choice.program_sequence_id.is_none() {
        match choose_sequence(context, choice.program_id) {
            Some(sequence) => choice.program_sequence_id = Some(sequence.id),
            None => {
                return Ok(Selection::Skipped(format!(
                    "{} program {} has no sequences",
                    kind, choice.program_id
                )))
            }
        }
    }

    context.add_memes(program_memes(source, choice.program_id, None));
    context.work.choices.push(choice.clone());
    arrange_voices(context, kind, &choice)?;
    Ok(Selection::Chosen(choice))
}

/// Rhythm programs are unpitched and never get transposed. Detail programs are transposed from
/// their own key into the segment's key.
fn layer_transpose<S: ContentSource + ?Sized>(
    context: &CraftContext<S>,
    choice: &SegmentChoice,
    kind: CraftKind,
) -> i32 {
    if kind == CraftKind::Rhythm {
        return 0;
    }
    let program_key = context
        .source
        .program(choice.program_id)
        .and_then(|program| sequence_key(context.source, program, None));
    match (program_key, context.segment.key) {
        (Some(program_key), Some(segment_key)) => program_key.delta(&segment_key),
        _ => 0,
    }
}
