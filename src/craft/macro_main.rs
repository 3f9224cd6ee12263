use log::{debug, info, warn};

use super::{
    arrangement::arrange_voices,
    program::{
        choose_binding, choose_program, has_binding_at, program_memes, require_program,
        sequence_key,
    },
    CraftContext, CraftKind, Selection,
};
use crate::{
    chord::Chord,
    error::Result,
    model::{ProgramId, ProgramType, SegmentChoice, SegmentChord, SegmentType},
    source::ContentSource,
};

// -------------------------------------------------------------------------------------------------

/// Decide how the segment relates to its predecessor: it continues the previous main program
/// when the main program has a next sequence binding, else advances the previous macro program
/// when the macro program has a next binding, else starts with a new macro program.
pub(super) fn decide_segment_type<S: ContentSource + ?Sized>(
    context: &CraftContext<S>,
) -> SegmentType {
    if context.segment.is_initial() {
        return SegmentType::Initial;
    }
    let retrospective = &context.retrospective;
    if retrospective.previous_segment().is_none() {
        return SegmentType::NextMacro;
    }
    let source = context.source;
    let has_next_binding = |program_type: ProgramType| {
        retrospective
            .previous_choice_of_type(program_type)
            .and_then(|choice| Some((choice.program_id, binding_offset(source, choice)?)))
            .is_some_and(|(program_id, offset)| has_binding_at(source, program_id, offset + 1))
    };
    if has_next_binding(ProgramType::Main) {
        SegmentType::Continue
    } else if has_next_binding(ProgramType::Macro) {
        SegmentType::NextMain
    } else {
        SegmentType::NextMacro
    }
}

/// Offset of the sequence binding a choice was bound to.
fn binding_offset<S: ContentSource + ?Sized>(source: &S, choice: &SegmentChoice) -> Option<u32> {
    let binding_id = choice.program_sequence_binding_id?;
    source
        .sequence_bindings(choice.program_id)
        .into_iter()
        .find(|binding| binding.id == binding_id)
        .map(|binding| binding.offset)
}

/// Offset of a program's first sequence binding.
fn first_binding_offset<S: ContentSource + ?Sized>(source: &S, program_id: ProgramId) -> u32 {
    source
        .sequence_bindings(program_id)
        .first()
        .map_or(0, |binding| binding.offset)
}

/// Create a choice of the given program, bound to one of its sequence bindings at `offset`.
/// Memes of the program and binding are added to the segment.
fn bound_choice<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
    kind: CraftKind,
    program_id: ProgramId,
    offset: u32,
) -> Result<Selection<SegmentChoice>> {
    let program = require_program(context, kind, program_id)?;
    let Some(binding) = choose_binding(context, program.id, offset) else {
        return Ok(Selection::Skipped(format!(
            "{} program '{}' has no sequence binding at offset {}",
            kind, program.name, offset
        )));
    };
    let mut choice = SegmentChoice::new(context.segment.id, program.id, program.program_type);
    choice.program_sequence_binding_id = Some(binding.id);
    choice.program_sequence_id = Some(binding.program_sequence_id);
    let memes = program_memes(context.source, program.id, Some(binding));
    context.add_memes(memes);
    debug!(
        "Chose {} program '{}' with binding at offset {}",
        kind, program.name, offset
    );
    Ok(Selection::Chosen(choice))
}

/// Mark a choice as continued from the previous segment's choice.
fn continued(mut choice: SegmentChoice, previous: &SegmentChoice) -> SegmentChoice {
    choice.transpose = previous.transpose;
    choice.delta_in = None;
    choice
}

// -------------------------------------------------------------------------------------------------

/// Craft the macro program choice. Also decides the segment's type, which all following
/// passes depend on.
pub(super) fn craft_macro<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
) -> Result<Selection<SegmentChoice>> {
    let kind = CraftKind::Macro;
    let segment_type = decide_segment_type(context);
    context.set_segment_type(segment_type);
    info!(
        "Segment {} at offset {} is of type {}",
        context.segment.id, context.segment.offset, segment_type
    );

    let source = context.source;
    let previous = context
        .retrospective
        .previous_choice_of_type(ProgramType::Macro)
        .cloned();
    let selection = match (segment_type, previous) {
        (SegmentType::Continue, Some(previous)) => {
            let offset = binding_offset(source, &previous).unwrap_or(0);
            match bound_choice(context, kind, previous.program_id, offset)? {
                Selection::Chosen(choice) => Selection::Chosen(continued(choice, &previous)),
                skipped => skipped,
            }
        }
        (SegmentType::NextMain, Some(previous)) => {
            let offset = binding_offset(source, &previous).map_or(0, |offset| offset + 1);
            match bound_choice(context, kind, previous.program_id, offset)? {
                Selection::Chosen(choice) => Selection::Chosen(continued(choice, &previous)),
                skipped => skipped,
            }
        }
        (_, previous) => {
            let avoid = previous.map(|previous| previous.program_id);
            match choose_program(context, kind, avoid) {
                Selection::Chosen(program_id) => {
                    let offset = first_binding_offset(source, program_id);
                    bound_choice(context, kind, program_id, offset)?
                }
                Selection::Skipped(reason) => Selection::Skipped(reason),
            }
        }
    };
    let Selection::Chosen(choice) = selection else {
        return Ok(selection);
    };
    context.work.choices.push(choice.clone());
    arrange_voices(context, kind, &choice)?;
    Ok(Selection::Chosen(choice))
}

// -------------------------------------------------------------------------------------------------

/// Craft the main program choice, and derive the segment's key, length, density, tempo and
/// chords from it.
pub(super) fn craft_main<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
) -> Result<Selection<SegmentChoice>> {
    let kind = CraftKind::Main;
    if context.segment.segment_type == SegmentType::Pending {
        // the macro pass got skipped
        let segment_type = decide_segment_type(context);
        context.set_segment_type(segment_type);
    }
    let segment_type = context.segment.segment_type;

    let source = context.source;
    let previous = context
        .retrospective
        .previous_choice_of_type(ProgramType::Main)
        .cloned();
    let selection = match (segment_type, previous) {
        (SegmentType::Continue, Some(previous)) => {
            let offset = binding_offset(source, &previous).map_or(0, |offset| offset + 1);
            match bound_choice(context, kind, previous.program_id, offset)? {
                Selection::Chosen(choice) => Selection::Chosen(continued(choice, &previous)),
                skipped => skipped,
            }
        }
        (_, previous) => {
            let avoid = previous
                .filter(|_| segment_type.is_pivot())
                .map(|previous| previous.program_id);
            match choose_program(context, kind, avoid) {
                Selection::Chosen(program_id) => {
                    let offset = first_binding_offset(source, program_id);
                    match bound_choice(context, kind, program_id, offset)? {
                        Selection::Chosen(mut choice) => {
                            choice.transpose = main_transpose(context, &choice)?;
                            Selection::Chosen(choice)
                        }
                        skipped => skipped,
                    }
                }
                Selection::Skipped(reason) => Selection::Skipped(reason),
            }
        }
    };
    let Selection::Chosen(choice) = selection else {
        return Ok(selection);
    };
    context.work.choices.push(choice.clone());
    derive_segment(context, &choice)?;
    arrange_voices(context, kind, &choice)?;
    Ok(Selection::Chosen(choice))
}

/// Transposition which moves a fresh main sequence into the key of the macro sequence.
fn main_transpose<S: ContentSource + ?Sized>(
    context: &CraftContext<S>,
    choice: &SegmentChoice,
) -> Result<i32> {
    let source = context.source;
    let Some(macro_choice) = context.work.choice_of_type(ProgramType::Macro) else {
        return Ok(0);
    };
    let macro_program = require_program(context, CraftKind::Macro, macro_choice.program_id)?;
    let main_program = require_program(context, CraftKind::Main, choice.program_id)?;
    let macro_key = sequence_key(source, macro_program, macro_choice.program_sequence_id)
        .map(|key| key.transposed(macro_choice.transpose));
    let main_key = sequence_key(source, main_program, choice.program_sequence_id);
    match (main_key, macro_key) {
        (Some(main_key), Some(macro_key)) => Ok(main_key.delta(&macro_key)),
        _ => Ok(0),
    }
}

/// Apply the main choice's musical properties to the segment.
fn derive_segment<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
    choice: &SegmentChoice,
) -> Result<()> {
    let source = context.source;
    let program = require_program(context, CraftKind::Main, choice.program_id)?;
    let sequence = choice.program_sequence_id.and_then(|id| source.sequence(id));

    let key = sequence_key(source, program, choice.program_sequence_id)
        .map(|key| key.transposed(choice.transpose));
    let total = sequence.map_or(0, |sequence| sequence.total);
    let main_density = sequence.map_or(program.density, |sequence| sequence.density);
    let macro_density = context
        .work
        .choice_of_type(ProgramType::Macro)
        .and_then(|choice| choice.program_sequence_id)
        .and_then(|id| source.sequence(id))
        .map(|sequence| sequence.density);
    let density = match macro_density {
        Some(macro_density) => (macro_density + main_density) / 2.0,
        None => main_density,
    };

    let segment = &mut context.segment;
    segment.key = key;
    segment.density = density.clamp(0.0, 1.0);
    segment.set_length(total, program.tempo);
    segment.storage_key = format!("{}-{}", context.storage_prefix, segment.offset);

    if let Some(sequence) = sequence {
        for sequence_chord in source.chords(sequence.id) {
            match Chord::try_from(sequence_chord.name.as_str()) {
                Ok(chord) => {
                    let chord = chord.transposed(choice.transpose);
                    let name = chord.to_string();
                    context
                        .work
                        .chords
                        .push(SegmentChord::new(segment.id, sequence_chord.position, &name));
                    context.chords.push((sequence_chord.position, chord));
                }
                Err(err) => warn!("Ignoring chord of sequence '{}': {}", sequence.name, err),
            }
        }
    }
    debug!(
        "Segment {} key {} total {} tempo {} density {:.2}",
        segment.id,
        segment
            .key
            .map_or_else(|| "-".to_string(), |key| key.to_string()),
        segment.total,
        segment.tempo,
        segment.density
    );
    Ok(())
}
