use log::{debug, warn};

use super::{CraftContext, CraftKind, Selection};
use crate::{
    bag::MarbleBag,
    error::{CraftError, Result},
    key::Key,
    model::{
        ContentRef, ContentState, Program, ProgramId, ProgramSequence, ProgramSequenceBinding,
        ProgramSequenceId,
    },
    scorer::{score_candidate, CandidateScores, ScoreFactors},
    source::ContentSource,
};

// -------------------------------------------------------------------------------------------------

/// Choose a fresh program of the given kind: the best scored of all allowed programs. Programs
/// in `avoid` are only chosen when there is no other allowed program. In pivot segments, the
/// previous segment's program of the same kind gets the continuity bonus.
pub(super) fn choose_program<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
    kind: CraftKind,
    avoid: Option<ProgramId>,
) -> Selection<ProgramId> {
    let source = context.source;
    let candidates = source
        .programs_of_type(kind.program_type())
        .into_iter()
        .filter(|program| {
            context
                .memes
                .is_allowed(source.memes(ContentRef::Program(program.id)))
        })
        .collect::<Vec<_>>();
    let preferred = if candidates.iter().any(|program| Some(program.id) != avoid) {
        candidates
            .into_iter()
            .filter(|program| Some(program.id) != avoid)
            .collect()
    } else {
        candidates
    };
    if preferred.is_empty() {
        return Selection::Skipped(format!("No allowed {} programs", kind.program_type()));
    }
    let entropy = context.config.entropy.program(kind);
    let mut scores = CandidateScores::new();
    for program in preferred {
        let content = ContentRef::Program(program.id);
        let factors = ScoreFactors {
            meme_score: context.memes.score(source.memes(content)),
            directly_bound: source.is_directly_bound(content),
            draft: program.state == ContentState::Draft,
            continuity: context
                .continuity
                .is_program_continued(kind.program_type(), program.id),
        };
        let weights = &context.config.weights;
        let score = score_candidate(&factors, entropy, weights, &mut *context.rng);
        scores.add(program.id, score);
    }
    debug!("{} program scores: {}", kind, scores);
    match scores.top() {
        Some(id) => Selection::Chosen(id),
        None => Selection::Skipped(format!("No scorable {} programs", kind.program_type())),
    }
}

/// Look up a program, failing with a missing content error when it vanished from the library.
pub(super) fn require_program<'s, S: ContentSource + ?Sized>(
    context: &CraftContext<'s, S>,
    kind: CraftKind,
    id: ProgramId,
) -> Result<&'s Program> {
    context
        .source
        .program(id)
        .ok_or_else(|| CraftError::MissingContent {
            kind: kind.to_string(),
            reason: format!("Program {} does not exist", id),
        })
}

/// Choose one of the program's sequence bindings at the given offset. Bindings which are bound
/// directly to the chain are preferred.
pub(super) fn choose_binding<'s, S: ContentSource + ?Sized>(
    context: &mut CraftContext<'s, S>,
    program_id: ProgramId,
    offset: u32,
) -> Option<&'s ProgramSequenceBinding> {
    let source = context.source;
    let bindings = source
        .sequence_bindings(program_id)
        .into_iter()
        .filter(|binding| binding.offset == offset)
        .collect::<Vec<_>>();
    let mut bag = MarbleBag::new();
    for binding in &bindings {
        if source.is_directly_bound(ContentRef::ProgramSequenceBinding(binding.id)) {
            bag.add(0, binding.id, 1);
        }
        bag.add(1, binding.id, 1);
    }
    let id = bag.pick(&mut *context.rng).ok()?;
    bindings.into_iter().find(|binding| binding.id == id)
}

/// Does the program have a sequence binding at the given offset?
pub(super) fn has_binding_at<S: ContentSource + ?Sized>(
    source: &S,
    program_id: ProgramId,
    offset: u32,
) -> bool {
    source
        .sequence_bindings(program_id)
        .iter()
        .any(|binding| binding.offset == offset)
}

/// Choose one of the program's sequences, all with equal probability.
pub(super) fn choose_sequence<'s, S: ContentSource + ?Sized>(
    context: &mut CraftContext<'s, S>,
    program_id: ProgramId,
) -> Option<&'s ProgramSequence> {
    let source = context.source;
    let sequences = source.sequences(program_id);
    let mut bag = MarbleBag::new();
    for sequence in &sequences {
        bag.add(1, sequence.id, 1);
    }
    let id = bag.pick(&mut *context.rng).ok()?;
    sequences.into_iter().find(|sequence| sequence.id == id)
}

/// Key of a sequence, falling back to its program's key when the sequence has none.
pub(super) fn sequence_key<S: ContentSource + ?Sized>(
    source: &S,
    program: &Program,
    sequence_id: Option<ProgramSequenceId>,
) -> Option<Key> {
    let sequence_key = sequence_id
        .and_then(|id| source.sequence(id))
        .map(|sequence| sequence.key.trim())
        .filter(|key| !key.is_empty());
    parse_key(sequence_key.unwrap_or(program.key.as_str()))
}

/// Parse an authored key. Malformed keys are treated as missing.
pub(super) fn parse_key(key: &str) -> Option<Key> {
    if key.trim().is_empty() {
        return None;
    }
    match Key::try_from(key) {
        Ok(key) => Some(key),
        Err(err) => {
            warn!("Ignoring malformed key: {}", err);
            None
        }
    }
}

/// Memes of a program and of its chosen sequence binding.
pub(super) fn program_memes<S: ContentSource + ?Sized>(
    source: &S,
    program_id: ProgramId,
    binding: Option<&ProgramSequenceBinding>,
) -> Vec<String> {
    let mut memes = source.memes(ContentRef::Program(program_id));
    if let Some(binding) = binding {
        memes.extend(source.memes(ContentRef::ProgramSequenceBinding(binding.id)));
    }
    memes
}
