use log::{debug, warn};
use serde_json::json;

use super::{pick::pick_voice, CraftContext, CraftKind, Selection};
use crate::{
    error::{CraftError, Result},
    model::{
        ContentRef, ContentState, Instrument, ProgramVoice, SegmentChoice,
        SegmentChoiceArrangement,
    },
    scorer::{score_candidate, CandidateScores, ScoreFactors},
    source::ContentSource,
};

// -------------------------------------------------------------------------------------------------

/// Arrange all voices of the choice's program: choose an instrument for each voice and pick
/// the audio for each of the voice's events.
///
/// Voices without any allowed instrument are skipped and reported. When the kind is mandatory,
/// a skipped voice fails the whole pass.
pub(super) fn arrange_voices<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
    kind: CraftKind,
    choice: &SegmentChoice,
) -> Result<()> {
    let source = context.source;
    for voice in source.voices(choice.program_id) {
        match choose_instrument(context, kind, voice) {
            Selection::Chosen(instrument) => {
                debug!(
                    "Arranging {} voice '{}' with instrument '{}'",
                    kind, voice.name, instrument.name
                );
                let arrangement = SegmentChoiceArrangement::new(choice, voice.id, instrument.id);
                context.work.arrangements.push(arrangement.clone());
                pick_voice(context, kind, choice, &arrangement, voice, instrument)?;
            }
            Selection::Skipped(reason) => {
                warn!("Skipping {} voice '{}': {}", kind, voice.name, reason);
                context.report(
                    "missing_content",
                    json!({
                        "segment": *context.segment.id,
                        "kind": kind,
                        "voice": voice.name,
                        "reason": reason,
                    }),
                );
                if context.config.is_mandatory(kind) {
                    return Err(CraftError::MissingContent {
                        kind: kind.to_string(),
                        reason,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Choose the best scored allowed instrument of the voice's instrument type. Instruments which
/// played the same voice before get the continuity bonus.
fn choose_instrument<'s, S: ContentSource + ?Sized>(
    context: &mut CraftContext<'s, S>,
    kind: CraftKind,
    voice: &ProgramVoice,
) -> Selection<&'s Instrument> {
    let source = context.source;
    let candidates = source
        .instruments_of_type(voice.instrument_type)
        .into_iter()
        .filter(|instrument| {
            context
                .memes
                .is_allowed(source.memes(ContentRef::Instrument(instrument.id)))
        })
        .collect::<Vec<_>>();
    if candidates.is_empty() {
        return Selection::Skipped(format!(
            "No allowed {} instruments for voice '{}'",
            voice.instrument_type, voice.name
        ));
    }
    let entropy = context.config.entropy.instrument;
    let mut scores = CandidateScores::new();
    for instrument in &candidates {
        let content = ContentRef::Instrument(instrument.id);
        let factors = ScoreFactors {
            meme_score: context.memes.score(source.memes(content)),
            directly_bound: source.is_directly_bound(content),
            draft: instrument.state == ContentState::Draft,
            continuity: context.continuity.is_continued(
                kind.program_type(),
                &voice.name,
                instrument.id,
            ),
        };
        let weights = &context.config.weights;
        let score = score_candidate(&factors, entropy, weights, &mut *context.rng);
        scores.add(instrument.id, score);
    }
    debug!("Instrument scores for voice '{}': {}", voice.name, scores);
    scores
        .top()
        .and_then(|id| candidates.into_iter().find(|instrument| instrument.id == id))
        .map_or_else(
            || Selection::Skipped(format!("No scorable instruments for '{}'", voice.name)),
            Selection::Chosen,
        )
}
