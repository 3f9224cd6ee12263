use log::{debug, warn};
use serde_json::json;

use super::{CraftContext, CraftKind};
use crate::{
    bag::MarbleBag,
    error::{CraftError, Result},
    isometry::Isometry,
    model::{
        beats_to_seconds, Instrument, InstrumentAudio, ProgramSequencePatternEvent, ProgramVoice,
        SegmentChoice, SegmentChoiceArrangement, SegmentChoiceArrangementPick,
        SegmentChoiceArrangementPickId,
    },
    note::{Note, NoteRange, PitchClass},
    source::ContentSource,
};

// -------------------------------------------------------------------------------------------------

/// Tones of picks which have no pitch.
pub const ATONAL: &str = "X";

/// Pick audio for all events of one of the voice's patterns. The pattern is repeated until it
/// fills the segment; events which would start after the segment's end are dropped.
pub(super) fn pick_voice<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
    kind: CraftKind,
    choice: &SegmentChoice,
    arrangement: &SegmentChoiceArrangement,
    voice: &ProgramVoice,
    instrument: &Instrument,
) -> Result<()> {
    let source = context.source;
    let Some(sequence_id) = choice.program_sequence_id else {
        return Ok(());
    };
    let patterns = source.patterns(sequence_id, voice.id);
    let mut bag = MarbleBag::new();
    for pattern in &patterns {
        bag.add(1, pattern.id, 1);
    }
    let Some(pattern) = bag
        .pick(&mut *context.rng)
        .ok()
        .and_then(|id| patterns.into_iter().find(|pattern| pattern.id == id))
    else {
        debug!("No {} patterns for voice '{}'", kind, voice.name);
        return Ok(());
    };

    let audios = source.audios(instrument.id);
    if audios.is_empty() {
        let reason = format!("Instrument '{}' has no audio", instrument.name);
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
        return Ok(());
    }
    let range = NoteRange::from_notes(
        audios
            .iter()
            .filter_map(|audio| Note::try_from(audio.tones.as_str()).ok()),
    );

    let segment_total = context.segment.total as f64;
    let pattern_total = if pattern.total > 0 {
        pattern.total as f64
    } else {
        segment_total
    };
    if pattern_total <= 0.0 {
        return Ok(());
    }
    let events = source.events(pattern.id);
    let repeats = (segment_total / pattern_total).ceil() as u32;
    for repeat in 0..repeats {
        for event in &events {
            if event.position < 0.0 || event.position >= pattern_total {
                continue;
            }
            let beat = repeat as f64 * pattern_total + event.position;
            if beat >= segment_total {
                continue;
            }
            let audio = choose_audio(context, arrangement, event, &audios)?;
            let note = if instrument.instrument_type.is_percussive() {
                percussive_note(context, audio, beat)
            } else {
                pitched_note(context, choice, event, &range, beat)
            };
            let tempo = context.segment.tempo;
            let pick = SegmentChoiceArrangementPick {
                id: SegmentChoiceArrangementPickId::unique(),
                segment_id: context.segment.id,
                segment_choice_arrangement_id: arrangement.id,
                instrument_audio_id: audio.id,
                program_sequence_pattern_event_id: event.id,
                event: event.name.clone(),
                start: beats_to_seconds(beat, tempo),
                length: beats_to_seconds(event.duration, tempo),
                amplitude: event.velocity * audio.volume * instrument.volume,
                tones: note.map_or_else(|| ATONAL.to_string(), |note| note.to_string()),
                pitch: note.map_or(0.0, |note| note.frequency()),
            };
            context.work.picks.push(pick);
        }
    }
    Ok(())
}

/// Choose the audio which plays an event. Audios with a similar event name are strongly
/// preferred, all other audios are fallbacks. The choice is kept for all events of the same
/// name in the same arrangement.
fn choose_audio<'s, S: ContentSource + ?Sized>(
    context: &mut CraftContext<'s, S>,
    arrangement: &SegmentChoiceArrangement,
    event: &ProgramSequencePatternEvent,
    audios: &[&'s InstrumentAudio],
) -> Result<&'s InstrumentAudio> {
    let cache_key = (arrangement.id, event.name.trim().to_uppercase());
    if let Some(id) = context.audio_cache.get(&cache_key) {
        if let Some(audio) = audios.iter().find(|audio| audio.id == *id) {
            return Ok(*audio);
        }
    }
    let isometry = Isometry::of_event(&event.name);
    let mut bag = MarbleBag::new();
    for audio in audios {
        let similarity = isometry.score_event(&audio.event);
        if similarity > 0.0 {
            let weight = (similarity * context.config.event_match_weight as f64).round();
            bag.add(0, audio.id, weight.max(1.0) as u32);
        }
        bag.add(1, audio.id, 1);
    }
    let id = bag.pick(&mut *context.rng)?;
    let audio = audios
        .iter()
        .find(|audio| audio.id == id)
        .copied()
        .ok_or(CraftError::NoCandidates)?;
    debug!("Event '{}' plays audio '{}'", event.name, audio.name);
    context.audio_cache.insert(cache_key, id);
    Ok(audio)
}

/// The note of a pitched event: the event's note transposed along with its program, conformed
/// to the chord at the event's beat and moved into the instrument's range.
fn pitched_note<S: ContentSource + ?Sized>(
    context: &CraftContext<S>,
    choice: &SegmentChoice,
    event: &ProgramSequencePatternEvent,
    range: &NoteRange,
    beat: f64,
) -> Option<Note> {
    let tones = event.tones.trim();
    if tones.is_empty() || tones.eq_ignore_ascii_case(ATONAL) {
        return None;
    }
    let note = match Note::try_from(tones) {
        Ok(note) => note.shifted(choice.transpose),
        Err(_) => match PitchClass::try_from(tones) {
            Ok(pitch_class) => range.nearest_to_median(pitch_class.shifted(choice.transpose)),
            Err(err) => {
                warn!("Ignoring tones of event '{}': {}", event.name, err);
                return None;
            }
        },
    };
    let note = match context.chord_at(beat) {
        Some(chord) => chord.conform(&note),
        None => note,
    };
    Some(range.to_available_octave(note))
}

/// The note of a percussive pick: the audio's own note, moved by the fewest semitones onto the
/// chord at the event's beat. Unpitched audio stays unpitched.
fn percussive_note<S: ContentSource + ?Sized>(
    context: &CraftContext<S>,
    audio: &InstrumentAudio,
    beat: f64,
) -> Option<Note> {
    let note = Note::try_from(audio.tones.as_str()).ok()?;
    match context.chord_at(beat) {
        Some(chord) => Some(chord.conform(&note)),
        None => Some(note),
    }
}
