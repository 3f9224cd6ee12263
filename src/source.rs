//! Read-only access to the authored content library.

use std::collections::{HashMap, HashSet};

use anyhow::Context;
use serde::Deserialize;

use crate::model::{
    ContentRef, Instrument, InstrumentAudio, InstrumentId, InstrumentType, Program, ProgramId,
    ProgramSequence, ProgramSequenceBinding, ProgramSequenceChord, ProgramSequenceId,
    ProgramSequencePattern, ProgramSequencePatternEvent, ProgramSequencePatternId, ProgramType,
    ProgramVoice, ProgramVoiceId,
};

// -------------------------------------------------------------------------------------------------

/// Read-only view of the content library, as used by the craft pipeline.
///
/// Lists are returned in a stable order, so crafting with a fixed seed is reproducible.
pub trait ContentSource {
    fn program(&self, id: ProgramId) -> Option<&Program>;
    fn programs_of_type(&self, program_type: ProgramType) -> Vec<&Program>;

    fn voice(&self, id: ProgramVoiceId) -> Option<&ProgramVoice>;
    fn voices(&self, program_id: ProgramId) -> Vec<&ProgramVoice>;

    fn sequence(&self, id: ProgramSequenceId) -> Option<&ProgramSequence>;
    fn sequences(&self, program_id: ProgramId) -> Vec<&ProgramSequence>;
    fn sequence_bindings(&self, program_id: ProgramId) -> Vec<&ProgramSequenceBinding>;
    /// Chords of a sequence, sorted by position.
    fn chords(&self, sequence_id: ProgramSequenceId) -> Vec<&ProgramSequenceChord>;

    /// Patterns of the given voice in the given sequence.
    fn patterns(
        &self,
        sequence_id: ProgramSequenceId,
        voice_id: ProgramVoiceId,
    ) -> Vec<&ProgramSequencePattern>;
    /// Events of a pattern, sorted by position.
    fn events(&self, pattern_id: ProgramSequencePatternId) -> Vec<&ProgramSequencePatternEvent>;

    fn instrument(&self, id: InstrumentId) -> Option<&Instrument>;
    fn instruments_of_type(&self, instrument_type: InstrumentType) -> Vec<&Instrument>;
    fn audios(&self, instrument_id: InstrumentId) -> Vec<&InstrumentAudio>;

    /// Memes of a program, sequence binding or instrument.
    fn memes(&self, content: ContentRef) -> Vec<String>;
    /// Is the content bound directly to the chain which is being fabricated?
    fn is_directly_bound(&self, content: ContentRef) -> bool;
}

// -------------------------------------------------------------------------------------------------

/// A meme attached to a content entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentMeme {
    pub content: ContentRef,
    pub name: String,
}

/// In-memory snapshot of the content library, prefetched before crafting.
///
/// The library is immutable while crafting and can be shared by chains which get fabricated
/// on different threads.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ContentLibrary {
    programs: Vec<Program>,
    voices: Vec<ProgramVoice>,
    sequences: Vec<ProgramSequence>,
    bindings: Vec<ProgramSequenceBinding>,
    chords: Vec<ProgramSequenceChord>,
    patterns: Vec<ProgramSequencePattern>,
    events: Vec<ProgramSequencePatternEvent>,
    instruments: Vec<Instrument>,
    audios: Vec<InstrumentAudio>,
    #[serde(rename = "memes")]
    meme_list: Vec<ContentMeme>,
    #[serde(rename = "bound")]
    bound_list: Vec<ContentRef>,
    #[serde(skip)]
    memes: HashMap<ContentRef, Vec<String>>,
    #[serde(skip)]
    bound: HashSet<ContentRef>,
}

impl ContentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a library snapshot from JSON, as written by the content ingest.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut library: Self =
            serde_json::from_str(json).context("Failed to parse content library")?;
        for meme in std::mem::take(&mut library.meme_list) {
            library.add_meme(meme.content, &meme.name);
        }
        for content in std::mem::take(&mut library.bound_list) {
            library.bind(content);
        }
        Ok(library)
    }

    pub fn add_program(&mut self, program: Program) {
        self.programs.push(program);
    }

    pub fn add_voice(&mut self, voice: ProgramVoice) {
        self.voices.push(voice);
    }

    pub fn add_sequence(&mut self, sequence: ProgramSequence) {
        self.sequences.push(sequence);
    }

    pub fn add_binding(&mut self, binding: ProgramSequenceBinding) {
        self.bindings.push(binding);
    }

    pub fn add_chord(&mut self, chord: ProgramSequenceChord) {
        self.chords.push(chord);
    }

    pub fn add_pattern(&mut self, pattern: ProgramSequencePattern) {
        self.patterns.push(pattern);
    }

    pub fn add_event(&mut self, event: ProgramSequencePatternEvent) {
        self.events.push(event);
    }

    pub fn add_instrument(&mut self, instrument: Instrument) {
        self.instruments.push(instrument);
    }

    pub fn add_audio(&mut self, audio: InstrumentAudio) {
        self.audios.push(audio);
    }

    /// Attach a meme to a content entity. Duplicate memes are ignored.
    pub fn add_meme(&mut self, content: ContentRef, name: &str) {
        let memes = self.memes.entry(content).or_default();
        if !memes.iter().any(|meme| meme == name) {
            memes.push(name.to_string());
        }
    }

    /// Bind a content entity directly to the chain.
    pub fn bind(&mut self, content: ContentRef) {
        self.bound.insert(content);
    }
}

impl ContentSource for ContentLibrary {
    fn program(&self, id: ProgramId) -> Option<&Program> {
        self.programs.iter().find(|program| program.id == id)
    }

    fn programs_of_type(&self, program_type: ProgramType) -> Vec<&Program> {
        self.programs
            .iter()
            .filter(|program| program.program_type == program_type)
            .collect()
    }

    fn voice(&self, id: ProgramVoiceId) -> Option<&ProgramVoice> {
        self.voices.iter().find(|voice| voice.id == id)
    }

    fn voices(&self, program_id: ProgramId) -> Vec<&ProgramVoice> {
        self.voices
            .iter()
            .filter(|voice| voice.program_id == program_id)
            .collect()
    }

    fn sequence(&self, id: ProgramSequenceId) -> Option<&ProgramSequence> {
        self.sequences.iter().find(|sequence| sequence.id == id)
    }

    fn sequences(&self, program_id: ProgramId) -> Vec<&ProgramSequence> {
        self.sequences
            .iter()
            .filter(|sequence| sequence.program_id == program_id)
            .collect()
    }

    fn sequence_bindings(&self, program_id: ProgramId) -> Vec<&ProgramSequenceBinding> {
        let mut bindings = self
            .bindings
            .iter()
            .filter(|binding| binding.program_id == program_id)
            .collect::<Vec<_>>();
        bindings.sort_by_key(|binding| binding.offset);
        bindings
    }

    fn chords(&self, sequence_id: ProgramSequenceId) -> Vec<&ProgramSequenceChord> {
        let mut chords = self
            .chords
            .iter()
            .filter(|chord| chord.program_sequence_id == sequence_id)
            .collect::<Vec<_>>();
        chords.sort_by(|a, b| a.position.total_cmp(&b.position));
        chords
    }

    fn patterns(
        &self,
        sequence_id: ProgramSequenceId,
        voice_id: ProgramVoiceId,
    ) -> Vec<&ProgramSequencePattern> {
        self.patterns
            .iter()
            .filter(|pattern| {
                pattern.program_sequence_id == sequence_id && pattern.program_voice_id == voice_id
            })
            .collect()
    }

    fn events(&self, pattern_id: ProgramSequencePatternId) -> Vec<&ProgramSequencePatternEvent> {
        let mut events = self
            .events
            .iter()
            .filter(|event| event.program_sequence_pattern_id == pattern_id)
            .collect::<Vec<_>>();
        events.sort_by(|a, b| a.position.total_cmp(&b.position));
        events
    }

    fn instrument(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|instrument| instrument.id == id)
    }

    fn instruments_of_type(&self, instrument_type: InstrumentType) -> Vec<&Instrument> {
        self.instruments
            .iter()
            .filter(|instrument| instrument.instrument_type == instrument_type)
            .collect()
    }

    fn audios(&self, instrument_id: InstrumentId) -> Vec<&InstrumentAudio> {
        self.audios
            .iter()
            .filter(|audio| audio.instrument_id == instrument_id)
            .collect()
    }

    fn memes(&self, content: ContentRef) -> Vec<String> {
        self.memes.get(&content).cloned().unwrap_or_default()
    }

    fn is_directly_bound(&self, content: ContentRef) -> bool {
        self.bound.contains(&content)
    }
}

// -------------------------------------------------------------------------------------------------
