//! The per segment craft pipeline: program, instrument and audio selection for each content
//! type, in the fixed order macro, main, rhythm, detail.

use std::{collections::HashMap, fmt::Display};

use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::{
    chord::Chord,
    config::CraftConfig,
    continuity::Continuity,
    error::Result,
    isometry::{meme_stem, Isometry},
    model::{
        InstrumentAudioId, ProgramType, Segment, SegmentChoice, SegmentChoiceArrangement,
        SegmentChoiceArrangementId, SegmentChoiceArrangementPick, SegmentChord, SegmentMeme,
        SegmentType,
    },
    report::ReportSink,
    retrospective::Retrospective,
    source::ContentSource,
    store::SegmentStore,
};

// -------------------------------------------------------------------------------------------------

mod arrangement;
mod layer;
mod macro_main;
mod pick;
mod program;

#[cfg(test)]
mod test;

pub use pick::ATONAL;

// -------------------------------------------------------------------------------------------------

/// Content type which gets crafted in one pass of the pipeline.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum CraftKind {
    Macro,
    Main,
    Rhythm,
    Detail,
}

impl CraftKind {
    /// Order in which the kinds get crafted. Memes of earlier passes constrain later ones.
    pub const ORDER: [CraftKind; 4] = [Self::Macro, Self::Main, Self::Rhythm, Self::Detail];

    /// Program type this kind chooses.
    pub fn program_type(&self) -> ProgramType {
        match self {
            Self::Macro => ProgramType::Macro,
            Self::Main => ProgramType::Main,
            Self::Rhythm => ProgramType::Rhythm,
            Self::Detail => ProgramType::Detail,
        }
    }

    /// Run this kind's craft pass on the given context.
    ///
    /// Returns the crafted choice, or the reason why the pass got skipped. Errors are fatal to
    /// the segment, unless they are missing content errors of a non mandatory kind.
    pub fn craft<S: ContentSource + ?Sized>(
        &self,
        context: &mut CraftContext<S>,
    ) -> Result<Selection<SegmentChoice>> {
        match self {
            Self::Macro => macro_main::craft_macro(context),
            Self::Main => macro_main::craft_main(context),
            Self::Rhythm | Self::Detail => layer::craft_layer(context, *self),
        }
    }
}

impl Display for CraftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// -------------------------------------------------------------------------------------------------

/// Outcome of a selection step which may recoverably find nothing to select.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    Chosen(T),
    Skipped(String),
}

// -------------------------------------------------------------------------------------------------

/// Records which get crafted for a segment. Owned by a single craft invocation and committed to
/// the segment store only when crafting succeeded.
#[derive(Debug, Default, Clone)]
pub struct SegmentWork {
    choices: Vec<SegmentChoice>,
    arrangements: Vec<SegmentChoiceArrangement>,
    picks: Vec<SegmentChoiceArrangementPick>,
    memes: Vec<SegmentMeme>,
    chords: Vec<SegmentChord>,
}

impl SegmentWork {
    pub fn choice_of_type(&self, program_type: ProgramType) -> Option<&SegmentChoice> {
        self.choices
            .iter()
            .find(|choice| choice.program_type == program_type)
    }

    /// Write all records into the given store, parents first.
    pub fn commit<St: SegmentStore + ?Sized>(self, store: &mut St) -> Result<()> {
        for meme in self.memes {
            store.put_meme(meme)?;
        }
        for chord in self.chords {
            store.put_chord(chord)?;
        }
        for choice in self.choices {
            store.put_choice(choice)?;
        }
        for arrangement in self.arrangements {
            store.put_arrangement(arrangement)?;
        }
        for pick in self.picks {
            store.put_pick(pick)?;
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// Everything a craft pass reads and writes while crafting one segment.
pub struct CraftContext<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    config: &'a CraftConfig,
    reports: &'a dyn ReportSink,
    rng: &'a mut Xoshiro256PlusPlus,
    storage_prefix: String,
    segment: Segment,
    retrospective: Retrospective,
    continuity: Continuity,
    work: SegmentWork,
    memes: Isometry,
    chords: Vec<(f64, Chord)>,
    audio_cache: HashMap<(SegmentChoiceArrangementId, String), InstrumentAudioId>,
}

impl<'a, S: ContentSource + ?Sized> CraftContext<'a, S> {
    pub fn new(
        source: &'a S,
        config: &'a CraftConfig,
        reports: &'a dyn ReportSink,
        rng: &'a mut Xoshiro256PlusPlus,
        storage_prefix: &str,
        segment: Segment,
        retrospective: Retrospective,
    ) -> Self {
        let continuity = Continuity::new(segment.segment_type, &retrospective, source);
        let memes = Isometry::default().with_avoid(&config.avoid_memes);
        Self {
            source,
            config,
            reports,
            rng,
            storage_prefix: storage_prefix.to_string(),
            segment,
            retrospective,
            continuity,
            work: SegmentWork::default(),
            memes,
            chords: Vec::new(),
            audio_cache: HashMap::new(),
        }
    }

    /// The segment under craft, with all properties the passes derived so far.
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Consume the context, returning the crafted segment and its records.
    pub fn finish(self) -> (Segment, SegmentWork) {
        (self.segment, self.work)
    }

    fn set_segment_type(&mut self, segment_type: SegmentType) {
        self.segment.segment_type = segment_type;
        self.continuity = Continuity::new(segment_type, &self.retrospective, self.source);
    }

    /// Add memes to the segment: they constrain and steer all following selections.
    fn add_memes<I: IntoIterator<Item = String>>(&mut self, memes: I) {
        for meme in memes {
            let stem = meme_stem(&meme);
            let exists = self
                .work
                .memes
                .iter()
                .any(|other| meme_stem(&other.name) == stem);
            if !exists && !stem.is_empty() {
                self.memes.add_memes([&meme]);
                self.work.memes.push(SegmentMeme::new(self.segment.id, &meme));
            }
        }
    }

    /// The chord which is active at the given beat of the segment.
    fn chord_at(&self, beat: f64) -> Option<&Chord> {
        self.chords
            .iter()
            .take_while(|(position, _)| *position <= beat)
            .last()
            .map(|(_, chord)| chord)
    }

    fn report(&self, key: &str, data: serde_json::Value) {
        self.reports.put_report(key, data);
    }
}
