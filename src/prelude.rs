//! The segcraft prelude.
//!
//! The purpose of this module is to alleviate imports of common segcraft types and traits:
//!
//! ```
//! # #![allow(unused_imports)]
//! use segcraft::prelude::*;
//! ```

pub use super::{
    // all public model types
    model::{
        AccountId, Chain, ChainId, ChainState, ChainType, ContentRef, ContentState, Instrument,
        InstrumentAudio, InstrumentAudioId, InstrumentId, InstrumentType, Program, ProgramId,
        ProgramSequence, ProgramSequenceBinding, ProgramSequenceBindingId, ProgramSequenceChord,
        ProgramSequenceChordId, ProgramSequenceId, ProgramSequencePattern,
        ProgramSequencePatternEvent, ProgramSequencePatternEventId, ProgramSequencePatternId,
        ProgramType, ProgramVoice, ProgramVoiceId, Segment, SegmentChoice,
        SegmentChoiceArrangement, SegmentChoiceArrangementPick, SegmentChord, SegmentId,
        SegmentMeme, SegmentState, SegmentType,
    },
    // all public craft types
    Chord,
    ContentLibrary,
    ContentSource,
    CraftConfig,
    CraftError,
    CraftKind,
    Fabricator,
    Isometry,
    Key,
    MarbleBag,
    MemoryReportSink,
    MemorySegmentStore,
    Note,
    NullReportSink,
    PitchClass,
    ReportSink,
    SegmentStore,
};
