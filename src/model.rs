//! Data model: chains, segments and their crafted records, plus the read-only content entities.

use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::{Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------

mod chain;
mod choice;
mod content;
mod segment;

pub use chain::{Chain, ChainState, ChainType};
pub use choice::{
    SegmentChoice, SegmentChoiceArrangement, SegmentChoiceArrangementPick, SegmentChord,
    SegmentMeme,
};
pub use content::{
    ContentRef, ContentState, Instrument, InstrumentAudio, InstrumentType, Program,
    ProgramSequence, ProgramSequenceBinding, ProgramSequenceChord, ProgramSequencePattern,
    ProgramSequencePatternEvent, ProgramType, ProgramVoice,
};
pub use segment::{Segment, SegmentState, SegmentType};

// -------------------------------------------------------------------------------------------------

/// Absolute time in microseconds, as used for chain and segment begin/end times.
pub type Micros = u64;

/// Convert a duration in beats to seconds at the given tempo in beats per minute.
pub fn beats_to_seconds(beats: f64, tempo: f64) -> f64 {
    if tempo > 0.0 {
        beats * 60.0 / tempo
    } else {
        0.0
    }
}

/// Convert a duration in beats to microseconds at the given tempo in beats per minute.
pub fn beats_to_micros(beats: f64, tempo: f64) -> Micros {
    (beats_to_seconds(beats, tempo) * 1_000_000.0).round() as Micros
}

// -------------------------------------------------------------------------------------------------

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, Debug, Display, Deref, From, Into,
            PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            /// Generate a new, process wide unique id.
            pub fn unique() -> Self {
                static ID: AtomicU64 = AtomicU64::new(1);
                Self(ID.fetch_add(1, Ordering::Relaxed))
            }
        }
    };
}

entity_id!(
    /// Id of an account which owns chains.
    AccountId
);
entity_id!(
    /// Id of a [`Chain`].
    ChainId
);
entity_id!(
    /// Id of a [`Segment`].
    SegmentId
);
entity_id!(
    /// Id of a [`SegmentChoice`].
    SegmentChoiceId
);
entity_id!(
    /// Id of a [`SegmentChoiceArrangement`].
    SegmentChoiceArrangementId
);
entity_id!(
    /// Id of a [`SegmentChoiceArrangementPick`].
    SegmentChoiceArrangementPickId
);
entity_id!(
    /// Id of a [`SegmentMeme`].
    SegmentMemeId
);
entity_id!(
    /// Id of a [`SegmentChord`].
    SegmentChordId
);
entity_id!(ProgramId);
entity_id!(ProgramSequenceId);
entity_id!(ProgramSequenceBindingId);
entity_id!(ProgramSequenceChordId);
entity_id!(ProgramVoiceId);
entity_id!(ProgramSequencePatternId);
entity_id!(ProgramSequencePatternEventId);
entity_id!(InstrumentId);
entity_id!(InstrumentAudioId);
