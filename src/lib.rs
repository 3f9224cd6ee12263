//! Segment fabrication for generative music chains.
//!
//! A chain is an endless sequence of segments. Each segment gets crafted from a library of
//! authored content: programs with their sequences, voices and patterns, and instruments with
//! their audio. Crafting chooses programs by meme similarity and entropy, arranges each program
//! voice with an instrument and picks the instrument audio for every pattern event, conformed
//! to the segment's chords.
//!
//! ```rust
//! use segcraft::prelude::*;
//!
//! let library = ContentLibrary::new();
//! let reports = MemoryReportSink::new();
//! let mut store = MemorySegmentStore::new();
//!
//! let mut chain = Chain::new(AccountId::from(1), "Demo").with_times(0, None);
//! chain.set_state(ChainState::Ready).unwrap();
//! chain.set_state(ChainState::Fabricate).unwrap();
//! let chain_id = chain.id;
//! store.put_chain(chain).unwrap();
//!
//! let mut fabricator = Fabricator::new(&library, CraftConfig::default(), &reports);
//! let segment = fabricator.plan_next_segment(&mut store, chain_id).unwrap().unwrap();
//! // an empty library has no macro and main programs to craft from
//! let state = fabricator.fabricate(&mut store, segment).unwrap();
//! assert_eq!(state, SegmentState::Failed);
//! ```

// -------------------------------------------------------------------------------------------------

pub mod prelude;

pub mod note;
pub use note::{Note, NoteRange, PitchClass};

pub mod chord;
pub use chord::Chord;

pub mod key;
pub use key::{Key, KeyMode};

pub mod error;
pub use error::CraftError;

pub mod model;

pub mod isometry;
pub use isometry::Isometry;

pub mod bag;
pub use bag::MarbleBag;

pub mod scorer;

pub mod config;
pub use config::CraftConfig;

pub mod source;
pub use source::{ContentLibrary, ContentSource};

pub mod store;
pub use store::{MemorySegmentStore, SegmentStore};

pub mod report;
pub use report::{MemoryReportSink, NullReportSink, ReportSink};

pub mod retrospective;
pub use retrospective::Retrospective;

pub mod continuity;

pub mod craft;
pub use craft::{CraftContext, CraftKind, Selection};

pub mod fabricator;
pub use fabricator::Fabricator;
