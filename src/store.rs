//! Read/write access to chains, segments and their crafted records.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::{CraftError, Result},
    model::{
        Chain, ChainId, Segment, SegmentChoice, SegmentChoiceArrangement,
        SegmentChoiceArrangementId, SegmentChoiceArrangementPick, SegmentChoiceArrangementPickId,
        SegmentChoiceId, SegmentChord, SegmentChordId, SegmentId, SegmentMeme, SegmentMemeId,
    },
};

// -------------------------------------------------------------------------------------------------

/// Storage of chains and segments, plus the records the craft pipeline produces for each
/// segment. Puts replace existing entities with the same id and fail with a `Store` error
/// when the entity's parent does not exist.
///
/// A store is exclusively owned by one chain's fabrication, so it needs no interior locking.
pub trait SegmentStore {
    fn put_chain(&mut self, chain: Chain) -> Result<()>;
    fn chain(&self, id: ChainId) -> Option<Chain>;

    fn put_segment(&mut self, segment: Segment) -> Result<()>;
    fn segment(&self, id: SegmentId) -> Option<Segment>;
    /// All segments of a chain, sorted by offset.
    fn segments_of(&self, chain_id: ChainId) -> Vec<Segment>;

    fn put_choice(&mut self, choice: SegmentChoice) -> Result<()>;
    fn choice(&self, id: SegmentChoiceId) -> Option<SegmentChoice>;
    fn choices_of(&self, segment_id: SegmentId) -> Vec<SegmentChoice>;

    fn put_arrangement(&mut self, arrangement: SegmentChoiceArrangement) -> Result<()>;
    fn arrangements_of(&self, choice_id: SegmentChoiceId) -> Vec<SegmentChoiceArrangement>;

    fn put_pick(&mut self, pick: SegmentChoiceArrangementPick) -> Result<()>;
    fn picks_of(&self, arrangement_id: SegmentChoiceArrangementId)
        -> Vec<SegmentChoiceArrangementPick>;

    fn put_meme(&mut self, meme: SegmentMeme) -> Result<()>;
    fn memes_of(&self, segment_id: SegmentId) -> Vec<SegmentMeme>;

    fn put_chord(&mut self, chord: SegmentChord) -> Result<()>;
    /// Chords of a segment, sorted by position.
    fn chords_of(&self, segment_id: SegmentId) -> Vec<SegmentChord>;

    /// The segment at the given offset of a chain.
    fn segment_at(&self, chain_id: ChainId, offset: u64) -> Option<Segment> {
        self.segments_of(chain_id)
            .into_iter()
            .find(|segment| segment.offset == offset)
    }

    /// The segment with the highest offset of a chain.
    fn last_segment(&self, chain_id: ChainId) -> Option<Segment> {
        self.segments_of(chain_id).pop()
    }

    /// All picks of a segment, in arrangement order.
    fn picks_of_segment(&self, segment_id: SegmentId) -> Vec<SegmentChoiceArrangementPick> {
        self.choices_of(segment_id)
            .iter()
            .flat_map(|choice| self.arrangements_of(choice.id))
            .flat_map(|arrangement| self.picks_of(arrangement.id))
            .collect()
    }
}

// -------------------------------------------------------------------------------------------------

/// Records keyed by id, together with an index of record ids by parent id, so children of a
/// parent are looked up without scanning all records. Children are listed in id order.
#[derive(Debug, Clone)]
struct Arena<P, I, T> {
    records: BTreeMap<I, (P, T)>,
    children: BTreeMap<P, BTreeSet<I>>,
}

impl<P, I, T> Default for Arena<P, I, T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }
}

impl<P: Ord + Copy, I: Ord + Copy, T: Clone> Arena<P, I, T> {
    fn insert(&mut self, parent: P, id: I, record: T) {
        if let Some((previous_parent, _)) = self.records.insert(id, (parent, record)) {
            if previous_parent != parent {
                if let Some(ids) = self.children.get_mut(&previous_parent) {
                    ids.remove(&id);
                }
            }
        }
        self.children.entry(parent).or_default().insert(id);
    }

    fn contains(&self, id: &I) -> bool {
        self.records.contains_key(id)
    }

    fn get(&self, id: &I) -> Option<T> {
        self.records.get(id).map(|(_, record)| record.clone())
    }

    fn children_of(&self, parent: &P) -> Vec<T> {
        self.children
            .get(parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(id))
            .collect()
    }
}

// -------------------------------------------------------------------------------------------------

/// A [`SegmentStore`] which keeps everything in memory.
///
/// All lookups by id, by parent and by chain offset are indexed, so the cost of crafting a
/// segment does not grow with the length of its chain.
#[derive(Debug, Default, Clone)]
pub struct MemorySegmentStore {
    chains: BTreeMap<ChainId, Chain>,
    segments: BTreeMap<SegmentId, Segment>,
    offsets: BTreeMap<(ChainId, u64), SegmentId>,
    choices: Arena<SegmentId, SegmentChoiceId, SegmentChoice>,
    arrangements: Arena<SegmentChoiceId, SegmentChoiceArrangementId, SegmentChoiceArrangement>,
    picks: Arena<
        SegmentChoiceArrangementId,
        SegmentChoiceArrangementPickId,
        SegmentChoiceArrangementPick,
    >,
    memes: Arena<SegmentId, SegmentMemeId, SegmentMeme>,
    chords: Arena<SegmentId, SegmentChordId, SegmentChord>,
}

impl MemorySegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn require_segment(&self, id: SegmentId) -> Result<()> {
        if self.segments.contains_key(&id) {
            Ok(())
        } else {
            Err(CraftError::Store(format!("Segment {} does not exist", id)))
        }
    }
}

impl SegmentStore for MemorySegmentStore {
    fn put_chain(&mut self, chain: Chain) -> Result<()> {
        self.chains.insert(chain.id, chain);
        Ok(())
    }

    fn chain(&self, id: ChainId) -> Option<Chain> {
        self.chains.get(&id).cloned()
    }

    fn put_segment(&mut self, segment: Segment) -> Result<()> {
        if !self.chains.contains_key(&segment.chain_id) {
            return Err(CraftError::Store(format!(
                "Chain {} of segment {} does not exist",
                segment.chain_id, segment.id
            )));
        }
        if let Some(previous) = self.segments.get(&segment.id) {
            self.offsets.remove(&(previous.chain_id, previous.offset));
        }
        self.offsets
            .insert((segment.chain_id, segment.offset), segment.id);
        self.segments.insert(segment.id, segment);
        Ok(())
    }

    fn segment(&self, id: SegmentId) -> Option<Segment> {
        self.segments.get(&id).cloned()
    }

    fn segments_of(&self, chain_id: ChainId) -> Vec<Segment> {
        self.offsets
            .range((chain_id, 0)..=(chain_id, u64::MAX))
            .filter_map(|(_, id)| self.segment(*id))
            .collect()
    }

    fn segment_at(&self, chain_id: ChainId, offset: u64) -> Option<Segment> {
        self.offsets
            .get(&(chain_id, offset))
            .and_then(|id| self.segment(*id))
    }

    fn last_segment(&self, chain_id: ChainId) -> Option<Segment> {
        self.offsets
            .range((chain_id, 0)..=(chain_id, u64::MAX))
            .next_back()
            .and_then(|(_, id)| self.segment(*id))
    }

    fn put_choice(&mut self, choice: SegmentChoice) -> Result<()> {
        self.require_segment(choice.segment_id)?;
        self.choices.insert(choice.segment_id, choice.id, choice);
        Ok(())
    }

    fn choice(&self, id: SegmentChoiceId) -> Option<SegmentChoice> {
        self.choices.get(&id)
    }

    fn choices_of(&self, segment_id: SegmentId) -> Vec<SegmentChoice> {
        self.choices.children_of(&segment_id)
    }

    fn put_arrangement(&mut self, arrangement: SegmentChoiceArrangement) -> Result<()> {
        if !self.choices.contains(&arrangement.segment_choice_id) {
            return Err(CraftError::Store(format!(
                "Choice {} of arrangement {} does not exist",
                arrangement.segment_choice_id, arrangement.id
            )));
        }
        self.arrangements
            .insert(arrangement.segment_choice_id, arrangement.id, arrangement);
        Ok(())
    }

    fn arrangements_of(&self, choice_id: SegmentChoiceId) -> Vec<SegmentChoiceArrangement> {
        self.arrangements.children_of(&choice_id)
    }

    fn put_pick(&mut self, pick: SegmentChoiceArrangementPick) -> Result<()> {
        if !self.arrangements.contains(&pick.segment_choice_arrangement_id) {
            return Err(CraftError::Store(format!(
                "Arrangement {} of pick {} does not exist",
                pick.segment_choice_arrangement_id, pick.id
            )));
        }
        self.picks
            .insert(pick.segment_choice_arrangement_id, pick.id, pick);
        Ok(())
    }

    fn picks_of(
        &self,
        arrangement_id: SegmentChoiceArrangementId,
    ) -> Vec<SegmentChoiceArrangementPick> {
        self.picks.children_of(&arrangement_id)
    }

    fn put_meme(&mut self, meme: SegmentMeme) -> Result<()> {
        self.require_segment(meme.segment_id)?;
        self.memes.insert(meme.segment_id, meme.id, meme);
        Ok(())
    }

    fn memes_of(&self, segment_id: SegmentId) -> Vec<SegmentMeme> {
        self.memes.children_of(&segment_id)
    }

    fn put_chord(&mut self, chord: SegmentChord) -> Result<()> {
        self.require_segment(chord.segment_id)?;
        self.chords.insert(chord.segment_id, chord.id, chord);
        Ok(())
    }

    fn chords_of(&self, segment_id: SegmentId) -> Vec<SegmentChord> {
        let mut chords = self.chords.children_of(&segment_id);
        chords.sort_by(|a, b| a.position.total_cmp(&b.position));
        chords
    }
}

// -------------------------------------------------------------------------------------------------
