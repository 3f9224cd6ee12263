//! The fabrication driver: advances segments through their state machine and runs the craft
//! pipeline on them, one segment at a time.

use log::{error, info, warn};
use rand::{rng, Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde_json::json;

use crate::{
    config::CraftConfig,
    craft::{CraftContext, CraftKind, Selection},
    error::{CraftError, Result},
    model::{ChainId, ChainState, Segment, SegmentId, SegmentState},
    report::ReportSink,
    retrospective::Retrospective,
    source::ContentSource,
    store::SegmentStore,
};

// -------------------------------------------------------------------------------------------------

/// Fabricates the segments of a chain from a content library.
///
/// A fabricator owns its random number generator. Chains which get fabricated in parallel
/// should each use their own fabricator and store, while sharing the content library.
pub struct Fabricator<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    config: CraftConfig,
    reports: &'a dyn ReportSink,
    rand_gen: Xoshiro256PlusPlus,
}

impl<'a, S: ContentSource + ?Sized> Fabricator<'a, S> {
    pub fn new(source: &'a S, config: CraftConfig, reports: &'a dyn ReportSink) -> Self {
        let rand_seed = config.seed.unwrap_or_else(|| rng().random());
        let rand_gen = Xoshiro256PlusPlus::seed_from_u64(rand_seed);
        Self {
            source,
            config,
            reports,
            rand_gen,
        }
    }

    pub fn config(&self) -> &CraftConfig {
        &self.config
    }

    /// Craft the given planned segment.
    ///
    /// Invalid chains or segments and forbidden state transitions are returned as errors before
    /// any craft work begins. Once crafting started, the segment either ends up `Crafted` with
    /// all its records committed to the store, or `Failed` with a report and nothing but the
    /// segment's state written. Both are returned as `Ok`.
    pub fn fabricate<St: SegmentStore + ?Sized>(
        &mut self,
        store: &mut St,
        segment_id: SegmentId,
    ) -> Result<SegmentState> {
        let mut segment = store
            .segment(segment_id)
            .ok_or_else(|| CraftError::Validation(format!("Segment {} not found", segment_id)))?;
        let chain = store.chain(segment.chain_id).ok_or_else(|| {
            CraftError::Validation(format!(
                "Chain {} of segment {} not found",
                segment.chain_id, segment.id
            ))
        })?;
        chain.validate()?;
        segment.validate()?;
        if chain.state() != ChainState::Fabricate {
            return Err(CraftError::Validation(format!(
                "Chain {} is not fabricating, but {:?}",
                chain.id,
                chain.state()
            )));
        }

        segment.set_state(SegmentState::Crafting)?;
        store.put_segment(segment.clone())?;
        info!(
            "Crafting segment {} at offset {} of chain '{}'",
            segment.id, segment.offset, chain.name
        );

        let retrospective = Retrospective::new(&*store, &segment);
        let mut context = CraftContext::new(
            self.source,
            &self.config,
            self.reports,
            &mut self.rand_gen,
            &chain.storage_prefix(),
            segment,
            retrospective,
        );
        let result = craft_all(&mut context, &self.config, self.reports);
        let (mut segment, work) = context.finish();
        let result = result
            .and_then(|()| segment.validate())
            .and_then(|()| work.commit(store));
        match result {
            Ok(()) => {
                segment.set_state(SegmentState::Crafted)?;
                store.put_segment(segment.clone())?;
                info!("Crafted segment {}", segment.id);
                Ok(segment.state())
            }
            Err(err) => {
                error!("Failed to craft segment {}: {}", segment.id, err);
                self.reports.put_report(
                    "segment_failed",
                    json!({
                        "segment": *segment.id,
                        "offset": segment.offset,
                        "error": err.to_string(),
                    }),
                );
                segment.set_state(SegmentState::Failed)?;
                store.put_segment(segment.clone())?;
                Ok(segment.state())
            }
        }
    }

    /// Plan the next segment of a fabricating chain, directly after its last segment.
    ///
    /// Returns None when the chain's last segment ends at or after the chain's stop time.
    pub fn plan_next_segment<St: SegmentStore + ?Sized>(
        &self,
        store: &mut St,
        chain_id: ChainId,
    ) -> Result<Option<SegmentId>> {
        let chain = store
            .chain(chain_id)
            .ok_or_else(|| CraftError::Validation(format!("Chain {} not found", chain_id)))?;
        chain.validate()?;
        if chain.state() != ChainState::Fabricate {
            return Err(CraftError::Validation(format!(
                "Chain {} is not fabricating, but {:?}",
                chain.id,
                chain.state()
            )));
        }
        let segment = match store.last_segment(chain_id) {
            None => Segment::new(chain.id, 0, chain.start_at.unwrap_or(0)),
            Some(last) => {
                let Some(end_at) = last.end_at else {
                    return Err(CraftError::Validation(format!(
                        "Segment {} at offset {} has no end yet",
                        last.id, last.offset
                    )));
                };
                if chain.stop_at.is_some_and(|stop_at| end_at >= stop_at) {
                    return Ok(None);
                }
                Segment::new(chain.id, last.offset + 1, end_at)
            }
        };
        let id = segment.id;
        store.put_segment(segment)?;
        Ok(Some(id))
    }

    /// Move a segment to another state, e.g. for dubbing, when the state machine allows it.
    pub fn set_segment_state<St: SegmentStore + ?Sized>(
        &self,
        store: &mut St,
        segment_id: SegmentId,
        state: SegmentState,
    ) -> Result<()> {
        let mut segment = store
            .segment(segment_id)
            .ok_or_else(|| CraftError::Validation(format!("Segment {} not found", segment_id)))?;
        segment.set_state(state)?;
        store.put_segment(segment)
    }
}

/// Run all craft passes in order. Missing content of non mandatory kinds skips the pass.
fn craft_all<S: ContentSource + ?Sized>(
    context: &mut CraftContext<S>,
    config: &CraftConfig,
    reports: &dyn ReportSink,
) -> Result<()> {
    for kind in CraftKind::ORDER {
        let reason = match kind.craft(context) {
            Ok(Selection::Chosen(_)) => continue,
            Ok(Selection::Skipped(reason)) => reason,
            Err(err) if err.is_missing_content() && !config.is_mandatory(kind) => err.to_string(),
            Err(err) => return Err(err),
        };
        if config.is_mandatory(kind) {
            return Err(CraftError::MissingContent {
                kind: kind.to_string(),
                reason,
            });
        }
        warn!("Skipping {} craft: {}", kind, reason);
        reports.put_report(
            "missing_content",
            json!({
                "segment": *context.segment().id,
                "kind": kind,
                "reason": reason,
            }),
        );
    }
    Ok(())
}

// -------------------------------------------------------------------------------------------------
