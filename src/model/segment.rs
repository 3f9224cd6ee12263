use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{beats_to_micros, ChainId, Micros, SegmentId};
use crate::{
    error::{CraftError, Result},
    key::Key,
};

// -------------------------------------------------------------------------------------------------

/// Lifecycle state of a [`Segment`].
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum SegmentState {
    #[default]
    Planned,
    Crafting,
    Crafted,
    Dubbing,
    Dubbed,
    Failed,
}

impl SegmentState {
    pub const ALL: [SegmentState; 6] = [
        Self::Planned,
        Self::Crafting,
        Self::Crafted,
        Self::Dubbing,
        Self::Dubbed,
        Self::Failed,
    ];

    /// States this state may be changed to, including itself.
    pub fn allowed_transitions(&self) -> &'static [SegmentState] {
        use SegmentState::*;
        match self {
            Planned => &[Planned, Crafting],
            Crafting => &[Crafting, Crafted, Dubbing, Failed, Planned],
            Crafted => &[Crafted, Dubbing],
            Dubbing => &[Dubbing, Dubbed, Failed],
            Dubbed => &[Dubbed],
            Failed => &[Failed],
        }
    }

    /// Fail with an `InvalidTransition` error when changing to `to` is not allowed.
    pub fn protect_transition(&self, to: SegmentState) -> Result<()> {
        if self.allowed_transitions().contains(&to) {
            Ok(())
        } else {
            Err(CraftError::InvalidTransition { from: *self, to })
        }
    }

    /// Dubbed and Failed segments never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dubbed | Self::Failed)
    }
}

impl Display for SegmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// -------------------------------------------------------------------------------------------------

/// How a segment relates to its predecessor, decided by the macro/main craft.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum SegmentType {
    /// Not yet decided.
    #[default]
    Pending,
    /// The first segment of a chain.
    Initial,
    /// Continues the previous segment's main program with its next sequence.
    Continue,
    /// Advances the macro program and chooses a new main program.
    NextMain,
    /// Chooses a new macro and a new main program.
    NextMacro,
}

impl SegmentType {
    /// Pivots change the main program, and usually the key.
    pub fn is_pivot(&self) -> bool {
        matches!(self, Self::NextMain | Self::NextMacro)
    }
}

impl Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// -------------------------------------------------------------------------------------------------

/// One time slice of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub chain_id: ChainId,
    pub offset: u64,
    state: SegmentState,
    pub segment_type: SegmentType,
    pub begin_at: Micros,
    pub end_at: Option<Micros>,
    pub key: Option<Key>,
    /// Length in beats.
    pub total: u32,
    pub density: f64,
    /// Beats per minute.
    pub tempo: f64,
    pub storage_key: String,
}

impl Segment {
    /// Create a new planned segment.
    pub fn new(chain_id: ChainId, offset: u64, begin_at: Micros) -> Self {
        Self {
            id: SegmentId::unique(),
            chain_id,
            offset,
            state: SegmentState::default(),
            segment_type: SegmentType::default(),
            begin_at,
            end_at: None,
            key: None,
            total: 0,
            density: 0.0,
            tempo: 0.0,
            storage_key: String::new(),
        }
    }

    /// Offset 0 is the initial segment, which has no predecessor.
    pub fn is_initial(&self) -> bool {
        self.offset == 0
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Change the segment's state, when allowed by the segment state machine.
    pub fn set_state(&mut self, state: SegmentState) -> Result<()> {
        self.state.protect_transition(state)?;
        self.state = state;
        Ok(())
    }

    /// Set total beats and tempo, and update the end time accordingly.
    pub fn set_length(&mut self, total: u32, tempo: f64) {
        self.total = total;
        self.tempo = tempo;
        self.end_at = Some(self.begin_at + beats_to_micros(total as f64, tempo));
    }

    /// Check the segment's invariants.
    pub fn validate(&self) -> Result<()> {
        if let Some(end_at) = self.end_at {
            if end_at < self.begin_at {
                return Err(CraftError::Validation(format!(
                    "Segment {} ends before it begins",
                    self.id
                )));
            }
        }
        if !self.density.is_finite() || !(0.0..=1.0).contains(&self.density) {
            return Err(CraftError::Validation(format!(
                "Segment {} density {} is out of range [0..1]",
                self.id, self.density
            )));
        }
        if !self.tempo.is_finite() || self.tempo < 0.0 {
            return Err(CraftError::Validation(format!(
                "Segment {} tempo {} is invalid",
                self.id, self.tempo
            )));
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
