//! Error types of the fabrication core.

use thiserror::Error;

use crate::model::{ChainState, SegmentState};

// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CraftError {
    #[error("Invalid segment state transition from {from} to {to}")]
    InvalidTransition {
        from: SegmentState,
        to: SegmentState,
    },
    #[error("Invalid chain state transition from {from} to {to}")]
    InvalidChainTransition { from: ChainState, to: ChainState },
    #[error("Missing {kind} content: {reason}")]
    MissingContent { kind: String, reason: String },
    #[error("No candidates to pick from")]
    NoCandidates,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Segment store error: {0}")]
    Store(String),
}

impl CraftError {
    /// Errors which may be recovered by skipping the content type that caused them.
    pub fn is_missing_content(&self) -> bool {
        matches!(self, Self::MissingContent { .. } | Self::NoCandidates)
    }
}

pub type Result<T> = std::result::Result<T, CraftError>;
