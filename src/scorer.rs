//! Candidate scoring and top-score picking.

use std::fmt::Display;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::ScoreWeights;

// -------------------------------------------------------------------------------------------------

/// Per candidate inputs of [`score_candidate`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScoreFactors {
    /// Meme isometry score of the candidate, in range [0..1].
    pub meme_score: f64,
    /// Candidate is bound directly to the chain.
    pub directly_bound: bool,
    /// Candidate is not published yet.
    pub draft: bool,
    /// Candidate continues a choice of the previous segment.
    pub continuity: bool,
}

/// Score a candidate: its weighted meme score plus bonuses and penalties, plus gaussian noise
/// with the given standard deviation. A non-positive `entropy` disables the noise.
pub fn score_candidate<R: Rng + ?Sized>(
    factors: &ScoreFactors,
    entropy: f64,
    weights: &ScoreWeights,
    rng: &mut R,
) -> f64 {
    let mut score = factors.meme_score * weights.meme_match;
    if factors.directly_bound {
        score += weights.directly_bound;
    }
    if factors.draft {
        score += weights.draft;
    }
    if factors.continuity {
        score += weights.continuity;
    }
    if entropy > 0.0 && entropy.is_finite() {
        if let Ok(normal) = Normal::new(0.0, entropy) {
            score += normal.sample(rng);
        }
    }
    score
}

// -------------------------------------------------------------------------------------------------

/// Collects candidate scores and picks the single best one.
#[derive(Debug, Clone)]
pub struct CandidateScores<Id> {
    scores: Vec<(Id, f64)>,
}

impl<Id> Default for CandidateScores<Id> {
    fn default() -> Self {
        Self { scores: Vec::new() }
    }
}

impl<Id: Copy> CandidateScores<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: Id, score: f64) {
        self.scores.push((id, score));
    }

    /// The highest scored candidate. Ties go to the candidate which was added first.
    pub fn top(&self) -> Option<Id> {
        let mut top: Option<(Id, f64)> = None;
        for (id, score) in &self.scores {
            if score.is_nan() {
                continue;
            }
            match top {
                Some((_, best)) if *score <= best => {}
                _ => top = Some((*id, *score)),
            }
        }
        top.map(|(id, _)| id)
    }
}

impl<Id: Display> Display for CandidateScores<Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scores = self
            .scores
            .iter()
            .map(|(id, score)| format!("{}:{:.2}", id, score))
            .collect::<Vec<_>>();
        write!(f, "{}", scores.join(", "))
    }
}

// -------------------------------------------------------------------------------------------------
