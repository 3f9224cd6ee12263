//! Deployment tuned craft settings.

use anyhow::Context;
use serde::Deserialize;

use crate::craft::CraftKind;

// -------------------------------------------------------------------------------------------------

/// Standard deviations of the gaussian jitter which is added to candidate scores, per kind of
/// choice. Higher values result into more variety, 0 disables randomness.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    pub macro_program: f64,
    pub main_program: f64,
    pub rhythm_program: f64,
    pub detail_program: f64,
    pub instrument: f64,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            macro_program: 0.5,
            main_program: 0.5,
            rhythm_program: 0.5,
            detail_program: 0.5,
            instrument: 0.5,
        }
    }
}

impl EntropyConfig {
    /// Entropy for program choices of the given craft kind.
    pub fn program(&self, kind: CraftKind) -> f64 {
        match kind {
            CraftKind::Macro => self.macro_program,
            CraftKind::Main => self.main_program,
            CraftKind::Rhythm => self.rhythm_program,
            CraftKind::Detail => self.detail_program,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Fixed bonuses and penalties which get added to candidate scores.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Multiplier of the meme isometry score, which is in range [0..1].
    pub meme_match: f64,
    /// Added to candidates which are bound directly to the chain.
    pub directly_bound: f64,
    /// Added to unpublished (draft) candidates. Negative values penalize drafts.
    pub draft: f64,
    /// Added to candidates which were chosen in the segments before.
    pub continuity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            meme_match: 10.0,
            directly_bound: 100.0,
            draft: -5.0,
            continuity: 50.0,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// All settings of a [`Fabricator`](crate::Fabricator).
///
/// Every value has a default, so a config file only needs to specify what it changes:
///
/// ```rust
/// use segcraft::CraftConfig;
/// let config = CraftConfig::from_json(r#"{ "seed": 42, "weights": { "continuity": 80 } }"#)
///     .unwrap();
/// assert_eq!(config.seed, Some(42));
/// assert_eq!(config.weights.continuity, 80.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CraftConfig {
    pub entropy: EntropyConfig,
    pub weights: ScoreWeights,
    /// Craft kinds which fail the segment when their content is missing. All other kinds are
    /// skipped with a report.
    pub mandatory: Vec<CraftKind>,
    /// Marble weight of a perfect event name match, when picking instrument audio.
    pub event_match_weight: u32,
    /// Content with any of these memes is never chosen.
    pub avoid_memes: Vec<String>,
    /// Seed for the random number generator. When None, a random seed is used.
    pub seed: Option<u64>,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            entropy: EntropyConfig::default(),
            weights: ScoreWeights::default(),
            mandatory: vec![CraftKind::Macro, CraftKind::Main],
            event_match_weight: 100,
            avoid_memes: Vec::new(),
            seed: None,
        }
    }
}

impl CraftConfig {
    /// Parse a config from a JSON string. Missing values are set to their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse craft config")
    }

    /// Return a new config with the given fixed seed.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        let seed = Some(seed);
        Self { seed, ..self }
    }

    /// Return a new config with all entropy disabled: choices are fully deterministic.
    #[must_use]
    pub fn without_entropy(self) -> Self {
        let entropy = EntropyConfig {
            macro_program: 0.0,
            main_program: 0.0,
            rhythm_program: 0.0,
            detail_program: 0.0,
            instrument: 0.0,
        };
        Self { entropy, ..self }
    }

    pub fn is_mandatory(&self, kind: CraftKind) -> bool {
        self.mandatory.contains(&kind)
    }
}

// -------------------------------------------------------------------------------------------------
