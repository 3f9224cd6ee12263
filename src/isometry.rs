//! Similarity of tag sets, tolerant to inflections and spelling variants.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};

// -------------------------------------------------------------------------------------------------

mod phonetic;
pub use phonetic::phonetic_key;

// -------------------------------------------------------------------------------------------------

/// Prefix of anti-memes: a `!DARK` meme excludes content with a `DARK` meme, and vice versa.
pub const ANTI_MEME_PREFIX: char = '!';

lazy_static! {
    static ref ENGLISH_STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Normalize a meme: lower case, trimmed and stemmed. Anti-meme prefixes are kept.
pub fn meme_stem(meme: &str) -> String {
    let meme = meme.trim().to_lowercase();
    match meme.strip_prefix(ANTI_MEME_PREFIX) {
        Some(name) => format!("{}{}", ANTI_MEME_PREFIX, ENGLISH_STEMMER.stem(name.trim())),
        None => ENGLISH_STEMMER.stem(&meme).into_owned(),
    }
}

/// Normalize an event name: split into words and reduce each word to its phonetic key.
pub fn event_stems(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .map(phonetic_key)
        .filter(|key| !key.is_empty())
        .collect()
}

// -------------------------------------------------------------------------------------------------

/// Scores the similarity of target tag sets to a fixed source tag set.
///
/// Tags are normalized to stems before comparing, so near-synonymous tags still match. The
/// score is the number of distinct source stems which are present in the target, relative to
/// the number of distinct source stems: a value in range [0..1], which does not depend on the
/// order of the target tags.
#[derive(Debug, Clone, Default)]
pub struct Isometry {
    sources: BTreeSet<String>,
    avoid: BTreeSet<String>,
}

impl Isometry {
    /// Create a meme isometry: sources are lower cased and stemmed with an english stemmer.
    pub fn of_memes<S: AsRef<str>, I: IntoIterator<Item = S>>(memes: I) -> Self {
        let sources = memes
            .into_iter()
            .map(|meme| meme_stem(meme.as_ref()))
            .filter(|stem| !stem.is_empty())
            .collect();
        Self {
            sources,
            ..Default::default()
        }
    }

    /// Create an event isometry: sources are the phonetic keys of the event name's words.
    pub fn of_event(name: &str) -> Self {
        let sources = event_stems(name).into_iter().collect();
        Self {
            sources,
            ..Default::default()
        }
    }

    /// Return a new isometry which rejects content with any of the given memes.
    #[must_use]
    pub fn with_avoid<S: AsRef<str>, I: IntoIterator<Item = S>>(self, memes: I) -> Self {
        let mut avoid = self.avoid;
        avoid.extend(memes.into_iter().map(|meme| meme_stem(meme.as_ref())));
        Self { avoid, ..self }
    }

    /// Add more memes to the source set.
    pub fn add_memes<S: AsRef<str>, I: IntoIterator<Item = S>>(&mut self, memes: I) {
        self.sources.extend(
            memes
                .into_iter()
                .map(|meme| meme_stem(meme.as_ref()))
                .filter(|stem| !stem.is_empty()),
        );
    }

    /// Normalized source stems.
    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Similarity of the given target meme set to the sources, in range [0..1].
    pub fn score<S: AsRef<str>, I: IntoIterator<Item = S>>(&self, memes: I) -> f64 {
        self.score_stems(memes.into_iter().map(|meme| meme_stem(meme.as_ref())))
    }

    /// Similarity of the given target event name to the sources, in range [0..1].
    pub fn score_event(&self, name: &str) -> f64 {
        self.score_stems(event_stems(name))
    }

    fn score_stems<I: IntoIterator<Item = String>>(&self, stems: I) -> f64 {
        if self.sources.is_empty() {
            return 0.0;
        }
        let targets = stems.into_iter().collect::<BTreeSet<_>>();
        let matches = self.sources.intersection(&targets).count();
        matches as f64 / self.sources.len() as f64
    }

    /// Is content with the given memes allowed next to the sources? Content is rejected when
    /// any of its memes is avoided, or when its anti-memes and the sources exclude each other.
    pub fn is_allowed<S: AsRef<str>, I: IntoIterator<Item = S>>(&self, memes: I) -> bool {
        let targets = memes
            .into_iter()
            .map(|meme| meme_stem(meme.as_ref()))
            .collect::<BTreeSet<_>>();
        let anti = |stem: &String| format!("{}{}", ANTI_MEME_PREFIX, stem);
        for target in &targets {
            if self.avoid.contains(target) {
                return false;
            }
            if let Some(excluded) = target.strip_prefix(ANTI_MEME_PREFIX) {
                if self.sources.contains(excluded) {
                    return false;
                }
            } else if self.sources.contains(&anti(target)) {
                return false;
            }
        }
        true
    }
}

// -------------------------------------------------------------------------------------------------
