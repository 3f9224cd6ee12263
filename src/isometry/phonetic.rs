use lazy_static::lazy_static;
use rphonetic::{DoubleMetaphone, Encoder};

// --------------------------------------------------------------------------------------------------

lazy_static! {
    static ref DOUBLE_METAPHONE: DoubleMetaphone = DoubleMetaphone::default();
}

/// Phonetic key of a single word: its primary double metaphone code. Similar sounding words
/// like `KICK` and `KIK`, or `SNARE` and `SNAIR`, share the same key.
///
/// Non-alphabetic characters are ignored. Returns an empty string for words without letters.
pub fn phonetic_key(word: &str) -> String {
    let letters = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>();
    if letters.is_empty() {
        return String::new();
    }
    DOUBLE_METAPHONE.encode(&letters)
}

// --------------------------------------------------------------------------------------------------
