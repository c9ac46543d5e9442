//! Voice selection — the language policy for synthesized speech.
//!
//! Policy: if the recognized text contains any character in the Hangul
//! syllables block (U+AC00..=U+D7A3) the Korean voice is used, otherwise
//! the English voice. Deterministic on short and mixed-script text, which
//! is exactly where detector libraries disagree with themselves.

use crate::config::TtsConfig;

/// Returns `true` when `text` contains at least one Hangul syllable.
///
/// Only the precomposed syllables block is checked; isolated jamo do not
/// occur in OCR output of running text.
pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c))
}

/// Pick the voice for `text` according to the Hangul heuristic.
pub fn select_voice<'a>(text: &str, config: &'a TtsConfig) -> &'a str {
    if contains_hangul(text) {
        &config.korean_voice
    } else {
        &config.english_voice
    }
}
