use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ServiceError;
use crate::subtitle::{CueStyle, ProcessedWord, SubtitleCue, Word};

// @module: Word timing post-processing for karaoke cues

/// Shortest on-screen duration for a single word, in seconds
pub const MIN_DURATION_SECS: f64 = 0.18;

/// Duration multiplier applied to hook words
pub const HOOK_BOOST: f64 = 1.3;

// @const: Non-alphanumeric stripper for hook matching
static CLEAN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

// @const: Curated attention-grabbing words that get extended screen time
static HOOK_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "brain", "secret", "nobody", "never", "hidden", "automatic", "this", "real", "inside",
        "shocking", "money", "die", "live", "love", "hate", "stop", "facts", "history", "science",
    ])
});

/// Where in the pass the hook-word boost is applied.
///
/// The legacy ordering boosts after the gap-closing step, so a boosted word's
/// end can run past the next word's start and leave overlapping cues. That
/// matches the behavior this pass was ported from and stays the default;
/// `BeforeGapClose` boosts first and then closes gaps, which cannot overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoostOrder {
    #[default]
    AfterGapClose,
    BeforeGapClose,
}

/// Tunables for the timing pass
#[derive(Debug, Clone)]
pub struct TimingOptions {
    pub min_duration: f64,
    pub hook_boost: f64,
    pub boost_order: BoostOrder,
}

impl Default for TimingOptions {
    fn default() -> Self {
        TimingOptions {
            min_duration: MIN_DURATION_SECS,
            hook_boost: HOOK_BOOST,
            boost_order: BoostOrder::default(),
        }
    }
}

/// Lowercase a word and strip everything but letters and digits
pub fn clean_word(text: &str) -> String {
    CLEAN_REGEX.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Whether the cleaned word is in the hook set
pub fn is_hook_word(text: &str) -> bool {
    HOOK_WORDS.contains(clean_word(text).as_str())
}

/// Style selection: pure function of (is_hook, cleaned length, digit presence)
pub fn select_style(word: &ProcessedWord) -> CueStyle {
    let cleaned = clean_word(&word.text);
    if word.is_hook || cleaned.chars().count() > 6 || cleaned.chars().any(|c| c.is_ascii_digit()) {
        CueStyle::Highlight
    } else {
        CueStyle::Default
    }
}

/// Apply the timing rules to an ordered word sequence.
///
/// Per word, in index order: enforce the minimum duration, extend the end to
/// the next word's start when a gap remains (never shrinks to resolve an
/// overlap), and multiply the duration of hook words by `hook_boost`. The
/// boost runs before or after gap closing per `options.boost_order`.
///
/// An empty input is a reported failure, not a panic.
pub fn process_words(
    words: &[Word],
    options: &TimingOptions,
) -> Result<Vec<ProcessedWord>, ServiceError> {
    if words.is_empty() {
        return Err(ServiceError::InferenceFailed(
            "no words found in transcription".to_string(),
        ));
    }

    let mut processed = Vec::with_capacity(words.len());

    for (i, word) in words.iter().enumerate() {
        let start = word.start;
        let mut end = word.end;

        if end - start < options.min_duration {
            end = start + options.min_duration;
        }

        let is_hook = is_hook_word(&word.text);

        if is_hook && options.boost_order == BoostOrder::BeforeGapClose {
            end = start + (end - start) * options.hook_boost;
        }

        if let Some(next) = words.get(i + 1) {
            if end < next.start {
                end = next.start;
            }
        }

        if is_hook && options.boost_order == BoostOrder::AfterGapClose {
            end = start + (end - start) * options.hook_boost;
        }

        processed.push(ProcessedWord {
            text: word.text.clone(),
            start,
            end,
            is_hook,
        });
    }

    Ok(processed)
}

/// Turn processed words into styled, uppercased cues, one per word
pub fn to_cues(words: &[ProcessedWord]) -> Vec<SubtitleCue> {
    words
        .iter()
        .map(|word| SubtitleCue {
            start: word.start,
            end: word.end,
            style: select_style(word),
            text: word.text.to_uppercase(),
        })
        .collect()
}
