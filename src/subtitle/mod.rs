/*!
 * Karaoke subtitle generation: word timing post-processing and ASS
 * serialization.
 *
 * `timing` turns raw word timestamps into animation-ready cues;
 * `ass` renders those cues into an Advanced SubStation Alpha document.
 */

pub mod ass;
pub mod timing;

// @struct: Raw word timestamp from the speech model
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    // @field: Word text as emitted by the model
    pub text: String,

    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Word {
            text: text.into(),
            start,
            end,
        }
    }
}

// @struct: Word with adjusted timing and emphasis flag
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub is_hook: bool,
}

/// Named style a cue is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueStyle {
    Default,
    Highlight,
}

impl CueStyle {
    /// Style name as it appears in the ASS document
    pub fn name(&self) -> &'static str {
        match self {
            CueStyle::Default => "Default",
            CueStyle::Highlight => "Highlight",
        }
    }
}

/// One timed, styled unit of on-screen text; one cue per word, no merging
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub start: f64,
    pub end: f64,
    pub style: CueStyle,
    /// Uppercased word text
    pub text: String,
}
