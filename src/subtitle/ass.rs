use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::subtitle::SubtitleCue;

// @module: Advanced SubStation Alpha (ASS) serialization

/// Fixed document header: portrait 1080x1920 script metadata and the two
/// named styles cues are rendered with.
const ASS_HEADER: &str = "[Script Info]\n\
ScriptType: v4.00+\n\
PlayResX: 1080\n\
PlayResY: 1920\n\
WrapStyle: 2\n\
ScaledBorderAndShadow: yes\n\
\n\
[V4+ Styles]\n\
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
Style: Default,Arial,85,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,4,0,5,10,10,550,1\n\
Style: Highlight,Arial,95,&H0000FFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,6,0,5,10,10,550,1\n\
\n\
[Events]\n\
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n";

/// Pop-in animation: start at 120% scale, settle at 100% over 150 ms
const ANIM_TAG: &str = r"{\fscx120\fscy120\t(0,150,\fscx100\fscy100)}";

/// Format seconds as an ASS timestamp: `H:MM:SS.ss` with hours unpadded,
/// minutes zero-padded and seconds zero-padded to two decimals
pub fn format_ass_time(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = seconds % 60.0;
    format!("{}:{:02}:{:05.2}", hours, minutes, secs)
}

/// Render one dialogue event line for a cue.
///
/// The word text is emitted verbatim after the animation tag; text containing
/// ASS control syntax (braces, backslash overrides) will corrupt the line.
/// Hardening against that is out of scope for speech-model output.
pub fn render_dialogue_line(cue: &SubtitleCue) -> String {
    format!(
        "Dialogue: 0,{},{},{},,0,0,0,,{}{}",
        format_ass_time(cue.start),
        format_ass_time(cue.end),
        cue.style.name(),
        ANIM_TAG,
        cue.text
    )
}

/// Render the complete ASS document for a cue sequence
pub fn render_document(cues: &[SubtitleCue]) -> String {
    let mut document = String::with_capacity(ASS_HEADER.len() + cues.len() * 96);
    document.push_str(ASS_HEADER);
    for (i, cue) in cues.iter().enumerate() {
        if i > 0 {
            document.push('\n');
        }
        let _ = write!(document, "{}", render_dialogue_line(cue));
    }
    document
}

/// Write the rendered document to disk as UTF-8
pub fn write_document<P: AsRef<Path>>(cues: &[SubtitleCue], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(path, render_document(cues))
        .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
}
