/*!
 * Speech-to-text with word-level timestamps.
 *
 * All recognition work is delegated to an external whisper.cpp-style CLI;
 * this module is the thin wrapper that invokes it, parses its JSON output
 * into ordered words and writes the transcript artifact.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::app_config::TranscriberConfig;
use crate::errors::ServiceError;
use crate::subtitle::Word;

/// Common trait for speech models.
///
/// Implementations return a flat, ordered word sequence; segmentation and any
/// alignment details stay inside the external model.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Transcribe an audio file into ordered (word, start, end) triples
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Word>, ServiceError>;
}

/// One word of the JSON transcript artifact, times in seconds rounded to
/// three decimal places
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Round to three decimal places for the JSON artifact
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl From<&Word> for TranscriptWord {
    fn from(word: &Word) -> Self {
        TranscriptWord {
            word: word.text.clone(),
            start: round3(word.start),
            end: round3(word.end),
        }
    }
}

/// Serialize words to the pretty-printed JSON transcript file.
///
/// An empty word sequence is a failure and produces no output file.
pub fn write_transcript(words: &[Word], output_path: &Path) -> Result<usize, ServiceError> {
    if words.is_empty() {
        return Err(ServiceError::InferenceFailed(
            "no words found in transcription".to_string(),
        ));
    }

    let transcript: Vec<TranscriptWord> = words.iter().map(TranscriptWord::from).collect();
    let json = serde_json::to_string_pretty(&transcript)?;
    std::fs::write(output_path, json)?;

    info!("Saved {} words to {}", transcript.len(), output_path.display());
    Ok(transcript.len())
}

/// Read a transcript artifact back into words
pub fn read_transcript(path: &Path) -> Result<Vec<Word>, ServiceError> {
    let content = std::fs::read_to_string(path)?;
    let transcript: Vec<TranscriptWord> = serde_json::from_str(&content)?;
    Ok(transcript
        .into_iter()
        .map(|w| Word::new(w.word, w.start, w.end))
        .collect())
}

/// whisper.cpp CLI wrapper
pub struct WhisperCli {
    command: String,
    model: String,
    timeout: Duration,
}

/// Shape of the whisper.cpp JSON output we consume
#[derive(Debug, Deserialize)]
struct WhisperJson {
    transcription: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    text: String,
    offsets: Option<WhisperOffsets>,
}

#[derive(Debug, Deserialize)]
struct WhisperOffsets {
    from: u64,
    to: u64,
}

impl WhisperCli {
    pub fn new(config: &TranscriberConfig) -> Self {
        WhisperCli {
            command: config.command.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Keep only the tail of stderr; whisper.cpp prints model metadata noise
    /// before any actual error
    fn stderr_tail(stderr: &str) -> String {
        let meaningful: Vec<&str> = stderr
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        let tail_start = meaningful.len().saturating_sub(5);
        if meaningful.is_empty() {
            "unknown transcription error (stderr was empty)".to_string()
        } else {
            meaningful[tail_start..].join("\n")
        }
    }
}

#[async_trait]
impl SpeechModel for WhisperCli {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Word>, ServiceError> {
        if !audio_path.exists() {
            return Err(ServiceError::input_not_found(audio_path));
        }
        if !Path::new(&self.model).exists() {
            return Err(ServiceError::ModelLoadFailed(format!(
                "model file not found: {}",
                self.model
            )));
        }

        // The CLI writes <prefix>.json next to the requested output prefix
        let workdir = tempfile::tempdir().map_err(|e| ServiceError::Io(e.to_string()))?;
        let output_prefix: PathBuf = workdir.path().join("transcript");

        debug!(
            "Running {} on {} with model {}",
            self.command,
            audio_path.display(),
            self.model
        );

        // -ml 1 with -sow splits output per word so offsets are word-level
        let whisper_future = Command::new(&self.command)
            .args([
                "-m",
                &self.model,
                "-f",
                audio_path.to_str().unwrap_or_default(),
                "-oj",
                "-of",
                output_prefix.to_str().unwrap_or_default(),
                "-ml",
                "1",
                "-sow",
            ])
            .output();

        let output = tokio::select! {
            result = whisper_future => {
                result.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        ServiceError::ModelLoadFailed(format!(
                            "transcriber binary not found: {}", self.command
                        ))
                    } else {
                        ServiceError::InferenceFailed(format!(
                            "failed to execute {}: {}", self.command, e
                        ))
                    }
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ServiceError::InferenceFailed(format!(
                    "transcription timed out after {} seconds", self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = Self::stderr_tail(&stderr);
            error!("Transcription failed: {}", tail);
            return Err(ServiceError::InferenceFailed(tail));
        }

        let json_path = output_prefix.with_extension("json");
        let content = std::fs::read_to_string(&json_path).map_err(|e| {
            ServiceError::InferenceFailed(format!("transcriber produced no JSON output: {}", e))
        })?;
        let parsed: WhisperJson = serde_json::from_str(&content)?;

        let mut words = Vec::new();
        for segment in parsed.transcription {
            let text = segment.text.trim();
            if text.is_empty() {
                continue;
            }
            if let Some(offsets) = segment.offsets {
                words.push(Word::new(
                    text,
                    offsets.from as f64 / 1000.0,
                    offsets.to as f64 / 1000.0,
                ));
            }
        }

        Ok(words)
    }
}

/// Preset speech model for tests: returns a fixed word sequence or an error
pub struct MockSpeechModel {
    words: Vec<Word>,
    fail: bool,
}

impl MockSpeechModel {
    pub fn with_words(words: Vec<Word>) -> Self {
        MockSpeechModel { words, fail: false }
    }

    pub fn failing() -> Self {
        MockSpeechModel {
            words: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl SpeechModel for MockSpeechModel {
    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Word>, ServiceError> {
        if !audio_path.exists() {
            return Err(ServiceError::input_not_found(audio_path));
        }
        if self.fail {
            return Err(ServiceError::InferenceFailed(
                "mock transcription failure".to_string(),
            ));
        }
        Ok(self.words.clone())
    }
}
