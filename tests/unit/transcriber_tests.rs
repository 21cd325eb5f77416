/*!
 * Tests for transcript artifacts and speech model wrappers
 */

use std::path::Path;

use clipkit::app_config::TranscriberConfig;
use clipkit::errors::ServiceError;
use clipkit::subtitle::Word;
use clipkit::transcriber::{
    MockSpeechModel, SpeechModel, WhisperCli, read_transcript, write_transcript,
};

use crate::common;

/// Transcripts round-trip through the JSON artifact with millisecond precision
#[test]
fn test_write_transcript_withWords_shouldRoundTripThroughJson() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("transcript.json");

    let words = vec![
        Word::new("Hello", 0.0, 0.48),
        Word::new("world", 0.48, 0.9001),
    ];
    let count = write_transcript(&words, &path).unwrap();
    assert_eq!(count, 2);

    let restored = read_transcript(&path).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].text, "Hello");
    assert_eq!(restored[1].start, 0.48);
    // times are rounded to three decimals on write
    assert_eq!(restored[1].end, 0.9);
}

#[test]
fn test_write_transcript_withNoWords_shouldFailAndWriteNothing() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("transcript.json");

    let result = write_transcript(&[], &path);
    assert!(matches!(result, Err(ServiceError::InferenceFailed(_))));
    assert!(!path.exists());
}

#[test]
fn test_write_transcript_shouldEmitArrayOfWordObjects() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("transcript.json");

    write_transcript(&[Word::new("one", 0.0, 0.5)], &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed[0]["word"], "one");
    assert_eq!(parsed[0]["start"], 0.0);
    assert_eq!(parsed[0]["end"], 0.5);
}

#[tokio::test]
async fn test_whisper_cli_withMissingAudio_shouldReturnInputNotFound() {
    let model = WhisperCli::new(&TranscriberConfig::default());
    let result = model.transcribe(Path::new("/nonexistent/audio.mp3")).await;
    assert!(matches!(result, Err(ServiceError::InputNotFound(_))));
}

#[tokio::test]
async fn test_whisper_cli_withMissingModelFile_shouldReturnModelLoadFailed() {
    let temp_dir = common::create_temp_dir().unwrap();
    let audio = common::create_test_file(temp_dir.path(), "audio.mp3", &[0u8; 16]).unwrap();

    let config = TranscriberConfig {
        model: "/nonexistent/ggml-small.bin".to_string(),
        ..TranscriberConfig::default()
    };
    let result = WhisperCli::new(&config).transcribe(&audio).await;
    assert!(matches!(result, Err(ServiceError::ModelLoadFailed(_))));
}

#[tokio::test]
async fn test_mock_model_withWords_shouldReturnThem() {
    let temp_dir = common::create_temp_dir().unwrap();
    let audio = common::create_test_file(temp_dir.path(), "audio.mp3", &[0u8; 16]).unwrap();

    let model = MockSpeechModel::with_words(common::sample_words());
    let words = model.transcribe(&audio).await.unwrap();
    assert_eq!(words.len(), 4);
    assert_eq!(words[1].text, "secret");
}

#[tokio::test]
async fn test_mock_model_whenFailing_shouldReturnInferenceFailed() {
    let temp_dir = common::create_temp_dir().unwrap();
    let audio = common::create_test_file(temp_dir.path(), "audio.mp3", &[0u8; 16]).unwrap();

    let result = MockSpeechModel::failing().transcribe(&audio).await;
    assert!(matches!(result, Err(ServiceError::InferenceFailed(_))));
}
