/*!
 * Tests for configuration defaults, parsing and validation
 */

use std::str::FromStr;

use clipkit::app_config::{Config, LogLevel, TtsEngineKind};

#[test]
fn test_default_config_shouldCarryDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.api_key, "clipkit-dev-key");
    assert_eq!(config.transcriber.command, "whisper-cli");
    assert_eq!(config.transcriber.model, "models/ggml-small.bin");
    assert_eq!(config.tts.engine, TtsEngineKind::Mock);
    assert_eq!(config.image.command, "sd");
    assert_eq!(config.image.output_dir, "./generated_images");
    assert_eq!(config.image.port, 8001);
    assert_eq!(config.llm.endpoint, "http://localhost:11434");
    assert_eq!(config.llm.default_model, "llama3.1:8b");
    assert_eq!(config.llm.port, 8000);
    assert_eq!(config.llm.chat_timeout_secs, 120);
    assert_eq!(config.llm.tags_timeout_secs, 10);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_default_config_shouldValidate() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_withEmptyApiKey_shouldFail() {
    let mut config = Config::default();
    config.api_key = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.llm.endpoint = "not a url".to_string();
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("Invalid Ollama endpoint"));
}

#[test]
fn test_validate_withCommandEngineAndNoCommand_shouldFail() {
    let mut config = Config::default();
    config.tts.engine = TtsEngineKind::Command;
    config.tts.command = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withCommandEngineAndCommand_shouldSucceed() {
    let mut config = Config::default();
    config.tts.engine = TtsEngineKind::Command;
    config.tts.command = "say {text} -o {output}".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_log_level_fromStr_shouldParseCaseInsensitive() {
    assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
    assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
    assert!(LogLevel::from_str("verbose").is_err());
}

#[test]
fn test_tts_engine_fromStr_shouldParseKnownEngines() {
    assert_eq!(TtsEngineKind::from_str("mock").unwrap(), TtsEngineKind::Mock);
    assert_eq!(
        TtsEngineKind::from_str("Command").unwrap(),
        TtsEngineKind::Command
    );
    assert!(TtsEngineKind::from_str("espeak").is_err());
}

#[test]
fn test_style_prompts_forStyle_shouldFallBackOnUnknown() {
    let config = Config::default();
    let styles = &config.image.styles;

    assert!(styles.for_style("anime").contains("anime style"));
    assert!(styles.for_style("comic_book").contains("comic book style"));
    assert_eq!(styles.for_style("oil_painting"), styles.fallback);
}

#[test]
fn test_config_fromJson_withPartialFields_shouldFillDefaults() {
    let json = r#"{
        "api_key": "secret",
        "llm": { "default_model": "mistral:7b" }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.api_key, "secret");
    assert_eq!(config.llm.default_model, "mistral:7b");
    // untouched sections keep their defaults
    assert_eq!(config.llm.port, 8000);
    assert_eq!(config.image.port, 8001);
}
