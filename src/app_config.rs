use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including defaults,
/// environment-variable overrides and validation. Every setting has a stated
/// default and can be overridden through the environment, so the binary runs
/// without any config file at all.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Shared-secret API key checked by both HTTP services (X-API-Key header)
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Speech-to-text settings
    #[serde(default)]
    pub transcriber: TranscriberConfig,

    /// Text-to-speech settings
    #[serde(default)]
    pub tts: TtsConfig,

    /// Image generation service settings
    #[serde(default)]
    pub image: ImageConfig,

    /// LLM proxy service settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech-to-text configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriberConfig {
    /// Whisper-compatible CLI binary to invoke
    #[serde(default = "default_whisper_command")]
    pub command: String,

    /// Model file or identifier passed to the CLI
    #[serde(default = "default_whisper_model")]
    pub model: String,

    /// Transcription timeout in seconds
    #[serde(default = "default_transcribe_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            command: default_whisper_command(),
            model: default_whisper_model(),
            timeout_secs: default_transcribe_timeout_secs(),
        }
    }
}

/// TTS engine selector
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngineKind {
    /// Placeholder audio output, no model involved
    #[default]
    Mock,
    /// External synthesizer command with {text}/{output} placeholders
    Command,
}

impl std::str::FromStr for TtsEngineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "command" => Ok(Self::Command),
            _ => Err(anyhow!("Invalid TTS engine: {}", s)),
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TtsConfig {
    /// Which engine to use
    #[serde(default)]
    pub engine: TtsEngineKind,

    /// External synthesizer command template ({text} and {output} are
    /// substituted), used when engine = command
    #[serde(default = "default_tts_command")]
    pub command: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: TtsEngineKind::default(),
            command: default_tts_command(),
        }
    }
}

/// Per-style prompt fragments prepended to image prompts
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StylePrompts {
    #[serde(default = "default_style_simple_cartoon")]
    pub simple_cartoon: String,
    #[serde(default = "default_style_anime")]
    pub anime: String,
    #[serde(default = "default_style_western_cartoon")]
    pub western_cartoon: String,
    #[serde(default = "default_style_comic_book")]
    pub comic_book: String,
    #[serde(default = "default_style_fallback")]
    pub fallback: String,
}

impl Default for StylePrompts {
    fn default() -> Self {
        Self {
            simple_cartoon: default_style_simple_cartoon(),
            anime: default_style_anime(),
            western_cartoon: default_style_western_cartoon(),
            comic_book: default_style_comic_book(),
            fallback: default_style_fallback(),
        }
    }
}

impl StylePrompts {
    /// Fragment for a named style, falling back to the default style for
    /// anything unrecognized
    pub fn for_style(&self, style: &str) -> &str {
        match style {
            "simple_cartoon" => &self.simple_cartoon,
            "anime" => &self.anime,
            "western_cartoon" => &self.western_cartoon,
            "comic_book" => &self.comic_book,
            _ => &self.fallback,
        }
    }
}

/// Image generation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    /// Diffusion model file or identifier
    #[serde(default = "default_image_model")]
    pub model: String,

    /// stable-diffusion.cpp-style CLI binary to invoke
    #[serde(default = "default_image_command")]
    pub command: String,

    /// Directory where generated images are written and served from
    #[serde(default = "default_image_output_dir")]
    pub output_dir: String,

    /// HTTP listen port
    #[serde(default = "default_image_port")]
    pub port: u16,

    /// Negative prompt applied when the request doesn't carry one
    #[serde(default = "default_negative_prompt")]
    pub default_negative_prompt: String,

    /// Style prompt fragments
    #[serde(default)]
    pub styles: StylePrompts,

    /// Generation timeout in seconds
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            command: default_image_command(),
            output_dir: default_image_output_dir(),
            port: default_image_port(),
            default_negative_prompt: default_negative_prompt(),
            styles: StylePrompts::default(),
            timeout_secs: default_image_timeout_secs(),
        }
    }
}

/// LLM proxy service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    /// Base URL of the Ollama backend
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Model used when the request doesn't name one
    #[serde(default = "default_llm_model")]
    pub default_model: String,

    /// HTTP listen port
    #[serde(default = "default_llm_port")]
    pub port: u16,

    /// Wait budget for a chat completion, in seconds
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,

    /// Wait budget for the model listing call, in seconds
    #[serde(default = "default_tags_timeout_secs")]
    pub tags_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            default_model: default_llm_model(),
            port: default_llm_port(),
            chat_timeout_secs: default_chat_timeout_secs(),
            tags_timeout_secs: default_tags_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_api_key() -> String {
    // Development default only; override API_KEY in any real deployment
    "clipkit-dev-key".to_string()
}

fn default_whisper_command() -> String {
    "whisper-cli".to_string()
}

fn default_whisper_model() -> String {
    "models/ggml-small.bin".to_string()
}

fn default_transcribe_timeout_secs() -> u64 {
    600
}

fn default_tts_command() -> String {
    String::new()
}

fn default_image_model() -> String {
    "models/sd-v1-5.safetensors".to_string()
}

fn default_image_command() -> String {
    "sd".to_string()
}

fn default_image_output_dir() -> String {
    "./generated_images".to_string()
}

fn default_image_port() -> u16 {
    8001
}

fn default_negative_prompt() -> String {
    "blurry, low quality, distorted, ugly, bad anatomy, watermark".to_string()
}

fn default_image_timeout_secs() -> u64 {
    600
}

fn default_style_simple_cartoon() -> String {
    "simple cartoon style, clean lines, vibrant colors, 2D animation style".to_string()
}

fn default_style_anime() -> String {
    "anime style, detailed, vibrant colors, high quality".to_string()
}

fn default_style_western_cartoon() -> String {
    "western cartoon style, Disney Pixar style, 3D rendered".to_string()
}

fn default_style_comic_book() -> String {
    "comic book style, bold lines, dynamic composition".to_string()
}

fn default_style_fallback() -> String {
    "simple cartoon style, clean lines, vibrant colors".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_llm_port() -> u16 {
    8000
}

fn default_chat_timeout_secs() -> u64 {
    120
}

fn default_tags_timeout_secs() -> u64 {
    10
}

/// Replace `target` with the value of the environment variable, if set
fn env_override(target: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        if !value.is_empty() {
            *target = value;
        }
    }
}

/// Parse the environment variable into `target`, if set and valid
fn env_override_parsed<T: std::str::FromStr>(target: &mut T, var: &str) {
    if let Ok(value) = std::env::var(var) {
        if let Ok(parsed) = value.parse::<T>() {
            *target = parsed;
        }
    }
}

impl Config {
    /// Build the configuration from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Config::default();

        env_override(&mut config.api_key, "API_KEY");

        env_override(&mut config.transcriber.command, "WHISPER_COMMAND");
        env_override(&mut config.transcriber.model, "WHISPER_MODEL");

        env_override_parsed(&mut config.tts.engine, "TTS_ENGINE");
        env_override(&mut config.tts.command, "TTS_COMMAND");

        env_override(&mut config.image.model, "IMAGE_MODEL");
        env_override(&mut config.image.command, "IMAGE_COMMAND");
        env_override(&mut config.image.output_dir, "IMAGE_OUTPUT_DIR");
        env_override_parsed(&mut config.image.port, "IMAGE_API_PORT");
        env_override(
            &mut config.image.default_negative_prompt,
            "DEFAULT_NEGATIVE_PROMPT",
        );
        env_override(&mut config.image.styles.simple_cartoon, "STYLE_SIMPLE_CARTOON");
        env_override(&mut config.image.styles.anime, "STYLE_ANIME");
        env_override(&mut config.image.styles.western_cartoon, "STYLE_WESTERN_CARTOON");
        env_override(&mut config.image.styles.comic_book, "STYLE_COMIC_BOOK");
        env_override(&mut config.image.styles.fallback, "STYLE_DEFAULT");

        env_override(&mut config.llm.endpoint, "OLLAMA_BASE_URL");
        env_override(&mut config.llm.default_model, "DEFAULT_MODEL");
        env_override_parsed(&mut config.llm.port, "PORT");

        env_override_parsed(&mut config.log_level, "LOG_LEVEL");

        config
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow!("API key must not be empty"));
        }

        url::Url::parse(&self.llm.endpoint)
            .map_err(|e| anyhow!("Invalid Ollama endpoint '{}': {}", self.llm.endpoint, e))?;

        if self.tts.engine == TtsEngineKind::Command && self.tts.command.is_empty() {
            return Err(anyhow!(
                "TTS_COMMAND is required when the command TTS engine is selected"
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: default_api_key(),
            transcriber: TranscriberConfig::default(),
            tts: TtsConfig::default(),
            image: ImageConfig::default(),
            llm: LlmConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
