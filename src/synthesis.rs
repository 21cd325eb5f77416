/*!
 * Text-to-speech engines.
 *
 * The default engine is a mock that writes a placeholder audio file so the
 * rest of the pipeline can run without a synthesis model installed. Real
 * deployments select the command engine and point it at an external
 * synthesizer CLI.
 */

use std::path::Path;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::app_config::{TtsConfig, TtsEngineKind};
use crate::errors::ServiceError;

/// Minimal MP3 frame header bytes used as mock output
const PLACEHOLDER_MP3: &[u8] = &[
    0xFF, 0xF3, 0x44, 0xC4, 0x00, 0x00, 0x00, 0x03, 0x48, 0x00, 0x00, 0x00, 0x00,
];

/// Common trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Synthesize `text` into an audio file at `output_path`
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<(), ServiceError>;
}

/// Build the configured engine
pub fn engine_from_config(config: &TtsConfig) -> Box<dyn TtsEngine> {
    match config.engine {
        TtsEngineKind::Mock => Box::new(MockTts),
        TtsEngineKind::Command => Box::new(CommandTts::new(&config.command)),
    }
}

/// Mock engine: writes a fixed placeholder MP3 header so downstream steps
/// have a file to pick up
pub struct MockTts;

#[async_trait]
impl TtsEngine for MockTts {
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<(), ServiceError> {
        let preview: String = text.chars().take(30).collect();
        info!("Generating TTS (mock) for: {}...", preview);
        std::fs::write(output_path, PLACEHOLDER_MP3)?;
        Ok(())
    }
}

/// External synthesizer command with `{text}` and `{output}` placeholders,
/// e.g. `piper --model en.onnx --text {text} --output_file {output}`
pub struct CommandTts {
    template: String,
}

impl CommandTts {
    pub fn new(template: impl Into<String>) -> Self {
        CommandTts {
            template: template.into(),
        }
    }
}

#[async_trait]
impl TtsEngine for CommandTts {
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<(), ServiceError> {
        let output_str = output_path.to_str().unwrap_or_default();
        let args: Vec<String> = self
            .template
            .split_whitespace()
            .map(|token| match token {
                "{text}" => text.to_string(),
                "{output}" => output_str.to_string(),
                other => other.to_string(),
            })
            .collect();

        let (program, rest) = args.split_first().ok_or_else(|| {
            ServiceError::ModelLoadFailed("empty TTS command template".to_string())
        })?;

        debug!("Running TTS command: {}", program);

        let output = Command::new(program).args(rest).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ServiceError::ModelLoadFailed(format!("TTS binary not found: {}", program))
            } else {
                ServiceError::InferenceFailed(format!("failed to execute {}: {}", program, e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ServiceError::InferenceFailed(stderr.trim().to_string()));
        }

        if !output_path.exists() {
            return Err(ServiceError::InferenceFailed(format!(
                "TTS command produced no output file: {}",
                output_path.display()
            )));
        }

        Ok(())
    }
}
