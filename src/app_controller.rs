use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::ServiceError;
use crate::subtitle::ass;
use crate::subtitle::timing::{self, TimingOptions};
use crate::synthesis;
use crate::transcriber::{self, SpeechModel, WhisperCli};

// @module: Application controller for the CLI operations

/// Main application controller for the pipeline scripts
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Spinner shown while an external model call is running
    fn spinner(message: &'static str) -> ProgressBar {
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress_bar.set_message(message);
        progress_bar.enable_steady_tick(Duration::from_millis(120));
        progress_bar
    }

    async fn transcribe_words(
        &self,
        audio_path: &Path,
    ) -> Result<Vec<crate::subtitle::Word>, ServiceError> {
        if !audio_path.exists() {
            return Err(ServiceError::input_not_found(audio_path));
        }

        let model = WhisperCli::new(&self.config.transcriber);
        info!("Transcribing {}...", audio_path.display());

        let progress_bar = Self::spinner("Transcribing audio");
        let result = model.transcribe(audio_path).await;
        progress_bar.finish_and_clear();

        let words = result?;
        debug!("Model produced {} words", words.len());
        Ok(words)
    }

    /// Transcribe an audio file and write the word-timestamp JSON artifact
    pub async fn run_transcribe(&self, audio_path: &Path, json_path: &Path) -> Result<(), ServiceError> {
        let words = self.transcribe_words(audio_path).await?;
        transcriber::write_transcript(&words, json_path)?;
        Ok(())
    }

    /// Transcribe an audio file and render the karaoke ASS subtitle file
    pub async fn run_karaoke(&self, audio_path: &Path, ass_path: &Path) -> Result<(), ServiceError> {
        let words = self.transcribe_words(audio_path).await?;

        let processed = timing::process_words(&words, &TimingOptions::default())?;
        let cues = timing::to_cues(&processed);

        ass::write_document(&cues, ass_path)
            .map_err(|e| ServiceError::Io(e.to_string()))?;

        info!("Generated ASS file: {}", ass_path.display());
        Ok(())
    }

    /// Synthesize narration audio for a text
    pub async fn run_tts(&self, text: &str, audio_path: &Path) -> Result<(), ServiceError> {
        let engine = synthesis::engine_from_config(&self.config.tts);
        engine.synthesize(text, audio_path).await?;
        info!("Wrote audio file: {}", audio_path.display());
        Ok(())
    }
}
