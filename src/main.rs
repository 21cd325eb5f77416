// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use crate::app_config::{Config, LogLevel};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod image;
mod providers;
mod server;
mod subtitle;
mod synthesis;
mod transcriber;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe audio into a word-timestamp JSON file
    Transcribe {
        /// Input audio file
        #[arg(value_name = "AUDIO_IN")]
        audio_in: PathBuf,

        /// Output JSON file
        #[arg(value_name = "JSON_OUT")]
        json_out: PathBuf,
    },

    /// Generate a karaoke-style ASS subtitle file from audio
    Karaoke {
        /// Input audio file
        #[arg(value_name = "AUDIO_IN")]
        audio_in: PathBuf,

        /// Output ASS subtitle file
        #[arg(value_name = "ASS_OUT")]
        ass_out: PathBuf,
    },

    /// Synthesize narration audio from text
    Tts {
        /// Text to speak
        #[arg(value_name = "TEXT")]
        text: String,

        /// Output audio file
        #[arg(value_name = "AUDIO_OUT")]
        audio_out: PathBuf,
    },

    /// Run the image generation HTTP service
    ImageApi,

    /// Run the OpenAI-compatible LLM proxy HTTP service
    LlmApi,

    /// Generate shell completions for clipkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// clipkit - short-video content pipeline toolkit
///
/// Wraps speech-to-text, karaoke subtitle generation, TTS and image/LLM
/// inference services behind one binary.
#[derive(Parser, Debug)]
#[command(name = "clipkit")]
#[command(version = "1.0.0")]
#[command(about = "ML inference plumbing for an automated short-video pipeline")]
#[command(long_about = "clipkit wraps third-party ML inference behind small CLI commands and HTTP services.

EXAMPLES:
    clipkit transcribe voice.wav words.json    # Word-level timestamps as JSON
    clipkit karaoke voice.wav subs.ass         # Animated karaoke subtitles
    clipkit tts \"Hello there\" voice.mp3        # Narration audio (mock by default)
    clipkit image-api                          # Image generation service on :8001
    clipkit llm-api                            # OpenAI-compatible proxy on :8000

CONFIGURATION:
    Everything is configured through environment variables with sensible
    defaults: API_KEY, WHISPER_COMMAND, WHISPER_MODEL, TTS_ENGINE,
    IMAGE_MODEL, IMAGE_OUTPUT_DIR, IMAGE_API_PORT, OLLAMA_BASE_URL,
    DEFAULT_MODEL, PORT, STYLE_* prompt overrides and LOG_LEVEL.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() {
    // Initialize the logger once with info level by default; the level is
    // updated after the config is loaded
    if CustomLogger::init(LevelFilter::Info).is_err() {
        eprintln!("Failed to initialize logger");
    }

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli).await {
        // Failures are terminal: report and exit non-zero
        println!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    let mut config = Config::from_env();

    if let Some(cmd_log_level) = &cli.log_level {
        config.log_level = cmd_log_level.clone().into();
    }
    log::set_max_level(level_filter(&config.log_level));

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "clipkit", &mut std::io::stdout());
            Ok(())
        }
        Commands::Transcribe { audio_in, json_out } => {
            let controller = Controller::with_config(config)?;
            controller.run_transcribe(&audio_in, &json_out).await?;
            Ok(())
        }
        Commands::Karaoke { audio_in, ass_out } => {
            let controller = Controller::with_config(config)?;
            controller.run_karaoke(&audio_in, &ass_out).await?;
            Ok(())
        }
        Commands::Tts { text, audio_out } => {
            let controller = Controller::with_config(config)?;
            controller.run_tts(&text, &audio_out).await?;
            Ok(())
        }
        Commands::ImageApi => {
            config.validate()?;
            server::image_api::serve(server::state::ImageState::new(config)).await
        }
        Commands::LlmApi => {
            config.validate()?;
            server::llm_api::serve(server::state::LlmState::new(config)).await
        }
    }
}
