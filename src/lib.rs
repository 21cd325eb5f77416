/*!
 * # clipkit - short-video content pipeline toolkit
 *
 * A Rust toolkit that stitches third-party ML inference services behind
 * small CLI commands and HTTP APIs for an automated short-video content
 * pipeline.
 *
 * ## Features
 *
 * - Word-level timestamp transcription via an external whisper.cpp-style CLI
 * - Karaoke timing post-processing (minimum durations, gap closing,
 *   hook-word emphasis) and ASS subtitle serialization
 * - TTS stub with a pluggable external-command engine
 * - Image generation HTTP API over a diffusion CLI backend
 * - OpenAI-compatible chat proxy in front of a local Ollama runtime
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration defaults and environment overrides
 * - `subtitle`: Timing processor (`subtitle::timing`) and ASS serializer
 *   (`subtitle::ass`)
 * - `transcriber`: Speech model seam and whisper CLI wrapper
 * - `synthesis`: TTS engines (mock and external command)
 * - `image`: Diffusion backend seam and stable-diffusion CLI wrapper
 * - `providers`: Backend runtime clients (`providers::ollama`)
 * - `server`: axum HTTP services (`server::image_api`, `server::llm_api`)
 * - `app_controller`: CLI operation orchestration
 * - `errors`: The closed error taxonomy shared across components
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod image;
pub mod providers;
pub mod server;
pub mod subtitle;
pub mod synthesis;
pub mod transcriber;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::ServiceError;
pub use subtitle::{CueStyle, ProcessedWord, SubtitleCue, Word};
