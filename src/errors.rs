/*!
 * Error types for the clipkit application.
 *
 * Every failure in the pipeline maps onto a small closed set of error kinds,
 * using the thiserror crate for ergonomic error definitions. No error is
 * retried or recovered; each one is terminal for the current request or
 * invocation.
 */

use std::path::Path;

use thiserror::Error;

/// Closed error taxonomy shared by the CLI operations and the HTTP services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// An input file was missing or invalid, caught before any model work
    #[error("Input not found: {0}")]
    InputNotFound(String),

    /// Loading an external model or its runtime binary failed
    #[error("Model load failed: {0}")]
    ModelLoadFailed(String),

    /// The model loaded but inference produced an error or unusable output
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    /// Missing or wrong API key on a protected endpoint
    #[error("Invalid or missing API key. Use X-API-Key header.")]
    AuthFailed,

    /// The upstream backend (Ollama, image runtime) could not be reached
    /// or responded with an error
    #[error("Upstream error: {0}")]
    UpstreamUnreachable(String),

    /// A file operation failed
    #[error("File error: {0}")]
    Io(String),
}

impl ServiceError {
    /// Build an `InputNotFound` from a path
    pub fn input_not_found(path: &Path) -> Self {
        Self::InputNotFound(path.display().to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(error: serde_json::Error) -> Self {
        Self::InferenceFailed(format!("invalid model output: {}", error))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        Self::UpstreamUnreachable(error.to_string())
    }
}
