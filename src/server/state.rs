use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::app_config::Config;
use crate::errors::ServiceError;
use crate::image::{ImageModel, SdCli};
use crate::providers::ollama::Ollama;

// @module: Per-service shared state

/// State of the LLM proxy service
#[derive(Clone)]
pub struct LlmState {
    pub config: Arc<Config>,
    pub ollama: Arc<Ollama>,
}

impl LlmState {
    pub fn new(config: Config) -> Self {
        let ollama = Ollama::from_url(
            &config.llm.endpoint,
            std::time::Duration::from_secs(config.llm.chat_timeout_secs),
            std::time::Duration::from_secs(config.llm.tags_timeout_secs),
        );
        LlmState {
            config: Arc::new(config),
            ollama: Arc::new(ollama),
        }
    }
}

/// State of the image generation service.
///
/// The diffusion backend is owned here behind a one-time initialization
/// guard: the first request to need it loads it exactly once, racing
/// first-requests block on the same cell, and every later request reuses the
/// handle. There is no lazily-mutated global.
#[derive(Clone)]
pub struct ImageState {
    pub config: Arc<Config>,
    model: Arc<OnceCell<Arc<dyn ImageModel>>>,
}

impl ImageState {
    pub fn new(config: Config) -> Self {
        ImageState {
            config: Arc::new(config),
            model: Arc::new(OnceCell::new()),
        }
    }

    /// Build a state with a pre-initialized backend (used by tests)
    pub fn with_model(config: Config, model: Arc<dyn ImageModel>) -> Self {
        let cell = OnceCell::new();
        // A fresh cell cannot already be set
        let _ = cell.set(model);
        ImageState {
            config: Arc::new(config),
            model: Arc::new(cell),
        }
    }

    /// The diffusion backend, loading it on first use
    pub async fn model(&self) -> Result<&Arc<dyn ImageModel>, ServiceError> {
        self.model
            .get_or_try_init(|| async {
                let backend = SdCli::load(&self.config.image)?;
                Ok(Arc::new(backend) as Arc<dyn ImageModel>)
            })
            .await
    }

    /// Whether the backend has been initialized yet
    pub fn model_loaded(&self) -> bool {
        self.model.initialized()
    }
}
