use std::time::Duration;

use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Ollama client for interacting with the Ollama API
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Wait budget for the model listing endpoint
    tags_timeout: Duration,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user or assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    pub created_at: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// One installed model in the tags listing
#[derive(Debug, Deserialize)]
pub struct TagModel {
    pub name: String,
    #[serde(default)]
    pub modified_at: String,
}

/// Response of the /api/tags endpoint
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: false,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        let options = self.options.get_or_insert(GenerationOptions {
            temperature: None,
            num_predict: None,
        });
        options.temperature = Some(temperature);
        self
    }

    /// Set the token generation limit
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        let options = self.options.get_or_insert(GenerationOptions {
            temperature: None,
            num_predict: None,
        });
        options.num_predict = Some(num_predict);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete base URL.
    ///
    /// `chat_timeout` is the fixed wait budget for completions; nothing in
    /// this client retries a failed call.
    pub fn from_url(url: impl Into<String>, chat_timeout: Duration, tags_timeout: Duration) -> Self {
        let base_url = url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::builder()
                .timeout(chat_timeout)
                .build()
                .unwrap_or_default(),
            tags_timeout,
        }
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat with the Ollama API, single attempt
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ServiceError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ServiceError::UpstreamUnreachable(format!("Ollama connection error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ServiceError::UpstreamUnreachable(format!(
                "Ollama error ({}): {}",
                status, error_text
            )));
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            ServiceError::UpstreamUnreachable(format!("Failed to parse Ollama chat response: {}", e))
        })
    }

    /// List installed models via /api/tags
    pub async fn tags(&self) -> Result<TagsResponse, ServiceError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.tags_timeout)
            .send()
            .await
            .map_err(|e| {
                ServiceError::UpstreamUnreachable(format!("Ollama connection error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ServiceError::UpstreamUnreachable(
                "Ollama not reachable".to_string(),
            ));
        }

        response.json::<TagsResponse>().await.map_err(|e| {
            ServiceError::UpstreamUnreachable(format!("Failed to parse Ollama tags response: {}", e))
        })
    }
}
