use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use log::{error, info};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::errors::ServiceError;
use crate::providers::ollama;
use crate::server::auth::{ApiKey, require_api_key};
use crate::server::openai_types::{
    ChatCompletionRequest, ChatCompletionResponse, ModelInfo, ModelsResponse,
};
use crate::server::state::LlmState;

// @module: OpenAI-compatible chat proxy in front of Ollama

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ollama_url: String,
}

/// Build the proxy router. Auth applies to the OpenAI surface, not /health.
pub fn router(state: LlmState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_key = ApiKey(Arc::new(state.config.api_key.clone()));

    let protected = Router::new()
        .route("/v1/models", get(models_handler))
        .route("/v1/chat/completions", post(chat_completions_handler))
        .layer(middleware::from_fn_with_state(api_key, require_api_key));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected)
        .layer(cors)
        .with_state(state)
}

async fn health_handler(State(state): State<LlmState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            ollama_url: state.ollama.base_url().to_string(),
        }),
    )
}

/// Translate the Ollama tags listing into an OpenAI model list
async fn models_handler(
    State(state): State<LlmState>,
) -> Result<Json<ModelsResponse>, ServiceError> {
    let tags = state.ollama.tags().await?;

    let data = tags
        .models
        .into_iter()
        .map(|model| ModelInfo {
            id: model.name,
            object: "model",
            // Ollama reports modification time as an RFC 3339 string, which
            // has no honest integer mapping here
            created: 0,
            owned_by: "ollama".to_string(),
        })
        .collect();

    Ok(Json(ModelsResponse {
        object: "list",
        data,
    }))
}

/// Translate an OpenAI chat request into an Ollama chat call and back.
///
/// Roles and content pass through unchanged; temperature maps name-for-name
/// and max_tokens maps to num_predict only when present. The stream flag is
/// accepted and ignored.
async fn chat_completions_handler(
    State(state): State<LlmState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, ServiceError> {
    let model = request
        .model
        .unwrap_or_else(|| state.config.llm.default_model.clone());

    let messages: Vec<ollama::ChatMessage> = request
        .messages
        .iter()
        .map(|m| ollama::ChatMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        })
        .collect();

    let mut ollama_request =
        ollama::ChatRequest::new(&model, messages).temperature(request.temperature);
    if let Some(max_tokens) = request.max_tokens {
        ollama_request = ollama_request.num_predict(max_tokens);
    }

    let response = state.ollama.chat(ollama_request).await.map_err(|e| {
        error!("Chat completion failed: {}", e);
        e
    })?;

    info!("Chat completion served for model {}", model);

    Ok(Json(ChatCompletionResponse::new(
        model,
        response.message.content,
    )))
}

/// Serve the proxy on the configured port
pub async fn serve(state: LlmState) -> anyhow::Result<()> {
    let port = state.config.llm.port;
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("LLM proxy listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
