use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use log::{error, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::errors::ServiceError;
use crate::image::ImageJob;
use crate::server::auth::{ApiKey, require_api_key};
use crate::server::state::ImageState;

// @module: Image generation HTTP service

#[derive(Debug, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    #[serde(default = "default_steps")]
    pub num_inference_steps: u32,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_style() -> String {
    "simple_cartoon".to_string()
}

fn default_steps() -> u32 {
    20
}

fn default_dimension() -> u32 {
    512
}

#[derive(Debug, Serialize)]
pub struct ImageGenerationResponse {
    pub image_path: String,
    pub image_url: String,
    /// The style-enhanced prompt the model actually saw
    pub prompt: String,
    pub seed: u64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
    model_loaded: bool,
}

/// Build the image service router. Auth protects generation; health and the
/// rendered files are open.
pub fn router(state: ImageState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_key = ApiKey(Arc::new(state.config.api_key.clone()));

    let protected = Router::new()
        .route("/generate-image", post(generate_image_handler))
        .layer(middleware::from_fn_with_state(api_key, require_api_key));

    Router::new()
        .route("/health", get(health_handler))
        .route("/images/{filename}", get(get_image_handler))
        .merge(protected)
        .layer(cors)
        .with_state(state)
}

async fn health_handler(State(state): State<ImageState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            model: state.config.image.model.clone(),
            model_loaded: state.model_loaded(),
        }),
    )
}

/// Prefix the prompt with the configured fragment for the requested style
fn enhance_prompt(state: &ImageState, prompt: &str, style: &str) -> String {
    format!("{}, {}", state.config.image.styles.for_style(style), prompt)
}

async fn generate_image_handler(
    State(state): State<ImageState>,
    Json(request): Json<ImageGenerationRequest>,
) -> Result<Json<ImageGenerationResponse>, ServiceError> {
    let enhanced_prompt = enhance_prompt(&state, &request.prompt, &request.style);
    let negative_prompt = request
        .negative_prompt
        .unwrap_or_else(|| state.config.image.default_negative_prompt.clone());
    let seed = request.seed.unwrap_or_else(|| rand::rng().random());

    let output_dir = Path::new(&state.config.image.output_dir);
    std::fs::create_dir_all(output_dir)?;

    let filename = format!("{}.png", uuid::Uuid::new_v4());
    let output_path = output_dir.join(&filename);

    let job = ImageJob {
        prompt: enhanced_prompt.clone(),
        negative_prompt,
        num_inference_steps: request.num_inference_steps,
        width: request.width,
        height: request.height,
        seed,
        output_path: output_path.clone(),
    };

    info!(
        "Generating image, style {}, {} steps",
        request.style, request.num_inference_steps
    );

    let model = state.model().await?;
    model.generate(&job).await.map_err(|e| {
        error!("Image generation failed: {}", e);
        e
    })?;

    info!("Image generated and saved: {}", output_path.display());

    Ok(Json(ImageGenerationResponse {
        image_path: output_path.display().to_string(),
        image_url: format!("/images/{}", filename),
        prompt: enhanced_prompt,
        seed,
    }))
}

/// Serve a previously generated image, or 404. Filenames with path syntax
/// are rejected outright.
async fn get_image_handler(
    State(state): State<ImageState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<impl IntoResponse, ServiceError> {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ServiceError::InputNotFound(filename));
    }

    let path = Path::new(&state.config.image.output_dir).join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ServiceError::InputNotFound(filename))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

/// Serve the image API on the configured port
pub async fn serve(state: ImageState) -> anyhow::Result<()> {
    std::fs::create_dir_all(&state.config.image.output_dir)?;
    let port = state.config.image.port;
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Image API listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
