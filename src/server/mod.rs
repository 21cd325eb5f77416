/*!
 * HTTP services: the image generation API and the OpenAI-compatible LLM
 * proxy. Each service is an independent axum router over its own state;
 * requests are handled independently with no shared coordination beyond the
 * one-time model initialization guard.
 */

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::errors::ServiceError;

pub mod auth;
pub mod image_api;
pub mod llm_api;
pub mod openai_types;
pub mod state;

/// Error envelope shared by both services
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub r#type: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, kind: &str) -> Self {
        ErrorResponse {
            error: ApiError {
                message: message.into(),
                r#type: kind.to_string(),
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ServiceError::AuthFailed => (StatusCode::UNAUTHORIZED, "auth_error"),
            ServiceError::InputNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServiceError::UpstreamUnreachable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        };
        (status, Json(ErrorResponse::new(self.to_string(), kind))).into_response()
    }
}
