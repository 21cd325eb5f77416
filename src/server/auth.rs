use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::warn;

use crate::errors::ServiceError;

// @module: Shared-secret API key check

/// Expected key, shared by both services
#[derive(Clone)]
pub struct ApiKey(pub Arc<String>);

/// Reject requests whose X-API-Key header is missing or wrong, before any
/// handler or backend work runs
pub async fn require_api_key(
    State(expected): State<ApiKey>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(key) if key == expected.0.as_str() => next.run(request).await,
        _ => {
            warn!("Rejected request to {} with bad API key", request.uri().path());
            ServiceError::AuthFailed.into_response()
        }
    }
}
