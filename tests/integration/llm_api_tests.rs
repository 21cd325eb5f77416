/*!
 * Integration tests for the OpenAI-compatible LLM proxy, driven through the
 * router against either an unreachable backend or a fake in-process Ollama
 */

use axum::body::Body;
use axum::extract::Json as ExtractJson;
use axum::http::{Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use clipkit::app_config::Config;
use clipkit::server::llm_api;
use clipkit::server::state::LlmState;

const API_KEY: &str = "clipkit-dev-key";

/// State pointed at a port nothing listens on; auth failures must trigger
/// before any connection attempt, upstream failures after
fn unreachable_state() -> LlmState {
    let mut config = Config::default();
    config.llm.endpoint = "http://127.0.0.1:9".to_string();
    LlmState::new(config)
}

/// Canned Ollama lookalike on an ephemeral port, returning the base URL
async fn spawn_fake_ollama() -> String {
    async fn chat(ExtractJson(body): ExtractJson<serde_json::Value>) -> Json<serde_json::Value> {
        // echo the requested model so tests can observe the translation
        let model = body["model"].as_str().unwrap_or("?").to_string();
        let temperature = body["options"]["temperature"].clone();
        Json(json!({
            "model": model,
            "created_at": "2025-01-01T00:00:00Z",
            "message": {
                "role": "assistant",
                "content": format!("reply from {} at temperature {}", model, temperature)
            },
            "done": true
        }))
    }

    async fn tags() -> Json<serde_json::Value> {
        Json(json!({
            "models": [
                { "name": "llama3.1:8b", "modified_at": "2025-01-01T00:00:00Z" },
                { "name": "mistral:7b", "modified_at": "2025-01-01T00:00:00Z" }
            ]
        }))
    }

    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/tags", get(tags));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn chat_request(body: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/chat/completions")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_withoutApiKey_shouldReturnOk() {
    let router = llm_api::router(unreachable_state());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ollama_url"], "http://127.0.0.1:9");
}

#[tokio::test]
async fn test_models_withoutApiKey_shouldReturn401WithoutBackendCall() {
    let router = llm_api::router(unreachable_state());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/v1/models")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // rejected by the middleware; the unreachable backend would have
    // produced a 500 instead
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "auth_error");
}

#[tokio::test]
async fn test_chat_withWrongApiKey_shouldReturn401() {
    let router = llm_api::router(unreachable_state());

    let request = chat_request(
        r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
        Some("wrong-key"),
    );
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chat_withUnreachableBackend_shouldReturn500UpstreamError() {
    let router = llm_api::router(unreachable_state());

    let request = chat_request(
        r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
        Some(API_KEY),
    );
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "upstream_error");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Upstream error")
    );
}

#[tokio::test]
async fn test_chat_withFakeBackend_shouldWrapReplyInCompletionEnvelope() {
    let mut config = Config::default();
    config.llm.endpoint = spawn_fake_ollama().await;
    let router = llm_api::router(LlmState::new(config));

    let request = chat_request(
        r#"{"model": "mistral:7b", "messages": [{"role": "user", "content": "hi"}], "temperature": 0.2}"#,
        Some(API_KEY),
    );
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert!(body["id"].as_str().unwrap().starts_with("chatcmpl-"));
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "mistral:7b");
    assert_eq!(body["choices"][0]["index"], 0);
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    // the backend saw the requested model and the mapped temperature
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "reply from mistral:7b at temperature 0.2"
    );
}

#[tokio::test]
async fn test_chat_withoutModel_shouldFallBackToConfiguredDefault() {
    let mut config = Config::default();
    config.llm.endpoint = spawn_fake_ollama().await;
    config.llm.default_model = "llama3.1:8b".to_string();
    let router = llm_api::router(LlmState::new(config));

    let request = chat_request(
        r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
        Some(API_KEY),
    );
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["model"], "llama3.1:8b");
    assert!(
        body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap()
            .starts_with("reply from llama3.1:8b")
    );
}

#[tokio::test]
async fn test_models_withFakeBackend_shouldListInstalledModels() {
    let mut config = Config::default();
    config.llm.endpoint = spawn_fake_ollama().await;
    let router = llm_api::router(LlmState::new(config));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/v1/models")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["object"], "list");
    assert_eq!(body["data"][0]["id"], "llama3.1:8b");
    assert_eq!(body["data"][0]["object"], "model");
    assert_eq!(body["data"][0]["owned_by"], "ollama");
    assert_eq!(body["data"][1]["id"], "mistral:7b");
}
