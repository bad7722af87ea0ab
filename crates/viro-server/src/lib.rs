//! HTTP surface for Viro.
//!
//! Exposes `POST /api/generate`, which forwards a topic to the generation
//! backend and relays the generated text, plus a liveness probe.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::{any, get};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use viro_core::generation::{GenerationBackend, MISSING_TOPIC_MESSAGE, validate_topic};

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Método no permitido";
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn GenerationBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", any(generate))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Deserialize)]
struct GenerateBody {
    tema: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

/// Extracts a usable topic from the raw request body.
fn parse_topic(body: &[u8]) -> Option<String> {
    let parsed: GenerateBody = serde_json::from_slice(body).ok()?;
    let topic = parsed.tema?;
    validate_topic(&topic).ok()?;
    Some(topic)
}

async fn generate(
    method: Method,
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if method != Method::POST {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE);
    }

    let Some(topic) = parse_topic(&body) else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_TOPIC_MESSAGE);
    };

    match state.backend.generate(&topic).await {
        Ok(text) => (StatusCode::OK, Json(json!({ "result": text }))),
        Err(e) => {
            tracing::error!("generation backend failed: {e}");
            let message = e.user_message();
            let message = if message.trim().is_empty() {
                INTERNAL_ERROR_MESSAGE.to_string()
            } else {
                message
            };
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
