//! Client for the `/api/generate` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use viro_core::config::ClientSettings;
use viro_core::error::{Result, ViroError};
use viro_core::generation::GenerationBackend;

const GENERATE_PATH: &str = "/api/generate";
const FALLBACK_ERROR: &str = "Error generando ideas";

/// Generation backend that forwards topics to a viro server.
#[derive(Clone)]
pub struct GenerateEndpointClient {
    client: Client,
    endpoint: String,
}

impl GenerateEndpointClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::new(settings.endpoint.clone()).with_timeout(settings.timeout())
    }

    /// Rebuilds the HTTP client with a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ViroError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), GENERATE_PATH)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    tema: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    result: Option<String>,
    error: Option<String>,
}

#[async_trait]
impl GenerationBackend for GenerateEndpointClient {
    async fn generate(&self, topic: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url())
            .json(&GenerateRequest { tema: topic })
            .send()
            .await
            .map_err(|err| ViroError::generation(err.to_string()))?;

        let status = response.status();
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| ViroError::generation(format!("Respuesta inválida del servidor: {err}")))?;

        interpret(status.is_success(), body)
    }
}

fn interpret(success: bool, body: GenerateResponse) -> Result<String> {
    if !success {
        let message = body
            .error
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR.to_string());
        return Err(ViroError::generation(message));
    }
    body.result
        .ok_or_else(|| ViroError::generation(FALLBACK_ERROR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(raw: &str) -> GenerateResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_url() {
        let client = GenerateEndpointClient::new("http://localhost:3000/");
        assert_eq!(client.url(), "http://localhost:3000/api/generate");
    }

    #[test]
    fn test_interpret_success() {
        let text = interpret(true, body(r#"{"result":"1. ... 2. ..."}"#)).unwrap();
        assert_eq!(text, "1. ... 2. ...");
    }

    #[test]
    fn test_interpret_error_uses_body_message() {
        let err = interpret(false, body(r#"{"error":"Falta el tema"}"#)).unwrap_err();
        assert_eq!(err.user_message(), "Falta el tema");
    }

    #[test]
    fn test_interpret_error_without_message_falls_back() {
        let err = interpret(false, body("{}")).unwrap_err();
        assert_eq!(err.user_message(), "Error generando ideas");
    }

    #[test]
    fn test_interpret_success_without_result_is_malformed() {
        assert!(interpret(true, body("{}")).unwrap_err().is_generation());
    }
}
