//! CohereApiAgent - Direct REST API implementation for Cohere chat.
//!
//! Sends one chat request per topic and returns the reply text.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use viro_core::config::{BackendSettings, DEFAULT_BACKEND_BASE_URL, DEFAULT_PROMPT_TEMPLATE};
use viro_core::error::{Result, ViroError};
use viro_core::generation::GenerationBackend;

const CHAT_PATH: &str = "/v1/chat";

/// Agent implementation that talks to the Cohere HTTP API.
#[derive(Clone)]
pub struct CohereApiAgent {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    prompt_template: String,
}

impl CohereApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            model: model.into(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }

    /// Builds an agent from the `[backend]` settings.
    ///
    /// Fails with a config error when no API key is available.
    pub fn from_settings(settings: &BackendSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ViroError::config("COHERE_API_KEY not found in environment or config.toml")
            })?;

        let agent = Self::new(api_key, settings.model.clone())
            .with_base_url(settings.base_url.clone())
            .with_prompt_template(settings.prompt_template.clone())
            .with_timeout(settings.timeout())?;
        Ok(agent)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Rebuilds the HTTP client with a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ViroError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_PATH)
    }

    fn build_request(&self, topic: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            message: self.prompt_template.replace("{tema}", topic),
        }
    }

    async fn send_request(&self, body: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ViroError::generation(format!("Cohere API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Cohere error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| ViroError::generation(format!("Failed to parse Cohere response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerationBackend for CohereApiAgent {
    async fn generate(&self, topic: &str) -> Result<String> {
        let request = self.build_request(topic);
        tracing::debug!(model = %self.model, "sending Cohere chat request");
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    message: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn extract_text_response(response: ChatResponse) -> Result<String> {
    response
        .text
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ViroError::generation("Cohere API returned no text in the response"))
}

fn map_http_error(status: StatusCode, body: String) -> ViroError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|error| error.message)
        .unwrap_or_else(|| body.clone());

    if message.trim().is_empty() {
        ViroError::generation(format!("Cohere API returned status {}", status.as_u16()))
    } else {
        ViroError::generation(format!("status code {}: {}", status.as_u16(), message))
    }
}
