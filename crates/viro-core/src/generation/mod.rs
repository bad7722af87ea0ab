//! Generation backend seam.

use crate::error::{Result, ViroError};
use async_trait::async_trait;

/// Message used when a topic is missing or blank.
pub const MISSING_TOPIC_MESSAGE: &str = "Falta el tema";

/// Turns a topic into free-form generated text.
///
/// Implementations issue exactly one outbound request per call and never
/// retry. Failures are reported as `ViroError::Generation`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<String>;
}

/// Rejects empty and whitespace-only topics.
pub fn validate_topic(topic: &str) -> Result<&str> {
    if topic.trim().is_empty() {
        return Err(ViroError::validation(MISSING_TOPIC_MESSAGE));
    }
    Ok(topic)
}
