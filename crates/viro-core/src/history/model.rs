//! HistoryEntry domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted record of a past generation.
///
/// Entries are immutable once created. The serialized field names
/// (`tema`, `resultado`, `fecha`) are the persisted record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The topic the user submitted
    #[serde(rename = "tema")]
    topic: String,
    /// The generated text returned by the backend
    #[serde(rename = "resultado")]
    result: String,
    /// When the generation completed
    #[serde(rename = "fecha")]
    created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(topic: impl Into<String>, result: impl Into<String>) -> Self {
        Self::with_timestamp(topic, result, Utc::now())
    }

    pub fn with_timestamp(
        topic: impl Into<String>,
        result: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            topic: topic.into(),
            result: result.into(),
            created_at,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
