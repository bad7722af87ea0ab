//! File-backed history repository.
//!
//! Stores one JSON record per user under the history directory. The file
//! stem is the user's history key, with the user id escaped so that any id
//! maps to a distinct, filesystem-safe name.

use crate::paths::ViroPaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use viro_core::error::{Result, ViroError};
use viro_core::history::{HistoryEntry, HistoryRepository, history_key};

#[derive(Debug, Clone)]
pub struct JsonHistoryRepository {
    root: PathBuf,
}

impl JsonHistoryRepository {
    /// Uses the default history directory.
    pub fn new() -> Result<Self> {
        let root = ViroPaths::default().history_dir()?;
        Ok(Self::with_root(root))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record holding `user_id`'s history.
    pub fn record_path(&self, user_id: &str) -> PathBuf {
        self.root
            .join(format!("{}.json", history_key(&escape_user_id(user_id))))
    }

    fn record(&self, user_id: &str) -> AtomicJsonFile<Vec<HistoryEntry>> {
        AtomicJsonFile::new(self.record_path(user_id))
    }
}

/// Escapes every byte outside `[A-Za-z0-9_-]` as `%XX`.
fn escape_user_id(user_id: &str) -> String {
    let mut escaped = String::with_capacity(user_id.len());
    for byte in user_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ViroError::internal(format!("Failed to join task: {}", e)))?
}

#[async_trait]
impl HistoryRepository for JsonHistoryRepository {
    async fn load(&self, user_id: &str) -> Result<Option<Vec<HistoryEntry>>> {
        let record = self.record(user_id);
        tracing::debug!(path = %record.path().display(), "reading history record");
        blocking(move || record.load().map_err(ViroError::from)).await
    }

    async fn save(&self, user_id: &str, entries: &[HistoryEntry]) -> Result<()> {
        let record = self.record(user_id);
        let entries = entries.to_vec();
        tracing::debug!(path = %record.path().display(), entries = entries.len(), "writing history record");
        blocking(move || record.save(&entries).map_err(ViroError::from)).await
    }

    async fn remove(&self, user_id: &str) -> Result<()> {
        let record = self.record(user_id);
        tracing::debug!(path = %record.path().display(), "removing history record");
        blocking(move || record.remove().map_err(ViroError::from)).await
    }
}
