//! In-memory history repository.

use super::model::HistoryEntry;
use super::repository::{HistoryRepository, history_key};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Keeps history records in a process-local map.
///
/// Records are keyed exactly like the persistent store, so switching
/// between the two never changes which user sees which log. Reads are
/// counted to let callers verify the one-read-per-transition contract.
#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    records: Mutex<HashMap<String, Vec<HistoryEntry>>>,
    reads: AtomicUsize,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `load` calls served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns whether a record exists for `user_id`.
    pub fn contains(&self, user_id: &str) -> bool {
        self.records
            .lock()
            .map(|records| records.contains_key(&history_key(user_id)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn load(&self, user_id: &str) -> Result<Option<Vec<HistoryEntry>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let records = self
            .records
            .lock()
            .map_err(|e| crate::ViroError::internal(format!("history map poisoned: {e}")))?;
        Ok(records.get(&history_key(user_id)).cloned())
    }

    async fn save(&self, user_id: &str, entries: &[HistoryEntry]) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| crate::ViroError::internal(format!("history map poisoned: {e}")))?;
        records.insert(history_key(user_id), entries.to_vec());
        Ok(())
    }

    async fn remove(&self, user_id: &str) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| crate::ViroError::internal(format!("history map poisoned: {e}")))?;
        records.remove(&history_key(user_id));
        Ok(())
    }
}
