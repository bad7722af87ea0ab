//! History repository trait.
//!
//! Defines the interface for per-user history persistence.

use super::model::HistoryEntry;
use crate::error::Result;
use async_trait::async_trait;

/// Prefix of every persisted history record key.
pub const HISTORY_KEY_PREFIX: &str = "historial_";

/// Builds the storage key for a user's history record.
pub fn history_key(user_id: &str) -> String {
    format!("{HISTORY_KEY_PREFIX}{user_id}")
}

/// An abstract repository holding one history record per user.
///
/// Implementations store the full ordered sequence under a key derived
/// from [`history_key`]. There is exactly one logical writer per record,
/// so implementations only need to guard against torn writes, not against
/// interleaved updates.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Loads a user's history.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entries))`: A record exists (possibly empty)
    /// - `Ok(None)`: No record has been stored for this user
    /// - `Err(_)`: The record exists but could not be read
    async fn load(&self, user_id: &str) -> Result<Option<Vec<HistoryEntry>>>;

    /// Replaces a user's history record with `entries`.
    async fn save(&self, user_id: &str, entries: &[HistoryEntry]) -> Result<()>;

    /// Removes a user's record entirely. Removing a missing record succeeds.
    async fn remove(&self, user_id: &str) -> Result<()>;
}
