//! Domain layer for Viro.
//!
//! Holds the session state of one page session, the per-user history log
//! and the seams to the two external collaborators: the identity provider
//! and the generation backend.

pub mod config;
pub mod error;
pub mod generation;
pub mod history;
pub mod identity;
pub mod session;

// Re-export common types
pub use error::{Result, ViroError};
pub use generation::GenerationBackend;
pub use history::{HistoryEntry, HistoryLog, HistoryRepository};
pub use identity::{IdentityProvider, UserIdentity};
pub use session::{SessionController, SessionState};
