//! History domain module.
//!
//! # Module Structure
//!
//! - `model`: A single past generation (`HistoryEntry`)
//! - `log`: The per-user ordered log and its grouping/deletion operations
//! - `repository`: Persistence trait keyed by user id
//! - `memory`: In-memory repository used by tests and storage-less runs

mod log;
mod memory;
mod model;
mod repository;

pub use log::{HistoryLog, PositionedEntry, TopicGroup, flatten_groups};
pub use memory::InMemoryHistoryRepository;
pub use model::HistoryEntry;
pub use repository::{HistoryRepository, history_key};
