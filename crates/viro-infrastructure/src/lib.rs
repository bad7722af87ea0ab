//! Infrastructure adapters for Viro: filesystem persistence, configuration
//! and the local identity provider.

pub mod config_service;
pub mod json_history_repository;
pub mod local_identity;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_history_repository::JsonHistoryRepository;
pub use crate::local_identity::LocalIdentityProvider;
pub use crate::paths::ViroPaths;
