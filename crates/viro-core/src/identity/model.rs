//! UserIdentity domain model.

use serde::{Deserialize, Serialize};

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable identifier; history records are keyed by it
    pub uid: String,
    /// Name shown in the greeting
    pub display_name: String,
}

impl UserIdentity {
    pub fn new(uid: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
        }
    }

    /// Greeting line for the signed-in user.
    pub fn greeting(&self) -> String {
        format!("Hola, {}", self.display_name)
    }
}
