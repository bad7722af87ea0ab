//! Error types for the Viro application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Viro application.
///
/// The first four variants form the user-facing taxonomy: every one of them
/// ends the triggering action and is shown to the user as plain text via
/// [`ViroError::user_message`]. The remaining variants come from the
/// storage and configuration layers.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ViroError {
    /// The submitted topic was empty.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The identity provider failed to sign the user in or out.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The generation backend failed or returned a non-success response.
    #[error("Generation error: {0}")]
    Generation(String),

    /// A generation is already in flight for this session.
    #[error("A generation is already in progress")]
    Busy,

    /// The identity changed while a generation was in flight; its result was dropped.
    #[error("Session changed while generating; result discarded")]
    Superseded,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ViroError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Renders the plain-text message shown to the user.
    ///
    /// Unlike `Display`, this omits the category prefix for the user-facing
    /// variants so the backend's own wording reaches the screen unchanged.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Generation(message) => message.clone(),
            Self::Auth(message) => format!("Error al iniciar sesión: {message}"),
            Self::Busy => "Ya se están generando ideas".to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ViroError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ViroError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ViroError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ViroError>`.
pub type Result<T> = std::result::Result<T, ViroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_strips_category() {
        let err = ViroError::generation("Error generando ideas");
        assert_eq!(err.user_message(), "Error generando ideas");
        assert_eq!(err.to_string(), "Generation error: Error generando ideas");
    }

    #[test]
    fn test_auth_user_message_matches_sign_in_wording() {
        let err = ViroError::auth("popup closed");
        assert_eq!(err.user_message(), "Error al iniciar sesión: popup closed");
        assert!(err.is_auth());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ViroError = io.into();
        assert!(err.is_io());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err: ViroError = json_err.into();
        assert!(err.is_serialization());
    }
}
