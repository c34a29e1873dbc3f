//! Error types for the RetroChallenges launcher.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire launcher.
///
/// Provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RcError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

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

    /// Emulator bridge error
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// Chat relay error (connect, socket, protocol)
    #[error("Chat relay error: {0}")]
    Relay(String),

    /// Remote HTTP API error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Input rejected by validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Emulator launch error
    #[error("Launch error: {0}")]
    Launch(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RcError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
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

    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge(message.into())
    }

    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay(message.into())
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn launch(message: impl Into<String>) -> Self {
        Self::Launch(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the bare message without the variant prefix.
    ///
    /// Used where the error ends up in a user-facing log line that already
    /// says what failed (e.g. "Connection failed: ...").
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { entity_type, id } => format!("{} '{}' not found", entity_type, id),
            Self::Io { message } => message.clone(),
            Self::Serialization { message, .. } => message.clone(),
            Self::Config(m)
            | Self::Bridge(m)
            | Self::Relay(m)
            | Self::Http(m)
            | Self::Validation(m)
            | Self::Launch(m)
            | Self::Internal(m) => m.clone(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RcError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RcError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RcError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RcError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for RcError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for RcError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, RcError>`.
pub type Result<T> = std::result::Result<T, RcError>;
