//! Error types for the authentication module.
//!
//! The taxonomy is deliberately small: a local precondition failure, a
//! lookup miss, and everything the provider reports, forwarded verbatim.
//! The module never interprets provider codes and never retries.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Opaque error reported by the identity provider.
///
/// Forwarded to callers exactly as received: `code` is the provider's
/// machine-readable tag (absent for transport-level failures), `message`
/// its human-readable description. Nothing in this crate branches on
/// `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    /// Provider error code, e.g. `NotAuthorizedException`.
    pub code: Option<String>,

    /// Human-readable description from the provider.
    pub message: String,
}

impl ProviderError {
    /// Error with a message and no code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Error with a provider code and message.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Error surface of every authentication action.
///
/// Every action either resolves or rejects with exactly one of these;
/// none are swallowed, none trigger retries, and none poison the
/// orchestrator - each action call is independent.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    /// An operation requiring an authenticated user was called without
    /// one. Raised before any provider interaction.
    #[error("User is unauthenticated")]
    Unauthenticated,

    /// The provider holds no cached current user.
    #[error("Can't retrieve the current user")]
    NoCurrentUser,

    /// Failure reported by the identity provider, forwarded verbatim.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AuthError {
    /// Returns `true` if this error was raised locally, before any
    /// provider interaction.
    ///
    /// # Examples
    ///
    /// ```
    /// # use poolstore_auth::error::AuthError;
    /// assert!(AuthError::Unauthenticated.is_local());
    /// ```
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::NoCurrentUser)
    }

    /// The provider error code, if this error carries one.
    #[must_use]
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Provider(err) => err.code.as_deref(),
            _ => None,
        }
    }
}
