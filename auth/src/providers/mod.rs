//! Identity-provider capability.
//!
//! This module defines the traits for the external user-pool service the
//! auth actions drive. They are **interfaces, not implementations**: the
//! actions depend on these traits, the application supplies a concrete
//! client, and tests supply mocks.
//!
//! The provider's native surface is callback-shaped - each call invokes
//! exactly one of a fixed set of outcome callbacks. The adaptation to
//! futures lives behind these traits: every method settles exactly once,
//! with challenge outcomes surfaced as data ([`AuthenticateOutcome`])
//! rather than as separate callbacks, so callers can match exhaustively.
//!
//! ```text
//! Action ──► PoolUser::authenticate ──► provider SDK (callbacks)
//!   ▲                                        │
//!   └────── AuthenticateOutcome ◄── adapter ─┘  one settlement point
//! ```

use crate::error::ProviderError;
use crate::state::TokenSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod pool;
pub mod user;

// Re-export provider traits
pub use pool::UserPool;
pub use user::PoolUser;

/// Result type for provider interactions.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// One user attribute in the provider's list form.
///
/// The provider speaks `[{Name, Value}]` lists; the module speaks string
/// maps. [`attribute_list`] and [`attribute_map`] convert at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Attribute name, e.g. `email`.
    pub name: String,

    /// Attribute value.
    pub value: String,
}

impl AttributeEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Convert an attribute map to the provider's list form.
///
/// Entries are sorted by name so the provider sees a deterministic order.
#[must_use]
pub fn attribute_list(attributes: &HashMap<String, String>) -> Vec<AttributeEntry> {
    let mut entries: Vec<AttributeEntry> = attributes
        .iter()
        .map(|(name, value)| AttributeEntry::new(name, value))
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

/// Collapse the provider's attribute list back into a map.
#[must_use]
pub fn attribute_map(entries: Vec<AttributeEntry>) -> HashMap<String, String> {
    entries
        .into_iter()
        .map(|entry| (entry.name, entry.value))
        .collect()
}

/// Username/password pair for an authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account username.
    pub username: String,

    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Create a credentials pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful sign-up report from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    /// Username the pool registered.
    pub username: String,

    /// Whether the account is already confirmed.
    pub user_confirmed: bool,
}

/// A session as handed back by the provider.
///
/// The three token strings are extracted from the provider's three token
/// sub-objects; `expires_at` is the id/access expiration where the
/// provider exposes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSession {
    /// Identity token (JWT).
    pub id_token: String,

    /// Access token (JWT).
    pub access_token: String,

    /// Refresh token.
    pub refresh_token: String,

    /// Id/access token expiration, if exposed.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProviderSession {
    /// The session's tokens in the module's state shape.
    #[must_use]
    pub fn tokens(&self) -> TokenSet {
        TokenSet {
            id_token: self.id_token.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// How the provider delivers a multi-factor code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDelivery {
    /// Delivery medium, e.g. `SMS`.
    pub medium: String,

    /// Masked destination, e.g. `+*******1234`.
    pub destination: String,
}

/// Every way an authentication attempt can succeed.
///
/// Failure is the error channel; these are the provider's success-side
/// callbacks as one exhaustive union. Challenge variants carry everything
/// the caller needs to continue the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticateOutcome {
    /// A session was issued.
    Authenticated(ProviderSession),

    /// The account must set a new password before a session is issued.
    NewPasswordRequired {
        /// The user's current profile attributes as reported back.
        attributes: HashMap<String, String>,

        /// Attribute names that must be supplied with the new password.
        required: Vec<String>,
    },

    /// A multi-factor code was sent and must be verified elsewhere.
    MfaRequired {
        /// Where the code went.
        delivery: CodeDelivery,
    },
}
